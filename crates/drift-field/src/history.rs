//! Time series of bias frames read from a multi-segment history stream.

use crate::boundary::Boundary;
use crate::cubic::CubicField;
use crate::error::FieldError;
use crate::field::Field;
use crate::tabulated::parse_rows;

/// An ordered series of aperiodic 1D bias frames.
///
/// The stream is a sequence of tabulated blocks separated by comment
/// lines; every block of data rows following a comment becomes one frame.
///
/// ```
/// use drift_field::{BiasHistory, Field};
///
/// let text = "# t = 0\n0 0\n1 0\n2 0\n# t = 1\n0 1\n1 2\n2 3\n";
/// let history = BiasHistory::parse(text).unwrap();
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.frame(1).samples(), &[1.0, 2.0, 3.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BiasHistory {
    frames: Vec<CubicField>,
}

impl BiasHistory {
    /// Wrap existing frames. At least one frame is required.
    pub fn from_frames(frames: Vec<CubicField>) -> Result<Self, FieldError> {
        if frames.is_empty() {
            return Err(FieldError::EmptyField);
        }
        Ok(Self { frames })
    }

    /// Parse a history stream.
    pub fn parse(text: &str) -> Result<Self, FieldError> {
        let lines: Vec<&str> = text.lines().collect();
        let mut frames = Vec::new();
        let mut start: Option<usize> = None;

        for (i, raw) in lines.iter().enumerate() {
            let t = raw.trim();
            if t.is_empty() {
                continue;
            }
            if t.starts_with('#') {
                if let Some(s) = start.take() {
                    frames.push(Self::segment(&lines[s..i], s + 1)?);
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            frames.push(Self::segment(&lines[s..], s + 1)?);
        }
        Self::from_frames(frames)
    }

    fn segment(lines: &[&str], first_line: usize) -> Result<CubicField, FieldError> {
        parse_rows(lines.iter().copied(), first_line, Boundary::Clamp)?.into_cubic()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: a history holds at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame `index`, clamped to the last frame.
    pub fn frame(&self, index: usize) -> &CubicField {
        let last = self.frames.len() - 1;
        if index > last {
            log::warn!("bias frame {index} requested but history ends at {last}; using {last}");
        }
        &self.frames[index.min(last)]
    }

    /// All frames in order.
    pub fn frames(&self) -> &[CubicField] {
        &self.frames
    }

    /// Smooth every frame with a truncated Gaussian kernel of `width`.
    ///
    /// The window spans eight standard deviations and is cut at the grid
    /// edges; weights are renormalized over the nodes that remain. A width
    /// that is not positive leaves the frames unchanged.
    pub fn smooth(&mut self, width: f64) {
        if !(width > 0.0) {
            log::debug!("smoothing width {width} is not positive; frames left as is");
            return;
        }
        for frame in &mut self.frames {
            let dr = frame.dr();
            let decay = dr * dr / (2.0 * width * width);
            let half = ((8.0 * width / dr) as i64) / 2;
            let data = frame.samples().to_vec();
            let n = data.len() as i64;

            let smoothed: Vec<f64> = (0..n)
                .map(|i| {
                    let j0 = (i - half).max(0);
                    let j1 = (i + half).min(n - 1);
                    let (sum, weight) = (j0..=j1).fold((0.0, 0.0), |(s, w), j| {
                        let d = (j - i) as f64;
                        let wj = (-d * d * decay).exp();
                        (s + wj * data[j as usize], w + wj)
                    });
                    sum / weight
                })
                .collect();
            // Lengths match by construction.
            let _ = frame.reset(&smoothed);
        }
    }

    /// Ramp the bias on where a frame has fewer than `full` samples.
    ///
    /// Below `full / 2` samples the bias is zeroed; between `full / 2` and
    /// `full` it is scaled linearly. Returns the number of nodes changed.
    pub fn enforce_full_samples(
        &mut self,
        counts: &BiasHistory,
        full: usize,
    ) -> Result<usize, FieldError> {
        if counts.len() != self.len() {
            return Err(FieldError::LengthMismatch {
                expected: self.len(),
                found: counts.len(),
            });
        }
        let min = full / 2;
        let mut changed = 0;
        for (frame, count_frame) in self.frames.iter_mut().zip(&counts.frames) {
            if count_frame.len() != frame.len() {
                return Err(FieldError::LengthMismatch {
                    expected: frame.len(),
                    found: count_frame.len(),
                });
            }
            let mut values = frame.samples().to_vec();
            for (v, &c) in values.iter_mut().zip(count_frame.samples()) {
                let count = c as i64;
                if count < full as i64 {
                    let fact = if count < min as i64 {
                        0.0
                    } else {
                        (count - min as i64) as f64 / (full - min) as f64
                    };
                    *v *= fact;
                    changed += 1;
                }
            }
            frame.reset(&values)?;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = "\
# frame 0
# step 100
0.0 1.0
0.5 1.0
1.0 1.0
1.5 1.0

# frame 1
0.0 2.0
0.5 4.0
1.0 6.0
1.5 8.0
";

    #[test]
    fn parses_comment_delimited_segments() {
        let h = BiasHistory::parse(TWO_FRAMES).unwrap();
        assert_eq!(h.len(), 2);
        assert!(!h.frame(0).is_periodic());
        assert_eq!(h.frame(0).samples(), &[1.0; 4]);
        assert_eq!(h.frame(1).samples(), &[2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn frame_index_is_clamped() {
        let h = BiasHistory::parse(TWO_FRAMES).unwrap();
        assert_eq!(h.frame(7), h.frame(1));
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert_eq!(
            BiasHistory::parse("# nothing\n"),
            Err(FieldError::EmptyField)
        );
    }

    #[test]
    fn segment_errors_report_stream_line() {
        let text = TWO_FRAMES.replace("0.5 4.0", "0.5 x");
        match BiasHistory::parse(&text) {
            Err(FieldError::Parse { line, .. }) => assert_eq!(line, 10),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // ── Smoothing ─────────────────────────────────────────────

    #[test]
    fn smoothing_preserves_constant_frames() {
        let mut h = BiasHistory::parse(TWO_FRAMES).unwrap();
        h.smooth(0.5);
        for v in h.frame(0).samples() {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn non_positive_width_leaves_frames_alone() {
        let mut h = BiasHistory::parse(TWO_FRAMES).unwrap();
        let before = h.clone();
        for width in [0.0, -1.0, f64::NAN] {
            h.smooth(width);
            assert_eq!(h, before);
        }
    }

    #[test]
    fn smoothing_pulls_edges_inward() {
        let mut h = BiasHistory::parse(TWO_FRAMES).unwrap();
        h.smooth(0.5);
        let s = h.frame(1).samples();
        assert!(s[0] > 2.0);
        assert!(s[3] < 8.0);
        // Symmetric data about the centre stays symmetric.
        assert!((s[0] + s[3] - 10.0).abs() < 1e-12);
    }

    // ── Sample ramp ───────────────────────────────────────────

    #[test]
    fn full_sample_ramp() {
        let mut h = BiasHistory::parse(TWO_FRAMES).unwrap();
        let counts = BiasHistory::parse(
            "# c0\n0 0\n1 5\n2 7\n3 20\n# c1\n0 10\n1 10\n2 10\n3 10\n",
        )
        .unwrap();
        let changed = h.enforce_full_samples(&counts, 10).unwrap();
        assert_eq!(changed, 3);
        let s = h.frame(0).samples();
        assert_eq!(s[0], 0.0);
        assert_eq!(s[1], 0.0);
        assert!((s[2] - 0.4).abs() < 1e-12);
        assert_eq!(s[3], 1.0);
        assert_eq!(h.frame(1).samples(), &[2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn count_history_must_match() {
        let mut h = BiasHistory::parse(TWO_FRAMES).unwrap();
        let counts = BiasHistory::parse("# c0\n0 10\n1 10\n").unwrap();
        assert!(matches!(
            h.enforce_full_samples(&counts, 10),
            Err(FieldError::LengthMismatch { .. })
        ));
    }
}
