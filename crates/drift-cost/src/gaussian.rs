//! Closed-form Gaussian (Euler-Maruyama) event likelihoods.
//!
//! Over a short lag `dt` the displacement `dx` is Gaussian with mean
//! `beta D F dt + D' dt` and variance `2 D dt`. The cost is its negative
//! log-density.

use std::f64::consts::PI;

use drift_core::{Event, FieldId};
use drift_field::{Field, FieldStore};

use crate::config::ConfigError;
use crate::model::{require_all, BindContext, CostModel, EventCost, VarSlots};

/// Negative log-density of `dx` after `dt` under diffusivity `d` with
/// gradient `d_grad` and force `force`. Non-positive `d` costs `+inf`.
pub fn gaussian_cost(beta: f64, dt: f64, dx: f64, force: f64, d: f64, d_grad: f64) -> EventCost {
    if d <= 0.0 {
        return EventCost::invalid();
    }
    let numer = dx - beta * d * force * dt - d_grad * dt;
    let variance = 2.0 * d * dt;
    let cost = 0.5 * (2.0 * PI * variance).ln() + 0.5 * numer * numer / variance;
    EventCost::gaussian(cost, numer, variance)
}

const LINE_ROLES: &[&str] = &["diffusivity", "force"];
const LOG_ROLES: &[&str] = &["logDiffusivity", "force"];
const PLANE_ROLES: &[&str] = &["diffusivity", "pmf"];

// Variable positions shared by the 1D models.
const TIME: usize = 0;
const POS: usize = 1;
const DISP: usize = 2;
const BIAS: usize = 3;

pub(crate) fn line_vars() -> VarSlots {
    VarSlots::new(&[
        ("time", 1),
        ("pos", 0),
        ("displacement", 0),
        ("forceBias", 2),
    ])
}

// ── Ccg ────────────────────────────────────────────────────────────

/// 1D Gaussian model over a diffusivity and a force field.
#[derive(Clone, Debug)]
pub struct Ccg {
    fields: [FieldId; 2],
    vars: VarSlots,
    beta: f64,
}

impl Ccg {
    /// Model over `diffusivity` and `force`.
    pub fn new(diffusivity: FieldId, force: FieldId) -> Self {
        Self {
            fields: [diffusivity, force],
            vars: line_vars(),
            beta: 1.0,
        }
    }
}

impl CostModel for Ccg {
    fn name(&self) -> &'static str {
        "ccg"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        LINE_ROLES
    }

    fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    fn event_vars(&self) -> &VarSlots {
        &self.vars
    }

    fn event_vars_mut(&mut self) -> &mut VarSlots {
        &mut self.vars
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> Result<(), ConfigError> {
        require_all(self, ctx.fields, 1)?;
        self.beta = ctx.config.beta();
        Ok(())
    }

    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost {
        let v = &self.vars;
        let x = [event.var[v.slot(POS)]];
        let force = event.var[v.slot(BIAS)] + fields[self.fields[1]].evaluate(&x);
        let (d, d_grad) = fields[self.fields[0]].value_gradient(0, &x);
        gaussian_cost(
            self.beta,
            event.del[v.slot(TIME)],
            event.del[v.slot(DISP)],
            force,
            d,
            d_grad,
        )
    }
}

// ── CcgLog ─────────────────────────────────────────────────────────

/// 1D Gaussian model fitting `ln D`, so the diffusivity stays positive.
#[derive(Clone, Debug)]
pub struct CcgLog {
    fields: [FieldId; 2],
    vars: VarSlots,
    beta: f64,
}

impl CcgLog {
    /// Model over `log_diffusivity` and `force`.
    pub fn new(log_diffusivity: FieldId, force: FieldId) -> Self {
        Self {
            fields: [log_diffusivity, force],
            vars: line_vars(),
            beta: 1.0,
        }
    }
}

impl CostModel for CcgLog {
    fn name(&self) -> &'static str {
        "ccgLog"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        LOG_ROLES
    }

    fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    fn event_vars(&self) -> &VarSlots {
        &self.vars
    }

    fn event_vars_mut(&mut self) -> &mut VarSlots {
        &mut self.vars
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> Result<(), ConfigError> {
        require_all(self, ctx.fields, 1)?;
        self.beta = ctx.config.beta();
        Ok(())
    }

    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost {
        let v = &self.vars;
        let x = [event.var[v.slot(POS)]];
        let force = event.var[v.slot(BIAS)] + fields[self.fields[1]].evaluate(&x);
        let (log_d, log_d_grad) = fields[self.fields[0]].value_gradient(0, &x);
        let d = log_d.exp();
        gaussian_cost(
            self.beta,
            event.del[v.slot(TIME)],
            event.del[v.slot(DISP)],
            force,
            d,
            d * log_d_grad,
        )
    }
}

// ── Ccg2d ──────────────────────────────────────────────────────────

// Variable positions of the 2D model.
const TIME_2D: usize = 0;
const POS_X: usize = 1;
const POS_Y: usize = 2;
const DISP_2D: usize = 3;
const BIAS_2D: usize = 4;

pub(crate) fn plane_vars(displacement: usize) -> VarSlots {
    VarSlots::new(&[
        ("time", 2),
        ("posX", 0),
        ("posY", 1),
        ("displacement", displacement),
        ("forceBias", 3),
    ])
}

/// 2D Gaussian model of motion along x over a diffusivity surface and a
/// potential of mean force. The force is `-d(pmf)/dx`.
#[derive(Clone, Debug)]
pub struct Ccg2d {
    fields: [FieldId; 2],
    vars: VarSlots,
    beta: f64,
}

impl Ccg2d {
    /// Model over `diffusivity` and `pmf`.
    pub fn new(diffusivity: FieldId, pmf: FieldId) -> Self {
        Self {
            fields: [diffusivity, pmf],
            vars: plane_vars(0),
            beta: 1.0,
        }
    }
}

impl CostModel for Ccg2d {
    fn name(&self) -> &'static str {
        "ccg2d"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        PLANE_ROLES
    }

    fn fields(&self) -> &[FieldId] {
        &self.fields
    }

    fn event_vars(&self) -> &VarSlots {
        &self.vars
    }

    fn event_vars_mut(&mut self) -> &mut VarSlots {
        &mut self.vars
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> Result<(), ConfigError> {
        require_all(self, ctx.fields, 2)?;
        self.beta = ctx.config.beta();
        Ok(())
    }

    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost {
        let v = &self.vars;
        let p = [event.var[v.slot(POS_X)], event.var[v.slot(POS_Y)]];
        let force = event.var[v.slot(BIAS_2D)] - fields[self.fields[1]].gradient(0, &p);
        let (d, d_grad) = fields[self.fields[0]].value_gradient(0, &p);
        gaussian_cost(
            self.beta,
            event.del[v.slot(TIME_2D)],
            event.del[v.slot(DISP_2D)],
            force,
            d,
            d_grad,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_field::{BicubicField, Boundary, CubicField, Grid1D};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1.0)
    }

    #[test]
    fn literal_case() {
        let c = gaussian_cost(1.0, 1.0, 0.1, 0.0, 0.5, 0.0);
        let want = 0.5 * (2.0 * PI * 2.0 * 0.5 * 1.0).ln() + 0.5 * 0.1 * 0.1 / (2.0 * 0.5 * 1.0);
        assert!(close(c.cost, want));
        let r = c.residual.unwrap();
        assert!(close(r.numer, 0.1));
        assert_eq!(r.variance, 1.0);
    }

    #[test]
    fn drift_shifts_the_mean() {
        // beta D F dt + D' dt = 0.5 * 2 * 1 * 0.1 + 0.3 * 0.1 = 0.13
        let c = gaussian_cost(0.5, 0.1, 0.13, 1.0, 2.0, 0.3);
        assert!(c.residual.unwrap().numer.abs() < 1e-15);
    }

    #[test]
    fn non_positive_diffusivity_is_invalid() {
        assert_eq!(gaussian_cost(1.0, 1.0, 0.1, 0.0, 0.0, 0.0).cost, f64::INFINITY);
        assert_eq!(gaussian_cost(1.0, 1.0, 0.1, 0.0, -1.0, 0.0).cost, f64::INFINITY);
        assert!(gaussian_cost(1.0, 1.0, 0.1, 0.0, f64::NAN, 0.0).cost.is_nan());
    }

    fn line_store(d: f64, f: f64) -> (FieldStore, FieldId, FieldId) {
        let g = Grid1D::new(10, 0.0, 1.0, Boundary::Periodic).unwrap();
        let mut store = FieldStore::new();
        let a = store.push(CubicField::uniform(g, d));
        let b = store.push(CubicField::uniform(g, f));
        (store, a, b)
    }

    fn event(x: f64, dx: f64, dt: f64, bias: f64) -> Event {
        Event::new(0)
            .with_var(0, x, dx, 0.0)
            .with_var(1, 0.0, dt, 0.0)
            .with_var(2, bias, 0.0, 0.0)
    }

    #[test]
    fn ccg_reads_fields_and_bias() {
        let (store, d, f) = line_store(0.5, 0.25);
        let model = Ccg::new(d, f);
        let got = model.event_cost(&store, &event(3.3, 0.2, 0.1, 0.75));
        let want = gaussian_cost(1.0, 0.1, 0.2, 1.0, 0.5, 0.0);
        assert!(close(got.cost, want.cost));
    }

    #[test]
    fn ccg_log_matches_ccg_on_exp_field() {
        let (store, d, f) = line_store(0.5, 0.25);
        let (log_store, log_d, log_f) = line_store(0.5f64.ln(), 0.25);
        let e = event(7.1, -0.3, 0.2, 0.0);
        let plain = Ccg::new(d, f).event_cost(&store, &e).cost;
        let logged = CcgLog::new(log_d, log_f).event_cost(&log_store, &e).cost;
        assert!(close(plain, logged));
    }

    #[test]
    fn ccg2d_takes_force_from_pmf_slope() {
        let g = Grid1D::new(8, 0.0, 1.0, Boundary::Periodic).unwrap();
        let mut store = FieldStore::new();
        let d = store.push(BicubicField::uniform(g, g, 0.5).unwrap());
        // Uniform pmf: no force, so only the bias drives the mean.
        let pmf = store.push(BicubicField::uniform(g, g, 3.0).unwrap());
        let model = Ccg2d::new(d, pmf);
        let e = Event::new(0)
            .with_var(0, 2.5, 0.1, 0.0)
            .with_var(1, 4.5, 0.0, 0.0)
            .with_var(2, 0.0, 1.0, 0.0)
            .with_var(3, 0.2, 0.0, 0.0);
        let got = model.event_cost(&store, &e).cost;
        let want = gaussian_cost(1.0, 1.0, 0.1, 0.2, 0.5, 0.0).cost;
        assert!(close(got, want));
    }
}
