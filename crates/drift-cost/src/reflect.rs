//! Gaussian likelihoods with reflecting walls, by the method of images.
//!
//! The walls are the bounds of the diffusivity field along the axis of
//! motion. Each wall contributes a mirrored Gaussian centred on the image
//! of the start point.

use std::f64::consts::PI;

use drift_core::{Event, FieldId};
use drift_field::{Field, FieldStore};

use crate::config::ConfigError;
use crate::gaussian::{line_vars, plane_vars};
use crate::model::{require_all, BindContext, CostModel, EventCost, VarSlots};

/// Negative log-density of reaching `x0 + dx` from `x0` between walls
/// `xa` and `xb`. Non-positive `d` costs `+inf`.
#[allow(clippy::too_many_arguments)]
pub fn reflect_cost(
    beta: f64,
    dt: f64,
    dx: f64,
    force: f64,
    d: f64,
    d_grad: f64,
    x0: f64,
    walls: (f64, f64),
) -> EventCost {
    if d <= 0.0 {
        return EventCost::invalid();
    }
    let mu = beta * d * force * dt + d_grad * dt;
    let variance = 2.0 * d * dt;
    let alpha = 0.5 / variance;

    let x1 = x0 + dx;
    let direct = dx - mu;
    // x1 - (2 xw - x0) - mu for each wall xw.
    let mirrored = x1 + x0 - mu;
    let lower = mirrored - 2.0 * walls.0;
    let upper = mirrored - 2.0 * walls.1;

    let sum = (-alpha * direct * direct).exp()
        + (-alpha * lower * lower).exp()
        + (-alpha * upper * upper).exp();
    let cost = 0.5 * (2.0 * PI * variance).ln() - sum.ln();
    EventCost::gaussian(cost, direct, variance)
}

const ROLES: &[&str] = &["diffusivity", "force"];

// ── Reflect ────────────────────────────────────────────────────────

// Variable positions, shared with the 1D Gaussian models.
const TIME: usize = 0;
const POS: usize = 1;
const DISP: usize = 2;
const BIAS: usize = 3;

/// 1D reflecting-wall model over a diffusivity and a force field.
#[derive(Clone, Debug)]
pub struct Reflect {
    fields: [FieldId; 2],
    vars: VarSlots,
    beta: f64,
    walls: (f64, f64),
}

impl Reflect {
    /// Model over `diffusivity` and `force`.
    pub fn new(diffusivity: FieldId, force: FieldId) -> Self {
        Self {
            fields: [diffusivity, force],
            vars: line_vars(),
            beta: 1.0,
            walls: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Wall positions, available once bound.
    pub fn walls(&self) -> (f64, f64) {
        self.walls
    }
}

impl CostModel for Reflect {
    fn name(&self) -> &'static str {
        "reflect"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        ROLES
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
        self.walls = ctx.fields[self.fields[0]].bounds(0);
        log::debug!("reflect walls at {:?}", self.walls);
        Ok(())
    }

    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost {
        let v = &self.vars;
        let x = [event.var[v.slot(POS)]];
        let force = event.var[v.slot(BIAS)] + fields[self.fields[1]].evaluate(&x);
        let (d, d_grad) = fields[self.fields[0]].value_gradient(0, &x);
        reflect_cost(
            self.beta,
            event.del[v.slot(TIME)],
            event.del[v.slot(DISP)],
            force,
            d,
            d_grad,
            x[0],
            self.walls,
        )
    }
}

// ── Reflect2d ──────────────────────────────────────────────────────

const TIME_2D: usize = 0;
const POS_X: usize = 1;
const POS_Y: usize = 2;
const DISP_2D: usize = 3;
const BIAS_2D: usize = 4;

/// 2D reflecting-wall model of motion along one axis.
#[derive(Clone, Debug)]
pub struct Reflect2d {
    fields: [FieldId; 2],
    vars: VarSlots,
    axis: usize,
    beta: f64,
    walls: (f64, f64),
}

impl Reflect2d {
    /// Model of motion along `axis` (0 or 1) over `diffusivity` and `force`.
    ///
    /// The displacement variable defaults to the slot of that axis.
    pub fn new(diffusivity: FieldId, force: FieldId, axis: usize) -> Result<Self, ConfigError> {
        if axis > 1 {
            return Err(ConfigError::InvalidParameter {
                name: "axis",
                reason: format!("must be 0 or 1, got {axis}"),
            });
        }
        Ok(Self {
            fields: [diffusivity, force],
            vars: plane_vars(axis),
            axis,
            beta: 1.0,
            walls: (f64::NEG_INFINITY, f64::INFINITY),
        })
    }

    /// Axis of motion.
    pub fn axis(&self) -> usize {
        self.axis
    }
}

impl CostModel for Reflect2d {
    fn name(&self) -> &'static str {
        "reflect2d"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        ROLES
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
        self.walls = ctx.fields[self.fields[0]].bounds(self.axis);
        log::debug!("reflect2d walls along axis {} at {:?}", self.axis, self.walls);
        Ok(())
    }

    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost {
        let v = &self.vars;
        let p = [event.var[v.slot(POS_X)], event.var[v.slot(POS_Y)]];
        let force = event.var[v.slot(BIAS_2D)] + fields[self.fields[1]].evaluate(&p);
        let (d, d_grad) = fields[self.fields[0]].value_gradient(self.axis, &p);
        reflect_cost(
            self.beta,
            event.del[v.slot(TIME_2D)],
            event.del[v.slot(DISP_2D)],
            force,
            d,
            d_grad,
            p[self.axis],
            self.walls,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostConfig;
    use crate::engine::CostEngine;
    use crate::gaussian::gaussian_cost;
    use drift_field::{BicubicField, Boundary, CubicField, Grid1D};

    #[test]
    fn far_walls_reduce_to_gaussian() {
        let r = reflect_cost(1.0, 0.1, 0.05, 0.3, 0.5, 0.1, 5.0, (0.0, 10.0));
        let g = gaussian_cost(1.0, 0.1, 0.05, 0.3, 0.5, 0.1);
        assert!((r.cost - g.cost).abs() < 1e-12);
        let (a, b) = (r.residual.unwrap(), g.residual.unwrap());
        assert!((a.numer - b.numer).abs() < 1e-15);
        assert_eq!(a.variance, b.variance);
    }

    #[test]
    fn near_wall_raises_likelihood() {
        let near = reflect_cost(1.0, 0.1, -0.05, 0.0, 0.5, 0.0, 0.1, (0.0, 10.0));
        let free = gaussian_cost(1.0, 0.1, -0.05, 0.0, 0.5, 0.0);
        assert!(near.cost < free.cost);
    }

    #[test]
    fn walls_are_mirror_symmetric() {
        // A step toward the lower wall from 0.1 mirrors a step toward the
        // upper wall from 9.9.
        let lo = reflect_cost(1.0, 0.1, -0.05, 0.0, 0.5, 0.0, 0.1, (0.0, 10.0));
        let hi = reflect_cost(1.0, 0.1, 0.05, 0.0, 0.5, 0.0, 9.9, (0.0, 10.0));
        assert!((lo.cost - hi.cost).abs() < 1e-10);
    }

    #[test]
    fn non_positive_diffusivity_is_invalid() {
        let c = reflect_cost(1.0, 0.1, 0.0, 0.0, 0.0, 0.0, 1.0, (0.0, 2.0));
        assert_eq!(c.cost, f64::INFINITY);
    }

    fn line_store() -> (FieldStore, FieldId, FieldId) {
        let g = Grid1D::new(10, 0.0, 0.5, Boundary::Clamp).unwrap();
        let mut s = FieldStore::new();
        let d = s.push(CubicField::uniform(g, 0.5));
        let f = s.push(CubicField::uniform(g, 0.0));
        (s, d, f)
    }

    #[test]
    fn rebound_displacement_keeps_start_point() {
        let (s, d, f) = line_store();
        let walls = s[d].bounds(0);
        let want = reflect_cost(1.0, 0.02, -0.1, 0.0, 0.5, 0.0, 0.15, walls).cost;

        let ev = Event::new(0)
            .with_var(0, 0.15, -0.1, 0.0)
            .with_var(1, 0.0, 0.02, 0.0);
        let plain =
            CostEngine::new(Reflect::new(d, f), s.clone(), vec![ev], d, CostConfig::default())
                .unwrap();
        assert!((plain.total_cost() - want).abs() < 1e-12);

        // Displacement from slot 4, whose value is not the start point.
        let ev = Event::new(0)
            .with_var(0, 0.15, 0.0, 0.0)
            .with_var(1, 0.0, 0.02, 0.0)
            .with_var(4, 7.0, -0.1, 0.0);
        let mut model = Reflect::new(d, f);
        model.event_vars_mut().bind("displacement", 4).unwrap();
        let moved = CostEngine::new(model, s, vec![ev], d, CostConfig::default()).unwrap();
        assert!((moved.total_cost() - want).abs() < 1e-12);
    }

    #[test]
    fn plane_start_point_follows_axis() {
        let g = Grid1D::new(8, 0.0, 0.5, Boundary::Clamp).unwrap();
        let mut s = FieldStore::new();
        let d = s.push(BicubicField::uniform(g, g, 0.5).unwrap());
        let f = s.push(BicubicField::uniform(g, g, 0.0).unwrap());
        let walls = s[d].bounds(1);
        let want = reflect_cost(1.0, 0.02, -0.1, 0.0, 0.5, 0.0, 0.15, walls).cost;

        // Near the lower y wall, far from both x walls; displacement in slot 4.
        let ev = Event::new(0)
            .with_var(0, 1.7, 0.0, 0.0)
            .with_var(1, 0.15, 0.0, 0.0)
            .with_var(2, 0.0, 0.02, 0.0)
            .with_var(4, 7.0, -0.1, 0.0);
        let mut m = Reflect2d::new(d, f, 1).unwrap();
        m.event_vars_mut().bind("displacement", 4).unwrap();
        let e = CostEngine::new(m, s, vec![ev], d, CostConfig::default()).unwrap();
        assert!((e.total_cost() - want).abs() < 1e-12);
    }

    #[test]
    fn axis_must_exist() {
        assert!(Reflect2d::new(FieldId(0), FieldId(1), 2).is_err());
        let m = Reflect2d::new(FieldId(0), FieldId(1), 1).unwrap();
        assert_eq!(m.event_vars().get("displacement"), Some(1));
    }
}
