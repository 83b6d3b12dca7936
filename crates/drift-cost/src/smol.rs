//! Finite-difference Smoluchowski models.
//!
//! Instead of a short-lag Gaussian, these models solve the
//! Smoluchowski equation over the event lag and score an event by the
//! solved density at its end point. [`SmolCrank`] caches one density per
//! solution-grid node and re-solves only those near a perturbed sample;
//! [`SmolCrankBias`] solves afresh for every event under the event's own
//! bias frame.

use rayon::prelude::*;

use drift_core::{Event, FieldId, NodeList};
use drift_field::{AnyField, BiasHistory, CubicField, Field, FieldStore, Grid1D};
use drift_solver::CrankNicolson;

use crate::config::ConfigError;
use crate::model::{require_all, BindContext, CostModel, EventCost, VarSlots};

const CRANK_ROLES: &[&str] = &["diffusivity", "force", "solutionGrid"];
const BIAS_ROLES: &[&str] = &["diffusivity", "force"];

const TIME: usize = 0;
const POS: usize = 1;

/// Fewest solver steps a per-event solve may take.
pub const MIN_BIAS_STEPS: usize = 4;

fn smol_vars() -> VarSlots {
    VarSlots::new(&[("time", 1), ("pos", 0)])
}

fn build_solver(timestep: f64, kt: f64) -> Result<CrankNicolson, ConfigError> {
    CrankNicolson::builder()
        .timestep(timestep)
        .kt(kt)
        .build()
        .map_err(|reason| ConfigError::InvalidParameter {
            name: "timestep",
            reason,
        })
}

fn cost_from_density(p: f64) -> EventCost {
    if p > 0.0 {
        EventCost::plain(-p.ln())
    } else {
        EventCost::invalid()
    }
}

// ── HopPolicy ──────────────────────────────────────────────────────

/// How far, in reference nodes, a sample change is felt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HopPolicy {
    /// The same hop for every node.
    Fixed(usize),
    /// Per node: the largest displacement of its events in grid
    /// spacings, rounded up, plus `margin`.
    Observed {
        /// Extra nodes beyond the observed displacement.
        margin: usize,
    },
}

impl Default for HopPolicy {
    fn default() -> Self {
        HopPolicy::Observed { margin: 2 }
    }
}

/// Per-node hops resolved against a grid and its bound events.
#[derive(Clone, Debug)]
struct Hops {
    grid: Grid1D,
    hops: Vec<usize>,
}

impl Hops {
    fn resolve(policy: HopPolicy, grid: Grid1D, ctx: &BindContext<'_>, pos_slot: usize) -> Self {
        let hops = match policy {
            HopPolicy::Fixed(h) => vec![h; grid.len()],
            HopPolicy::Observed { margin } => ctx
                .local
                .iter()
                .map(|l| {
                    let widest = l
                        .events
                        .iter()
                        .map(|&e| ctx.events[e].del[pos_slot].abs())
                        .fold(0.0, f64::max);
                    (widest / grid.dr()).ceil() as usize + margin
                })
                .collect(),
        };
        let widest = hops.iter().copied().max().unwrap_or(0);
        log::debug!("hops up to {widest} nodes over {} nodes", grid.len());
        Self { grid, hops }
    }

    fn distance(&self, a: usize, b: usize) -> usize {
        let d = a.abs_diff(b);
        if self.grid.is_periodic() {
            d.min(self.grid.len() - d)
        } else {
            d
        }
    }

    /// Nodes whose hop reaches `node`, plus the node below each.
    fn region(&self, node: usize) -> NodeList {
        let mut out: NodeList = (0..self.hops.len())
            .filter(|&i| self.distance(i, node) <= self.hops[i])
            .collect();
        let below: NodeList = out
            .iter()
            .filter_map(|&i| self.grid.prev_index(i))
            .collect();
        for i in below {
            if !out.contains(&i) {
                out.push(i);
            }
        }
        out
    }
}

// ── SmolCrank ──────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct CrankState {
    solver: CrankNicolson,
    grid: Grid1D,
    steps: usize,
    densities: Vec<CubicField>,
    // Solution nodes used by the events of each reference node.
    uses: Vec<Vec<usize>>,
    // Reference nodes whose events read each solution node.
    users: Vec<Vec<usize>>,
    hops: Hops,
}

impl CrankState {
    /// Solution nodes re-solved after a sample change at `node`: those
    /// read by events of the nodes within hop.
    fn touched(&self, node: usize) -> Vec<usize> {
        if node >= self.hops.hops.len() {
            return Vec::new();
        }
        let mut origins: Vec<usize> = self
            .hops
            .region(node)
            .iter()
            .filter_map(|&j| self.uses.get(j))
            .flatten()
            .copied()
            .collect();
        origins.sort_unstable();
        origins.dedup();
        origins
    }

    /// The hop set of `node` plus every node reading a density in
    /// [`touched`](Self::touched).
    fn region(&self, node: usize) -> NodeList {
        if node >= self.hops.hops.len() {
            return NodeList::new();
        }
        let mut out = self.hops.region(node);
        for o in self.touched(node) {
            out.extend(self.users[o].iter().copied());
        }
        out
    }

    fn solve_into(&self, origin: usize, d: &AnyField, f: &AnyField) -> Option<Vec<f64>> {
        self.solver
            .propagate(&self.grid, origin, self.steps, d, f, None)
            .ok()
    }
}

fn store_density(density: &mut CubicField, solved: Option<Vec<f64>>) {
    match solved {
        Some(p) if density.reset(&p).is_ok() => {}
        _ => density.fill(0.0),
    }
}

/// Smoluchowski model with one cached transition density per node of a
/// solution grid.
///
/// All events must share one lag. An event starting at `x0` costs
/// `-ln p(x0 + dx)` where `p` is the density solved from the solution
/// node nearest `x0`. A density that goes negative is discarded, which
/// makes every event using it cost `+inf`.
#[derive(Clone, Debug)]
pub struct SmolCrank {
    fields: [FieldId; 3],
    vars: VarSlots,
    timestep: f64,
    hop: HopPolicy,
    state: Option<CrankState>,
}

impl SmolCrank {
    /// Model over `diffusivity` and `force`, solved on the grid of
    /// `solution_grid` with solver step `timestep`.
    pub fn new(
        diffusivity: FieldId,
        force: FieldId,
        solution_grid: FieldId,
        timestep: f64,
        hop: HopPolicy,
    ) -> Self {
        Self {
            fields: [diffusivity, force, solution_grid],
            vars: smol_vars(),
            timestep,
            hop,
            state: None,
        }
    }

    /// Solver steps per lag, once bound.
    pub fn steps(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.steps)
    }

    /// Cached density of solution node `node`, once bound.
    pub fn density(&self, node: usize) -> Option<&CubicField> {
        self.state.as_ref()?.densities.get(node)
    }

    fn origin(&self, grid: &Grid1D, event: &Event) -> usize {
        grid.nearest_node(event.var[self.vars.slot(POS)])
    }
}

impl CostModel for SmolCrank {
    fn name(&self) -> &'static str {
        "smolCrank"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        CRANK_ROLES
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

    fn on_reference_grid(&self, role: usize) -> bool {
        role != 2
    }

    fn bind(&mut self, ctx: &BindContext<'_>) -> Result<(), ConfigError> {
        require_all(self, ctx.fields, 1)?;
        let solver = build_solver(self.timestep, ctx.config.kt)?;
        let grid = *ctx.fields[self.fields[2]]
            .grid1d()
            .ok_or(ConfigError::FieldKind {
                model: self.name(),
                role: "solutionGrid",
                expected: "1D field",
                found: ctx.fields[self.fields[2]].kind(),
            })?;
        let reference_grid = *ctx.fields[ctx.reference]
            .grid1d()
            .ok_or(ConfigError::FieldKind {
                model: self.name(),
                role: "reference",
                expected: "1D field",
                found: ctx.fields[ctx.reference].kind(),
            })?;

        let t = self.vars.slot(TIME);
        let lag = ctx.events[0].del[t];
        if !(lag > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "lag",
                reason: format!("event 0 lag must be > 0, got {lag}"),
            });
        }
        for (e, event) in ctx.events.iter().enumerate() {
            ctx.config.lag.check(lag, event.del[t], e)?;
        }
        let steps = solver.steps_for(lag);

        let uses: Vec<Vec<usize>> = ctx
            .local
            .iter()
            .map(|l| {
                let mut nodes: Vec<usize> = l
                    .events
                    .iter()
                    .map(|&e| self.origin(&grid, &ctx.events[e]))
                    .collect();
                nodes.sort_unstable();
                nodes.dedup();
                nodes
            })
            .collect();
        let mut users = vec![Vec::new(); grid.len()];
        for (j, nodes) in uses.iter().enumerate() {
            for &o in nodes {
                users[o].push(j);
            }
        }
        let hops = Hops::resolve(self.hop, reference_grid, ctx, self.vars.slot(POS));
        log::info!(
            "smolCrank: {} solution nodes, {steps} steps of {} per lag {lag}",
            grid.len(),
            solver.timestep()
        );

        self.state = Some(CrankState {
            solver,
            grid,
            steps,
            densities: vec![CubicField::uniform(grid, 0.0); grid.len()],
            uses,
            users,
            hops,
        });
        Ok(())
    }

    fn event_cost(&self, _fields: &FieldStore, event: &Event) -> EventCost {
        let Some(state) = &self.state else {
            return EventCost::invalid();
        };
        let x0 = event.var[self.vars.slot(POS)];
        let x1 = x0 + event.del[self.vars.slot(POS)];
        let node = self.origin(&state.grid, event);
        cost_from_density(state.densities[node].value_at(x1))
    }

    fn region(&self, reference: &AnyField, node: usize) -> NodeList {
        match &self.state {
            Some(state) => state.region(node),
            None => reference.neighbors(node),
        }
    }

    fn refresh_all(&mut self, fields: &FieldStore) {
        let (d, f) = (&fields[self.fields[0]], &fields[self.fields[1]]);
        let Some(state) = &mut self.state else {
            return;
        };
        let solved: Vec<Option<Vec<f64>>> = (0..state.grid.len())
            .into_par_iter()
            .map(|i| state.solve_into(i, d, f))
            .collect();
        for (density, p) in state.densities.iter_mut().zip(solved) {
            store_density(density, p);
        }
    }

    fn refresh_region(&mut self, fields: &FieldStore, node: usize, _region: &[usize]) {
        let (d, f) = (&fields[self.fields[0]], &fields[self.fields[1]]);
        let Some(state) = &mut self.state else {
            return;
        };
        let origins = state.touched(node);
        log::trace!("re-solving {} densities around {node}", origins.len());

        let solved: Vec<Option<Vec<f64>>> = origins
            .par_iter()
            .map(|&i| state.solve_into(i, d, f))
            .collect();
        for (i, p) in origins.into_iter().zip(solved) {
            store_density(&mut state.densities[i], p);
        }
    }
}

// ── SmolCrankBias ──────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct BiasState {
    solver: CrankNicolson,
    grid: Grid1D,
    hops: Hops,
}

/// Smoluchowski model solved per event on the reference grid, under the
/// bias frame the event was recorded with.
///
/// Each event runs `floor(lag / timestep)` solver steps from the node
/// nearest its start and costs `-ln p` at the node nearest its end.
#[derive(Clone, Debug)]
pub struct SmolCrankBias {
    fields: [FieldId; 2],
    vars: VarSlots,
    timestep: f64,
    hop: HopPolicy,
    history: Option<BiasHistory>,
    state: Option<BiasState>,
}

impl SmolCrankBias {
    /// Model over `diffusivity` and `force` with optional bias frames.
    pub fn new(
        diffusivity: FieldId,
        force: FieldId,
        timestep: f64,
        hop: HopPolicy,
        history: Option<BiasHistory>,
    ) -> Self {
        Self {
            fields: [diffusivity, force],
            vars: smol_vars(),
            timestep,
            hop,
            history,
            state: None,
        }
    }

    /// The bias frames, if any.
    pub fn history(&self) -> Option<&BiasHistory> {
        self.history.as_ref()
    }

    fn steps(&self, event: &Event) -> usize {
        let lag = event.del[self.vars.slot(TIME)];
        let steps = (lag / self.timestep).floor();
        if steps > 0.0 {
            steps as usize
        } else {
            0
        }
    }

    fn bias_frame(&self, event: &Event) -> Option<&CubicField> {
        let history = self.history.as_ref()?;
        let frames = history.frames();
        event
            .bias
            .map(|b| &frames[b.min(frames.len().saturating_sub(1))])
    }
}

impl CostModel for SmolCrankBias {
    fn name(&self) -> &'static str {
        "smolCrankBias"
    }

    fn field_roles(&self) -> &'static [&'static str] {
        BIAS_ROLES
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
        let solver = build_solver(self.timestep, ctx.config.kt)?;
        let reference = &ctx.fields[ctx.reference];
        let grid = *reference.grid1d().ok_or(ConfigError::FieldKind {
            model: self.name(),
            role: "reference",
            expected: "1D field",
            found: reference.kind(),
        })?;

        let mut beyond = 0;
        for (e, event) in ctx.events.iter().enumerate() {
            let steps = self.steps(event);
            if steps < MIN_BIAS_STEPS {
                return Err(ConfigError::TooFewSteps {
                    event: e,
                    steps,
                    min: MIN_BIAS_STEPS,
                });
            }
            if let Some(b) = event.bias {
                match &self.history {
                    None => return Err(ConfigError::MissingBias { event: e }),
                    Some(h) if b >= h.len() => beyond += 1,
                    Some(_) => {}
                }
            }
        }
        if beyond > 0 {
            log::warn!("{beyond} events name a bias frame past the last; using the last frame");
        }

        let hops = Hops::resolve(self.hop, grid, ctx, self.vars.slot(POS));
        log::info!(
            "smolCrankBias: {} events solved per evaluation on {} nodes",
            ctx.events.len(),
            grid.len()
        );
        self.state = Some(BiasState { solver, grid, hops });
        Ok(())
    }

    fn event_cost(&self, fields: &FieldStore, event: &Event) -> EventCost {
        let Some(state) = &self.state else {
            return EventCost::invalid();
        };
        let x0 = event.var[self.vars.slot(POS)];
        let x1 = x0 + event.del[self.vars.slot(POS)];
        let origin = state.grid.nearest_node(x0);
        let target = state.grid.nearest_node(x1);
        let bias = self.bias_frame(event).map(|b| b as &dyn Field);

        match state.solver.propagate(
            &state.grid,
            origin,
            self.steps(event),
            fields[self.fields[0]].as_field(),
            fields[self.fields[1]].as_field(),
            bias,
        ) {
            Ok(p) => cost_from_density(p[target]),
            Err(_) => EventCost::invalid(),
        }
    }

    fn region(&self, reference: &AnyField, node: usize) -> NodeList {
        match &self.state {
            Some(state) => state.hops.region(node),
            None => reference.neighbors(node),
        }
    }
}
