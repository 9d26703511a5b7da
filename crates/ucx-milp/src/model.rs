//! Model assembly.
//!
//! [`ModelBuilder`] validates the system, plans every unit and emits the
//! planned rules into one [`AssembledModel`]: a variable arena, the
//! constraint list grouped by [`ConstraintFamily`], the big-M audit and the
//! two aggregate objective terms (startup energy, weighted ramp slack).
//!
//! Build order per unit: capacity, throughput, operating state, flows,
//! gradient, minimum run, penalty slacks.

use std::collections::BTreeMap;

use good_lp::{Constraint, Expression, Variable};
use serde::Serialize;
use tracing::{debug, info};
use ucx_core::validation::validate;
use ucx_core::{
    CapacityBounds, Diagnostics, Direction, EnergySystem, Horizon, ModelError, ModelResult,
};

use crate::arena::{Domain, Owner, VarArena, VarFamily, VarId, VarKey};
use crate::big_m::{self, BigMEntry};
use crate::plan::{plan_unit, GradientRule, OperatingPlan, PartLoadMode, PartLoadRatio, UnitPlan};
use crate::rules::{capacity, commitment, gradient, partload, penalty, transient, uptime};

/// Named constraint families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    CapacityDefinition,
    CapacityBounds,
    ThroughputCapacity,
    ThroughputFloor,
    InitialState,
    PreActivePin,
    StartupDetection,
    TurnoffDetection,
    ThroughputMax,
    ThroughputMin,
    LinearFlow,
    PartLoadFlow,
    AlwaysOnFlow,
    PartLoadOffset,
    StartupLoss,
    NoStartFlow,
    StartupTaper,
    RampPlain,
    RampExceptions,
    UptimeWindow,
    GradientPenalty,
    Fixed,
    External,
}

impl ConstraintFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintFamily::CapacityDefinition => "capacity_definition",
            ConstraintFamily::CapacityBounds => "capacity_bounds",
            ConstraintFamily::ThroughputCapacity => "throughput_capacity",
            ConstraintFamily::ThroughputFloor => "throughput_floor",
            ConstraintFamily::InitialState => "initial_state",
            ConstraintFamily::PreActivePin => "pre_active_pin",
            ConstraintFamily::StartupDetection => "startup_detection",
            ConstraintFamily::TurnoffDetection => "turnoff_detection",
            ConstraintFamily::ThroughputMax => "throughput_max",
            ConstraintFamily::ThroughputMin => "throughput_min",
            ConstraintFamily::LinearFlow => "linear_flow",
            ConstraintFamily::PartLoadFlow => "part_load_flow",
            ConstraintFamily::AlwaysOnFlow => "always_on_flow",
            ConstraintFamily::PartLoadOffset => "part_load_offset",
            ConstraintFamily::StartupLoss => "startup_loss",
            ConstraintFamily::NoStartFlow => "no_start_flow",
            ConstraintFamily::StartupTaper => "startup_taper",
            ConstraintFamily::RampPlain => "ramp_plain",
            ConstraintFamily::RampExceptions => "ramp_exceptions",
            ConstraintFamily::UptimeWindow => "uptime_window",
            ConstraintFamily::GradientPenalty => "gradient_penalty",
            ConstraintFamily::Fixed => "fixed",
            ConstraintFamily::External => "external",
        }
    }
}

impl std::fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted sum of arena variables, kept by id so that it can be evaluated
/// from solution values as well as turned into a `good_lp` expression.
#[derive(Debug, Clone, Default)]
pub struct LinearTerms {
    terms: Vec<(VarId, f64)>,
}

impl LinearTerms {
    pub fn push(&mut self, id: VarId, coefficient: f64) {
        self.terms.push((id, coefficient));
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn expression(&self, arena: &VarArena) -> Expression {
        let mut expr = Expression::from(0.0);
        for (id, coefficient) in &self.terms {
            expr += *coefficient * arena.handle(*id);
        }
        expr
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(id, c)| c * values[id.0]).sum()
    }
}

/// Display names of the entities owning variables.
#[derive(Debug, Clone, Default)]
pub struct EntityLabels {
    pub units: Vec<String>,
    pub storages: Vec<String>,
    pub transmissions: Vec<String>,
    /// "commodity (direction)" per ratio record
    pub ratios: Vec<String>,
}

impl EntityLabels {
    fn from_system(system: &EnergySystem) -> Self {
        Self {
            units: system.units.iter().map(|u| u.label()).collect(),
            storages: system.storages.iter().map(|s| s.label()).collect(),
            transmissions: system.transmissions.iter().map(|t| t.label()).collect(),
            ratios: system
                .ratios
                .iter()
                .map(|r| format!("{} ({})", r.commodity, r.direction))
                .collect(),
        }
    }

    pub fn owner(&self, owner: Owner) -> &str {
        match owner {
            Owner::Unit(i) => &self.units[i],
            Owner::Storage(i) => &self.storages[i],
            Owner::Transmission(i) => &self.transmissions[i],
        }
    }

    /// e.g. "e_in 2020.Mid.Coal Coal (in) t=3"
    pub fn describe(&self, key: &VarKey, horizon: &Horizon) -> String {
        let mut name = format!("{} {}", key.family, self.owner(key.owner));
        if let Some(ratio) = key.ratio {
            name.push_str(&format!(" {}", self.ratios[ratio]));
        }
        if let Some(step) = key.step {
            name.push_str(&format!(" t={}", horizon.label(step)));
        }
        name
    }
}

/// Builds an [`AssembledModel`] from an energy system.
pub struct ModelBuilder<'a> {
    system: &'a EnergySystem,
    relax_integrality: bool,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(system: &'a EnergySystem) -> Self {
        Self {
            system,
            relax_integrality: false,
        }
    }

    /// Declare booleans continuous on [0, 1] (LP relaxation).
    pub fn relax_integrality(mut self, relax: bool) -> Self {
        self.relax_integrality = relax;
        self
    }

    pub fn build(self) -> ModelResult<AssembledModel> {
        let system = self.system;
        let diagnostics = validate(system)?;

        let mut assembly = Assembly {
            system,
            arena: VarArena::new(self.relax_integrality),
            constraints: Vec::new(),
            startup_energy: LinearTerms::default(),
            gradient_penalty: LinearTerms::default(),
            big_m: Vec::new(),
        };

        let mut plans = Vec::with_capacity(system.units.len());
        for index in 0..system.units.len() {
            let plan = plan_unit(system, index)?;
            assembly.unit(&plan);
            plans.push(plan);
        }
        for index in 0..system.storages.len() {
            assembly.storage(index);
        }
        for index in 0..system.transmissions.len() {
            assembly.transmission(index);
        }

        let model = AssembledModel {
            arena: assembly.arena,
            constraints: assembly.constraints,
            plans,
            startup_energy: assembly.startup_energy,
            gradient_penalty: assembly.gradient_penalty,
            extra_objective: Expression::from(0.0),
            big_m: assembly.big_m,
            labels: EntityLabels::from_system(system),
            horizon: system.horizon.clone(),
            diagnostics,
        };
        info!(
            "assembled model: {} units, {} variables ({} boolean), {} constraints",
            model.plans.len(),
            model.variable_count(),
            model.boolean_count(),
            model.constraint_count()
        );
        Ok(model)
    }
}

/// Working state while rules are emitted.
struct Assembly<'a> {
    system: &'a EnergySystem,
    arena: VarArena,
    constraints: Vec<(ConstraintFamily, Constraint)>,
    startup_energy: LinearTerms,
    gradient_penalty: LinearTerms,
    big_m: Vec<BigMEntry>,
}

impl Assembly<'_> {
    fn push(&mut self, family: ConstraintFamily, constraint: Constraint) {
        self.constraints.push((family, constraint));
    }

    fn extend(&mut self, family: ConstraintFamily, constraints: impl IntoIterator<Item = Constraint>) {
        for constraint in constraints {
            self.constraints.push((family, constraint));
        }
    }

    fn record_big_m(&mut self, family: ConstraintFamily, entity: &str, commodity: Option<String>, value: f64) {
        self.big_m.push(BigMEntry {
            family,
            entity: entity.to_string(),
            commodity,
            value,
        });
    }

    fn ratio_label(&self, ratio: usize) -> String {
        let r = &self.system.ratios[ratio];
        format!("{} ({})", r.commodity, r.direction)
    }

    /// Capacity variable with its definition and bounds.
    fn capacity(
        &mut self,
        owner: Owner,
        families: (VarFamily, VarFamily),
        bounds: CapacityBounds,
        build: Option<Variable>,
        entity: &str,
    ) -> Variable {
        let (total, new) = families;
        let cap = self.arena.declare(VarKey::entity(total, owner), Domain::non_negative(bounds.up));
        let new_cap = (!bounds.is_fixed()).then(|| {
            self.arena.declare(
                VarKey::entity(new, owner),
                Domain::non_negative(bounds.up - bounds.installed),
            )
        });
        self.push(
            ConstraintFamily::CapacityDefinition,
            capacity::capacity_definition(cap, new_cap, bounds.installed),
        );

        match build {
            Some(build) => {
                self.extend(
                    ConstraintFamily::CapacityBounds,
                    capacity::discrete_bounds(cap, build, &bounds),
                );
                self.record_big_m(ConstraintFamily::CapacityBounds, entity, None, bounds.up);
            }
            None => self.extend(
                ConstraintFamily::CapacityBounds,
                capacity::continuous_bounds(cap, &bounds),
            ),
        }
        cap
    }

    fn build_flag(&mut self, owner: Owner) -> Option<Variable> {
        self.system
            .features
            .min_cap
            .then(|| self.arena.declare(VarKey::entity(VarFamily::Build, owner), Domain::Boolean))
    }

    fn unit(&mut self, plan: &UnitPlan) {
        let system = self.system;
        let unit = &system.units[plan.unit];
        let owner = Owner::Unit(plan.unit);
        let horizon = &system.horizon;
        let dt = horizon.dt;
        let cap_up = unit.cap_up;

        debug!(
            unit = %plan.label,
            operating = plan.operating.is_some(),
            part_load = ?plan.part_load,
            gradient = ?plan.gradient,
            "planning unit"
        );

        let build = if plan.capacity.discrete {
            self.build_flag(owner)
        } else {
            None
        };
        let cap = self.capacity(
            owner,
            (VarFamily::Capacity, VarFamily::NewCapacity),
            plan.capacity.bounds,
            build,
            &plan.label,
        );

        let tau: Vec<Variable> = horizon
            .positions()
            .map(|p| {
                self.arena.declare(
                    VarKey::at(VarFamily::Throughput, owner, p),
                    Domain::non_negative(big_m::throughput(cap_up, dt)),
                )
            })
            .collect();
        for &t in &tau {
            self.push(
                ConstraintFamily::ThroughputCapacity,
                capacity::throughput_capacity(t, cap, dt),
            );
        }

        let run = match plan.operating {
            Some(operating) => Some(self.operating_state(plan, &tau, cap, operating)),
            None => {
                // only part-load ratios carry a minimum load
                if plan.part_load == PartLoadMode::AlwaysOn {
                    for p in horizon.modeled() {
                        self.push(
                            ConstraintFamily::ThroughputFloor,
                            capacity::throughput_floor(tau[p], cap, unit.min_fraction, dt),
                        );
                    }
                }
                None
            }
        };

        self.flows(plan, &tau, cap);
        self.ramp(plan, &tau, cap);
        if let (Some(run), Some(operating)) = (&run, plan.operating) {
            if operating.min_uptime > 0 {
                self.min_uptime(owner, run, operating.min_uptime, operating.pinned_steps);
            }
        }
        if let Some(factor) = plan.grad_penalty {
            self.penalty_slacks(owner, &tau, factor, big_m::throughput(cap_up, dt));
        }
    }

    /// Run/startup/turnoff with transitions, initial state and throughput
    /// coupling. Returns `run` for every position.
    fn operating_state(
        &mut self,
        plan: &UnitPlan,
        tau: &[Variable],
        cap: Variable,
        operating: OperatingPlan,
    ) -> Vec<Variable> {
        let system = self.system;
        let unit = &system.units[plan.unit];
        let owner = Owner::Unit(plan.unit);
        let horizon = &system.horizon;
        let dt = horizon.dt;

        let run: Vec<Variable> = horizon
            .positions()
            .map(|p| self.arena.declare(VarKey::at(VarFamily::Run, owner, p), Domain::Boolean))
            .collect();

        self.push(
            ConstraintFamily::InitialState,
            commitment::pin(run[0], if operating.initially_on { 1.0 } else { 0.0 }),
        );
        for p in 1..=operating.pinned_steps {
            self.push(ConstraintFamily::PreActivePin, commitment::pin(run[p], 1.0));
        }

        for p in horizon.modeled() {
            let transition = commitment::Transition {
                prev_run: run[p - 1],
                run: run[p],
                startup: self
                    .arena
                    .declare(VarKey::at(VarFamily::Startup, owner, p), Domain::Boolean),
                turnoff: self
                    .arena
                    .declare(VarKey::at(VarFamily::Turnoff, owner, p), Domain::Boolean),
            };
            self.extend(
                ConstraintFamily::StartupDetection,
                commitment::startup_detection(&transition),
            );
            self.extend(
                ConstraintFamily::TurnoffDetection,
                commitment::turnoff_detection(&transition),
            );
        }

        let params = commitment::ThroughputParams {
            min_fraction: unit.min_fraction,
            dt,
            big_m: big_m::throughput(unit.cap_up, dt),
        };
        self.record_big_m(ConstraintFamily::ThroughputMax, &plan.label, None, params.big_m);
        if unit.min_fraction > 0.0 {
            self.record_big_m(ConstraintFamily::ThroughputMin, &plan.label, None, params.big_m);
        }
        for p in horizon.positions() {
            let vars = commitment::ThroughputVars {
                tau: tau[p],
                run: run[p],
                cap,
            };
            self.push(
                ConstraintFamily::ThroughputMax,
                commitment::throughput_max(&vars, &params),
            );
            if unit.min_fraction > 0.0 {
                self.push(
                    ConstraintFamily::ThroughputMin,
                    commitment::throughput_min(&vars, &params),
                );
            }
        }
        run
    }

    fn flow_family(direction: Direction) -> VarFamily {
        match direction {
            Direction::In => VarFamily::FlowIn,
            Direction::Out => VarFamily::FlowOut,
        }
    }

    fn flows(&mut self, plan: &UnitPlan, tau: &[Variable], cap: Variable) {
        let owner = Owner::Unit(plan.unit);
        let modeled = self.system.horizon.modeled();
        let dt = self.system.horizon.dt;

        for linear in &plan.linear_ratios {
            for p in modeled.clone() {
                let flow = self.arena.declare(
                    VarKey::flow(Self::flow_family(linear.direction), owner, p, linear.ratio),
                    Domain::non_negative(f64::INFINITY),
                );
                self.push(
                    ConstraintFamily::LinearFlow,
                    partload::linear_flow(flow, tau[p], linear.value),
                );
            }
        }

        for ratio in &plan.part_load_ratios {
            match plan.part_load {
                PartLoadMode::AlwaysOn => {
                    for p in modeled.clone() {
                        let flow = self.arena.declare(
                            VarKey::flow(Self::flow_family(ratio.direction), owner, p, ratio.ratio),
                            Domain::non_negative(f64::INFINITY),
                        );
                        self.push(
                            ConstraintFamily::AlwaysOnFlow,
                            partload::always_on_flow(
                                flow,
                                cap,
                                tau[p],
                                ratio.coefficients.offset_spec,
                                ratio.coefficients.slope,
                                dt,
                            ),
                        );
                    }
                }
                PartLoadMode::Switched => self.switched_flow(plan, ratio, tau, cap),
                PartLoadMode::None => {}
            }
        }
    }

    /// Part-load flow of a unit with an operating state, including startup
    /// loss and taper.
    fn switched_flow(&mut self, plan: &UnitPlan, ratio: &PartLoadRatio, tau: &[Variable], cap: Variable) {
        let system = self.system;
        let unit = &system.units[plan.unit];
        let owner = Owner::Unit(plan.unit);
        let dt = system.horizon.dt;
        let commodity = self.ratio_label(ratio.ratio);

        let (offset_family, no_start_family) = match ratio.direction {
            Direction::In => (VarFamily::OffsetIn, VarFamily::NoStartIn),
            Direction::Out => (VarFamily::OffsetOut, VarFamily::NoStartOut),
        };

        let offset_params = partload::OffsetParams {
            offset_spec: ratio.coefficients.offset_spec,
            big_m: big_m::offset(unit.cap_up, ratio.full_ratio, ratio.coefficients.offset_spec),
        };
        self.record_big_m(
            ConstraintFamily::PartLoadOffset,
            &plan.label,
            Some(commodity.clone()),
            offset_params.big_m,
        );

        let loss_params = ratio.startup_loss.map(|specific_loss| transient::StartupLossParams {
            specific_loss,
            big_m: big_m::startup_loss(unit.cap_up, unit.start_up_energy, ratio.full_ratio),
        });
        if let Some(params) = &loss_params {
            self.record_big_m(
                ConstraintFamily::StartupLoss,
                &plan.label,
                Some(commodity.clone()),
                params.big_m,
            );
        }

        let taper_params = plan.taper_factor.map(|factor| transient::TaperParams {
            factor,
            big_m: big_m::startup_taper(unit.cap_up, ratio.peak_ratio, dt),
        });
        if let Some(params) = &taper_params {
            self.record_big_m(
                ConstraintFamily::StartupTaper,
                &plan.label,
                Some(commodity.clone()),
                params.big_m,
            );
        }

        for p in system.horizon.modeled() {
            let run = self.arena.declare(VarKey::at(VarFamily::Run, owner, p), Domain::Boolean);
            let startup = self
                .arena
                .declare(VarKey::at(VarFamily::Startup, owner, p), Domain::Boolean);
            let flow = self.arena.declare(
                VarKey::flow(Self::flow_family(ratio.direction), owner, p, ratio.ratio),
                Domain::non_negative(f64::INFINITY),
            );
            let offset = self.arena.declare(
                VarKey::flow(offset_family, owner, p, ratio.ratio),
                Domain::symmetric(offset_params.big_m),
            );
            self.extend(
                ConstraintFamily::PartLoadOffset,
                partload::offset_linearisation(
                    &partload::OffsetVars { offset, cap, run },
                    &offset_params,
                ),
            );

            let loss = loss_params.as_ref().map(|params| {
                let key = VarKey::flow(VarFamily::StartupLoss, owner, p, ratio.ratio);
                let loss = self.arena.declare(key, Domain::symmetric(params.big_m));
                self.extend(
                    ConstraintFamily::StartupLoss,
                    transient::startup_loss(
                        &transient::StartupLossVars { loss, cap, startup },
                        params,
                    ),
                );
                if let Some(id) = self.arena.id(&key) {
                    self.startup_energy.push(id, dt);
                }
                loss
            });

            match &taper_params {
                Some(params) => {
                    let no_start = self.arena.declare(
                        VarKey::flow(no_start_family, owner, p, ratio.ratio),
                        Domain::non_negative(f64::INFINITY),
                    );
                    self.push(
                        ConstraintFamily::NoStartFlow,
                        partload::defines(
                            no_start,
                            partload::part_load_expression(
                                offset,
                                tau[p],
                                ratio.coefficients.slope,
                                dt,
                            ),
                        ),
                    );
                    let actual = match loss {
                        Some(loss) => flow - dt * loss,
                        None => Expression::from(flow),
                    };
                    self.extend(
                        ConstraintFamily::StartupTaper,
                        transient::startup_taper(
                            &transient::TaperVars {
                                actual,
                                no_start,
                                startup,
                            },
                            params,
                        ),
                    );
                }
                None => self.push(
                    ConstraintFamily::PartLoadFlow,
                    partload::part_load_flow(
                        flow,
                        offset,
                        tau[p],
                        ratio.coefficients.slope,
                        dt,
                        loss,
                    ),
                ),
            }
        }
    }

    fn ramp(&mut self, plan: &UnitPlan, tau: &[Variable], cap: Variable) {
        let system = self.system;
        let unit = &system.units[plan.unit];
        let owner = Owner::Unit(plan.unit);
        let dt = system.horizon.dt;

        match plan.gradient {
            GradientRule::Unlimited => {}
            GradientRule::Plain { max_grad } => {
                let params = gradient::RampParams { max_grad, dt };
                for p in system.horizon.modeled() {
                    let vars = gradient::RampVars {
                        tau: tau[p],
                        prev_tau: tau[p - 1],
                        cap,
                    };
                    self.extend(
                        ConstraintFamily::RampPlain,
                        gradient::plain_ramp(&vars, &params),
                    );
                }
            }
            GradientRule::StartupExceptions { max_grad } => {
                let params = gradient::ExceptionParams {
                    max_grad,
                    min_fraction: unit.min_fraction,
                    dt,
                    big_m: big_m::ramp(unit.cap_up, dt),
                };
                self.record_big_m(ConstraintFamily::RampExceptions, &plan.label, None, params.big_m);
                for p in system.horizon.modeled() {
                    let vars = gradient::RampVars {
                        tau: tau[p],
                        prev_tau: tau[p - 1],
                        cap,
                    };
                    let transitions = gradient::RampTransitions {
                        startup: self
                            .arena
                            .declare(VarKey::at(VarFamily::Startup, owner, p), Domain::Boolean),
                        turnoff: self
                            .arena
                            .declare(VarKey::at(VarFamily::Turnoff, owner, p), Domain::Boolean),
                    };
                    self.extend(
                        ConstraintFamily::RampExceptions,
                        gradient::ramp_with_exceptions(&vars, &transitions, &params),
                    );
                }
            }
        }
    }

    fn min_uptime(&mut self, owner: Owner, run: &[Variable], min_uptime: usize, pinned_steps: usize) {
        for p in self.system.horizon.modeled() {
            if p <= pinned_steps {
                continue;
            }
            let n = uptime::window_len(min_uptime, p);
            let history: Vec<Variable> = (1..=n).map(|i| run[p - i]).collect();
            let window = self
                .arena
                .declare(VarKey::at(VarFamily::UptimeWindow, owner, p), Domain::Boolean);
            self.extend(
                ConstraintFamily::UptimeWindow,
                uptime::uptime_window(&uptime::UptimeWindow {
                    window,
                    run: run[p],
                    prev_run: run[p - 1],
                    history: &history,
                }),
            );
        }
    }

    fn penalty_slacks(&mut self, owner: Owner, tau: &[Variable], factor: f64, bound: f64) {
        for p in self.system.horizon.modeled() {
            let up_key = VarKey::at(VarFamily::RampUp, owner, p);
            let down_key = VarKey::at(VarFamily::RampDown, owner, p);
            let slack = penalty::RampSlack {
                tau: tau[p],
                prev_tau: tau[p - 1],
                up: self.arena.declare(up_key, Domain::non_negative(bound)),
                down: self.arena.declare(down_key, Domain::non_negative(bound)),
            };
            self.push(ConstraintFamily::GradientPenalty, penalty::ramp_split(&slack));
            for key in [up_key, down_key] {
                if let Some(id) = self.arena.id(&key) {
                    self.gradient_penalty.push(id, factor);
                }
            }
        }
    }

    fn storage(&mut self, index: usize) {
        let storage = &self.system.storages[index];
        let owner = Owner::Storage(index);
        let label = storage.label();
        // energy and power share one build flag
        let build = self.build_flag(owner);
        self.capacity(
            owner,
            (VarFamily::Capacity, VarFamily::NewCapacity),
            storage.energy(),
            build,
            &label,
        );
        self.capacity(
            owner,
            (VarFamily::PowerCapacity, VarFamily::NewPowerCapacity),
            storage.power(),
            build,
            &label,
        );
    }

    fn transmission(&mut self, index: usize) {
        let line = &self.system.transmissions[index];
        let owner = Owner::Transmission(index);
        let label = line.label();
        let build = self.build_flag(owner);
        self.capacity(
            owner,
            (VarFamily::Capacity, VarFamily::NewCapacity),
            line.capacity(),
            build,
            &label,
        );
    }
}

/// Variables, constraints and aggregate objective terms of one model.
pub struct AssembledModel {
    pub(crate) arena: VarArena,
    pub(crate) constraints: Vec<(ConstraintFamily, Constraint)>,
    plans: Vec<UnitPlan>,
    pub(crate) startup_energy: LinearTerms,
    pub(crate) gradient_penalty: LinearTerms,
    pub(crate) extra_objective: Expression,
    big_m: Vec<BigMEntry>,
    pub(crate) labels: EntityLabels,
    pub(crate) horizon: Horizon,
    pub(crate) diagnostics: Diagnostics,
}

impl AssembledModel {
    pub fn builder(system: &EnergySystem) -> ModelBuilder<'_> {
        ModelBuilder::new(system)
    }

    pub fn var(&self, key: &VarKey) -> Option<Variable> {
        self.arena.get(key)
    }

    pub fn arena(&self) -> &VarArena {
        &self.arena
    }

    pub fn plans(&self) -> &[UnitPlan] {
        &self.plans
    }

    pub fn plan(&self, unit: usize) -> Option<&UnitPlan> {
        self.plans.get(unit)
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn labels(&self) -> &EntityLabels {
        &self.labels
    }

    /// Validation warnings carried into the solution.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn variable_count(&self) -> usize {
        self.arena.len()
    }

    pub fn boolean_count(&self) -> usize {
        self.arena
            .slots()
            .iter()
            .filter(|s| s.key.family.is_boolean())
            .count()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn family_counts(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts = BTreeMap::new();
        for (family, _) in &self.constraints {
            *counts.entry(*family).or_insert(0) += 1;
        }
        counts
    }

    pub fn family_count(&self, family: ConstraintFamily) -> usize {
        self.constraints.iter().filter(|(f, _)| *f == family).count()
    }

    pub fn big_m_audit(&self) -> &[BigMEntry] {
        &self.big_m
    }

    /// `Σ dt·startup_loss` over all startup-loss helpers.
    pub fn startup_energy(&self) -> Expression {
        self.startup_energy.expression(&self.arena)
    }

    /// `Σ grad-penalty·(up + down)` over all penalty slacks.
    pub fn gradient_penalty(&self) -> Expression {
        self.gradient_penalty.expression(&self.arena)
    }

    /// Pin a variable to a value before solving.
    pub fn fix(&mut self, key: VarKey, value: f64) -> ModelResult<()> {
        let var = self
            .arena
            .get(&key)
            .ok_or_else(|| ModelError::UnknownVariable(key.to_string()))?;
        self.constraints
            .push((ConstraintFamily::Fixed, commitment::pin(var, value)));
        Ok(())
    }

    /// Add a constraint from a surrounding model (commodity balance, ...).
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push((ConstraintFamily::External, constraint));
    }

    /// Add a term to the objective next to the two aggregates.
    pub fn add_objective(&mut self, expr: Expression) {
        self.extra_objective += expr;
    }

    /// Human-readable name of a variable key.
    pub fn describe(&self, key: &VarKey) -> String {
        self.labels.describe(key, &self.horizon)
    }
}
