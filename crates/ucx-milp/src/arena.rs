//! Variable arena keyed by a composite `(family, owner, step, ratio)` key.
//!
//! Every decision variable of the formulation is declared here exactly once.
//! Handles are `good_lp::Variable`s; [`VarId`] indexes the arena's slots so
//! that solution values can be stored in a flat vector in declaration order.

use std::collections::HashMap;
use std::str::FromStr;

use good_lp::{variable, ProblemVariables, Variable};
use serde::Serialize;

/// Entity that owns a variable, by index into the system's record lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Owner {
    Unit(usize),
    Storage(usize),
    Transmission(usize),
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Unit(i) => write!(f, "u{}", i),
            Owner::Storage(i) => write!(f, "s{}", i),
            Owner::Transmission(i) => write!(f, "l{}", i),
        }
    }
}

/// Variable families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarFamily {
    /// Total capacity (unit, transmission, storage energy)
    Capacity,
    NewCapacity,
    /// Storage power capacity
    PowerCapacity,
    NewPowerCapacity,
    Build,
    Run,
    Startup,
    Turnoff,
    Throughput,
    FlowIn,
    FlowOut,
    OffsetIn,
    OffsetOut,
    StartupLoss,
    /// Flow the unit would have without the startup taper
    NoStartIn,
    NoStartOut,
    UptimeWindow,
    RampUp,
    RampDown,
}

impl VarFamily {
    pub const ALL: [VarFamily; 19] = [
        VarFamily::Capacity,
        VarFamily::NewCapacity,
        VarFamily::PowerCapacity,
        VarFamily::NewPowerCapacity,
        VarFamily::Build,
        VarFamily::Run,
        VarFamily::Startup,
        VarFamily::Turnoff,
        VarFamily::Throughput,
        VarFamily::FlowIn,
        VarFamily::FlowOut,
        VarFamily::OffsetIn,
        VarFamily::OffsetOut,
        VarFamily::StartupLoss,
        VarFamily::NoStartIn,
        VarFamily::NoStartOut,
        VarFamily::UptimeWindow,
        VarFamily::RampUp,
        VarFamily::RampDown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VarFamily::Capacity => "cap",
            VarFamily::NewCapacity => "cap_new",
            VarFamily::PowerCapacity => "cap_p",
            VarFamily::NewPowerCapacity => "cap_p_new",
            VarFamily::Build => "build",
            VarFamily::Run => "run",
            VarFamily::Startup => "startup",
            VarFamily::Turnoff => "turnoff",
            VarFamily::Throughput => "tau",
            VarFamily::FlowIn => "e_in",
            VarFamily::FlowOut => "e_out",
            VarFamily::OffsetIn => "offset_in",
            VarFamily::OffsetOut => "offset_out",
            VarFamily::StartupLoss => "startup_loss",
            VarFamily::NoStartIn => "e_in_no_start",
            VarFamily::NoStartOut => "e_out_no_start",
            VarFamily::UptimeWindow => "uptime_window",
            VarFamily::RampUp => "ramp_up",
            VarFamily::RampDown => "ramp_down",
        }
    }

    /// Families whose values must be 0 or 1.
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            VarFamily::Build
                | VarFamily::Run
                | VarFamily::Startup
                | VarFamily::Turnoff
                | VarFamily::UptimeWindow
        )
    }
}

impl std::fmt::Display for VarFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarFamily {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase().replace('-', "_");
        VarFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = VarFamily::ALL.iter().map(|f| f.as_str()).collect();
                format!(
                    "unknown variable family '{}'; supported values: {}",
                    value,
                    names.join(", ")
                )
            })
    }
}

/// Composite key of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarKey {
    pub family: VarFamily,
    pub owner: Owner,
    /// Horizon position; `None` for per-entity variables
    pub step: Option<usize>,
    /// Index into the system's ratios for per-commodity variables
    pub ratio: Option<usize>,
}

impl VarKey {
    pub fn entity(family: VarFamily, owner: Owner) -> Self {
        Self {
            family,
            owner,
            step: None,
            ratio: None,
        }
    }

    pub fn at(family: VarFamily, owner: Owner, step: usize) -> Self {
        Self {
            family,
            owner,
            step: Some(step),
            ratio: None,
        }
    }

    pub fn flow(family: VarFamily, owner: Owner, step: usize, ratio: usize) -> Self {
        Self {
            family,
            owner,
            step: Some(step),
            ratio: Some(ratio),
        }
    }
}

impl std::fmt::Display for VarKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}", self.family, self.owner)?;
        if let Some(step) = self.step {
            write!(f, ",t{}", step)?;
        }
        if let Some(ratio) = self.ratio {
            write!(f, ",r{}", ratio)?;
        }
        f.write_str("]")
    }
}

/// Index of a variable in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarId(pub usize);

/// Value domain of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    Boolean,
    Continuous { min: f64, max: f64 },
}

impl Domain {
    pub fn non_negative(max: f64) -> Self {
        Domain::Continuous { min: 0.0, max }
    }

    /// Sign-free helper bounded by `±bound`.
    pub fn symmetric(bound: f64) -> Self {
        Domain::Continuous {
            min: -bound,
            max: bound,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slot {
    pub key: VarKey,
    pub domain: Domain,
    pub handle: Variable,
}

/// Owns the problem variables while a model is being assembled.
pub struct VarArena {
    vars: ProblemVariables,
    slots: Vec<Slot>,
    index: HashMap<VarKey, VarId>,
    relax_integrality: bool,
}

impl VarArena {
    /// With `relax_integrality`, booleans are declared continuous on [0, 1].
    pub fn new(relax_integrality: bool) -> Self {
        Self {
            vars: ProblemVariables::new(),
            slots: Vec::new(),
            index: HashMap::new(),
            relax_integrality,
        }
    }

    pub fn relaxes_integrality(&self) -> bool {
        self.relax_integrality
    }

    /// Declare a variable, or return the existing handle for the key.
    pub fn declare(&mut self, key: VarKey, domain: Domain) -> Variable {
        if let Some(id) = self.index.get(&key) {
            return self.slots[id.0].handle;
        }

        let definition = match domain {
            Domain::Boolean if self.relax_integrality => variable().min(0.0).max(1.0),
            Domain::Boolean => variable().binary(),
            Domain::Continuous { min, max } => {
                let mut definition = variable();
                if min.is_finite() {
                    definition = definition.min(min);
                }
                if max.is_finite() {
                    definition = definition.max(max);
                }
                definition
            }
        };
        let handle = self.vars.add(definition.name(key.to_string()));

        let id = VarId(self.slots.len());
        self.slots.push(Slot {
            key,
            domain,
            handle,
        });
        self.index.insert(key, id);
        handle
    }

    pub fn get(&self, key: &VarKey) -> Option<Variable> {
        self.index.get(key).map(|id| self.slots[id.0].handle)
    }

    pub fn id(&self, key: &VarKey) -> Option<VarId> {
        self.index.get(key).copied()
    }

    pub fn handle(&self, id: VarId) -> Variable {
        self.slots[id.0].handle
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn count_of(&self, family: VarFamily) -> usize {
        self.slots.iter().filter(|s| s.key.family == family).count()
    }

    /// Hand the variables to a solver, keeping the slot table.
    pub(crate) fn into_parts(self) -> (ProblemVariables, VarTable) {
        (
            self.vars,
            VarTable {
                slots: self.slots,
                index: self.index,
            },
        )
    }
}

/// Slot table that outlives the arena, used to read solution values.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    slots: Vec<Slot>,
    index: HashMap<VarKey, VarId>,
}

impl VarTable {
    pub fn id(&self, key: &VarKey) -> Option<VarId> {
        self.index.get(key).copied()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_is_idempotent() {
        let mut arena = VarArena::new(false);
        let key = VarKey::at(VarFamily::Run, Owner::Unit(0), 3);
        let first = arena.declare(key, Domain::Boolean);
        let second = arena.declare(key, Domain::Boolean);

        assert_eq!(first, second);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.id(&key), Some(VarId(0)));
        assert_eq!(arena.get(&key), Some(first));
    }

    #[test]
    fn test_keys_are_distinct() {
        let mut arena = VarArena::new(false);
        arena.declare(VarKey::flow(VarFamily::FlowIn, Owner::Unit(0), 1, 0), Domain::non_negative(f64::INFINITY));
        arena.declare(VarKey::flow(VarFamily::FlowIn, Owner::Unit(0), 1, 1), Domain::non_negative(f64::INFINITY));
        arena.declare(VarKey::flow(VarFamily::FlowIn, Owner::Unit(1), 1, 0), Domain::non_negative(f64::INFINITY));
        arena.declare(VarKey::entity(VarFamily::Capacity, Owner::Storage(0)), Domain::non_negative(10.0));

        assert_eq!(arena.len(), 4);
        assert_eq!(arena.count_of(VarFamily::FlowIn), 3);
        assert_eq!(arena.count_of(VarFamily::Capacity), 1);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(
            VarKey::flow(VarFamily::OffsetIn, Owner::Unit(2), 5, 1).to_string(),
            "offset_in[u2,t5,r1]"
        );
        assert_eq!(
            VarKey::entity(VarFamily::Build, Owner::Transmission(0)).to_string(),
            "build[l0]"
        );
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("run".parse::<VarFamily>().unwrap(), VarFamily::Run);
        assert_eq!("e-out".parse::<VarFamily>().unwrap(), VarFamily::FlowOut);
        assert_eq!("TAU".parse::<VarFamily>().unwrap(), VarFamily::Throughput);
        let err = "voltage".parse::<VarFamily>().unwrap_err();
        assert!(err.contains("supported values"));
    }

    #[test]
    fn test_boolean_families() {
        let booleans: Vec<_> = VarFamily::ALL.iter().filter(|f| f.is_boolean()).collect();
        assert_eq!(booleans.len(), 5);
        assert!(!VarFamily::StartupLoss.is_boolean());
    }
}
