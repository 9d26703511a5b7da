//! Pure constraint rules.
//!
//! Each rule takes variable handles and an explicit parameter struct and
//! returns the constraints it stands for. Rules never look at the system or
//! the arena; [`crate::model`] decides which rules apply and collects their
//! output by [`crate::model::ConstraintFamily`].

pub mod capacity;
pub mod commitment;
pub mod gradient;
pub mod partload;
pub mod penalty;
pub mod transient;
pub mod uptime;
