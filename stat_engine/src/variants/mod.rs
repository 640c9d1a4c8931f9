//! Entity kinds
//!
//! Each kind wraps one [`UnitStats`](crate::unit::UnitStats) and supplies
//! its own base values and attribute set through
//! [`AttributeHost`](crate::host::AttributeHost).

mod autonomous;
mod dependent;
mod independent;

pub use autonomous::AutonomousActor;
pub use dependent::DependentActor;
pub use independent::IndependentActor;
