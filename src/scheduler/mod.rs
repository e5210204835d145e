//! The periodic evaluation loop and its decision machine.

pub mod driver;
pub mod engine;

pub use driver::TickDriver;
pub use engine::{decide, Decision, Exemption, Scheduler, TickSummary};
