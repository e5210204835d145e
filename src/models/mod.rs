pub mod constants;
pub mod policy;
pub mod signal;
pub mod tab;

pub use policy::Policy;
pub use signal::SignalEvent;
pub use tab::{HeuristicSample, TabId, TabSnapshot, TabState};
