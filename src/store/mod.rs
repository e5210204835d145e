//! Shared mutable state behind small get/update/remove interfaces.
//!
//! The scheduler never touches the underlying maps; swapping a backend
//! means swapping a store type, not the scheduling logic.

pub mod keepalive;
pub mod policy;
pub mod tabs;

pub use keepalive::KeepAliveRegistry;
pub use policy::PolicyStore;
pub use tabs::TabStateStore;
