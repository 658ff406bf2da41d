// Host model and registry.
//
// Hosts are owned by the registry as Arc<Host>; tasks and completion
// handlers hold only Weak back-references so an in-flight task never
// keeps a deleted host alive.

pub mod host;
pub mod registry;

pub use host::{Host, HostPersonality};
pub use registry::HostRegistry;
