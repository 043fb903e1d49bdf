pub mod context;
pub mod resource;
pub mod selector;

pub use context::{BuildContext, BuildError, InMemoryBuildContext};
pub use resource::{InputSelection, OutputHandle, ProcessableResource, ResourceDescriptor};
pub use selector::ResourceSelector;
