//! Hook system: transform registry and the enhancement pipeline.

pub mod pipeline;
pub mod registry;

pub use pipeline::{HookPipeline, PipelineStage};
pub use registry::{HookRegistry, TransformHook};
