// rentcart/src/pipeline/mod.rs

//! A small async step engine: named steps with `before`/`on`/`after` handlers
//! running in order over a shared `ContextData<T>`. The checkout attempt is
//! expressed as one of these pipelines.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod error;
pub mod execution;
pub mod hooks;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineOutcome};
pub use definition::{Handler, Pipeline, StepDef};
pub use error::PipelineError;
