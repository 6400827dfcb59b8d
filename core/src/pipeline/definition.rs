// rentcart/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct, its handler type and step bookkeeping.

use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineControl;
use crate::pipeline::error::PipelineError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the run's `ContextData` and resolves to a
/// flow signal or the pipeline's error type.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// A named step. Optional steps may be left without handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  pub optional: bool,
}

/// Which phase of a step a handler is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Phase {
  Before,
  On,
  After,
}

/// An ordered list of named steps, each with `before`, `on` and `after`
/// handlers, executed against a shared `ContextData<TData>`.
///
/// `Err` is the error type handlers return; it must absorb `PipelineError` so
/// the executor can report configuration problems through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef>,
  pub(crate) handlers: HashMap<(String, Phase), Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional)` pairs, in execution order.
  ///
  /// Fails with `DuplicateStep` if a name appears twice.
  pub fn new(step_defs: &[(&str, bool)]) -> Result<Self, PipelineError> {
    let mut pipeline = Self {
      steps: Vec::with_capacity(step_defs.len()),
      handlers: HashMap::new(),
    };
    for (name, optional) in step_defs {
      pipeline.push_step(name, *optional)?;
    }
    Ok(pipeline)
  }

  /// Appends a step at the end of the pipeline.
  pub fn push_step(&mut self, name: &str, optional: bool) -> Result<(), PipelineError> {
    self.ensure_step_not_exists(name)?;
    self.steps.push(StepDef {
      name: name.to_string(),
      optional,
    });
    Ok(())
  }

  /// Inserts a step right after `existing_step_name`.
  pub fn insert_after_step(&mut self, existing_step_name: &str, name: &str, optional: bool) -> Result<(), PipelineError> {
    let idx = self.position(existing_step_name)?;
    self.ensure_step_not_exists(name)?;
    self.steps.insert(
      idx + 1,
      StepDef {
        name: name.to_string(),
        optional,
      },
    );
    Ok(())
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|s| s.name.as_str())
  }

  pub(crate) fn position(&self, step_name: &str) -> Result<usize, PipelineError> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| PipelineError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  fn ensure_step_not_exists(&self, step_name: &str) -> Result<(), PipelineError> {
    if self.steps.iter().any(|s| s.name == step_name) {
      return Err(PipelineError::DuplicateStep {
        step_name: step_name.to_string(),
      });
    }
    Ok(())
  }

  pub(crate) fn handlers_for(&self, step_name: &str, phase: Phase) -> &[Handler<TData, Err>] {
    self
      .handlers
      .get(&(step_name.to_string(), phase))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }
}
