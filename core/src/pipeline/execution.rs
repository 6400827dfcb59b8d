// rentcart/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order against a shared context.

use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::{PipelineControl, PipelineOutcome};
use crate::pipeline::definition::{Phase, Pipeline};
use crate::pipeline::error::PipelineError;
use tracing::{event, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// Per step: all `before` handlers, then `on`, then `after`. The first
  /// handler error aborts the run and is returned as-is. A non-optional step
  /// with no handlers at all fails with `PipelineError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineOutcome, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = tracing::info_span!(
        "pipeline_step",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      let control = self.run_step(step_name, step_def.optional, ctx_data.clone()).instrument(step_span).await?;
      if control == PipelineControl::Stop {
        event!(Level::INFO, step_name, "Pipeline stopped by a handler.");
        return Ok(PipelineOutcome::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineOutcome::Completed)
  }

  async fn run_step(&self, step_name: &str, optional: bool, ctx_data: ContextData<TData>) -> Result<PipelineControl, Err> {
    let phases = [Phase::Before, Phase::On, Phase::After];
    let has_handlers = phases.iter().any(|phase| !self.handlers_for(step_name, *phase).is_empty());

    if !has_handlers {
      if optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(PipelineControl::Continue);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(PipelineError::HandlerMissing {
        step_name: step_name.to_string(),
      }));
    }

    for phase in phases {
      for handler_fn in self.handlers_for(step_name, phase) {
        match handler_fn(ctx_data.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => return Ok(PipelineControl::Stop),
          Err(e) => {
            event!(Level::WARN, error = %e, ?phase, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Step finished.");
    Ok(PipelineControl::Continue)
  }
}
