//! Composable pipeline steps.
//!
//! Deploy and distribute are independent operations. Each one is a
//! [`PipelineStep`]: it takes an input and yields an output or its own error.
//! Chaining two steps tags a failure with the step that produced it, and a
//! later step never runs after an earlier one failed.

use std::error::Error as StdError;

use thiserror::Error;

/// One operation in a pipeline.
pub trait PipelineStep {
    type Input;
    type Output;
    type Error: StdError + Send + Sync + 'static;

    /// Short name used to tag failures.
    fn name(&self) -> &'static str;

    /// Run the step to completion.
    fn run(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;

    /// Run `next` after this step succeeds.
    fn then<B>(self, next: B) -> Chain<Self, B>
    where
        Self: Sized,
        B: PipelineStep<Input = ()>,
    {
        Chain { first: self, second: next }
    }
}

/// A failure tagged with the step that produced it.
#[derive(Debug, Error)]
#[error("{step} failed")]
pub struct PipelineError {
    /// Name of the failed step
    pub step: &'static str,

    /// The step's own error
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl PipelineError {
    fn new<E: StdError + Send + Sync + 'static>(step: &'static str, error: E) -> Self {
        PipelineError {
            step,
            source: Box::new(error),
        }
    }

    /// The step's error, if it has type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }
}

/// Two steps run in sequence. The second step takes no input from the
/// first; both outputs are returned.
#[derive(Debug)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> PipelineStep for Chain<A, B>
where
    A: PipelineStep,
    B: PipelineStep<Input = ()>,
{
    type Input = A::Input;
    type Output = (A::Output, B::Output);
    type Error = PipelineError;

    fn name(&self) -> &'static str {
        "chain"
    }

    fn run(&self, input: A::Input) -> Result<Self::Output, PipelineError> {
        let first = self
            .first
            .run(input)
            .map_err(|e| PipelineError::new(self.first.name(), e))?;

        tracing::debug!("step `{}` finished, starting `{}`", self.first.name(), self.second.name());

        let second = self
            .second
            .run(())
            .map_err(|e| PipelineError::new(self.second.name(), e))?;

        Ok((first, second))
    }
}
