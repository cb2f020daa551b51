//! # Calculation Results
//!
//! A [`CalculationResult`] is a live, engine-owned object. It must be released
//! with [`CalculationResult::dispose`] once read. Dropping one that was never
//! disposed logs a warning and schedules the dispose on the current runtime.

use tokio::runtime::Handle;
use tracing::{debug, instrument, warn};

use crate::framework::{EngineError, EngineHandle};
use crate::model::{ImpactValue, TechFlow, TechFlowValue};

#[derive(Debug)]
pub struct CalculationResult {
    id: String,
    engine: EngineHandle,
    disposed: bool,
}

impl CalculationResult {
    pub(crate) fn new(id: String, engine: EngineHandle) -> Self {
        Self {
            id,
            engine,
            disposed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[instrument(skip(self), fields(result = %self.id))]
    pub async fn total_impacts(&self) -> Result<Vec<ImpactValue>, EngineError> {
        self.engine.total_impacts(&self.id).await
    }

    /// The technology flows of the solved system with their scaled amounts.
    #[instrument(skip(self), fields(result = %self.id))]
    pub async fn total_requirements(&self) -> Result<Vec<TechFlowValue>, EngineError> {
        self.engine.total_requirements(&self.id).await
    }

    /// Upstream impacts of one technology flow.
    #[instrument(
        skip(self, tech_flow),
        fields(result = %self.id, provider = tech_flow.provider.name_or_empty())
    )]
    pub async fn total_impacts_of(
        &self,
        tech_flow: &TechFlow,
    ) -> Result<Vec<ImpactValue>, EngineError> {
        self.engine.total_impacts_of(&self.id, tech_flow.clone()).await
    }

    /// Releases the result. Called at most once; the result is consumed either way.
    ///
    /// If this future is dropped before the engine answers, the result counts as
    /// undisposed and `Drop` schedules the dispose instead.
    #[instrument(skip(self), fields(result = %self.id))]
    pub async fn dispose(mut self) -> Result<(), EngineError> {
        debug!("Disposing result");
        let outcome = self.engine.dispose(&self.id).await;
        self.disposed = true;
        outcome
    }
}

impl Drop for CalculationResult {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        warn!(result = %self.id, "Calculation result dropped without dispose");
        match Handle::try_current() {
            Ok(runtime) => {
                let engine = self.engine.clone();
                let id = std::mem::take(&mut self.id);
                runtime.spawn(async move {
                    if let Err(e) = engine.dispose(&id).await {
                        warn!(result = %id, error = %e, "Deferred dispose failed");
                    }
                });
            }
            Err(_) => warn!(result = %self.id, "No runtime to dispose result on"),
        }
    }
}
