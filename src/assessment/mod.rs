//! Tomato life-cycle assessment on top of the engine client.
//!
//! - [`updater`] writes mapped amounts onto process exchanges.
//! - [`decomposer`] splits one calculation into total and per-subsystem impacts.
//! - [`service`] ties mapping, updates and decomposition into one request.

pub mod decomposer;
pub mod service;
pub mod updater;

pub use decomposer::{find_tech_flow, ImpactBreakdown, ImpactDecomposer};
pub use service::{AssessmentReport, AssessmentService, ProcessImpact, ProcessSummary};
pub use updater::{apply_amounts, stage, update_process_exchanges};

use thiserror::Error;

use crate::config::{DEFAULT_CALCULATION_AMOUNT, DEFAULT_IMPACT_METHOD_ID, DEFAULT_PRODUCT_SYSTEM};
use crate::framework::EngineError;
use crate::mapping::MappingError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssessmentError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// Deployment constants of the assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSettings {
    pub impact_method_id: String,
    /// Reference amount the product system is scaled to.
    pub calculation_amount: f64,
    pub product_system: String,
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            impact_method_id: DEFAULT_IMPACT_METHOD_ID.to_string(),
            calculation_amount: DEFAULT_CALCULATION_AMOUNT,
            product_system: DEFAULT_PRODUCT_SYSTEM.to_string(),
        }
    }
}
