//! # Assessment Service
//!
//! Turns one questionnaire record into the five impact lists of the response.
//!
//! ## Flow
//! 1. Map the record into four flow tables (no engine traffic yet).
//! 2. Resolve the four subsystem processes and the product system by name.
//! 3. Stage the new amounts on copies of all four processes, then persist them.
//! 4. Calculate the product system once and decompose the result.
//!
//! Any failure in steps 1-3 happens before a single process is written. Requests
//! through one service are serialized: the next one starts only after the
//! previous has read its impacts.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::decomposer::{ImpactBreakdown, ImpactDecomposer};
use super::updater::stage;
use super::{AssessmentError, AssessmentSettings};
use crate::clients::OlcaClient;
use crate::mapping::{map_subsystems, Subsystem};
use crate::model::{AcvInput, EngineEntity, ImpactEntry, Key, Process, Ref};

/// The response of an assessment, one impact list per key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub impacto_fertilizantes: Vec<ImpactEntry>,
    pub impacto_manejo_cultivo: Vec<ImpactEntry>,
    pub impacto_pesticidas: Vec<ImpactEntry>,
    pub impacto_sistema_riego: Vec<ImpactEntry>,
    pub impacto_total: Vec<ImpactEntry>,
}

impl From<ImpactBreakdown> for AssessmentReport {
    fn from(breakdown: ImpactBreakdown) -> Self {
        Self {
            impacto_fertilizantes: breakdown.of(Subsystem::Fertilizers).to_vec(),
            impacto_manejo_cultivo: breakdown.of(Subsystem::CropManagement).to_vec(),
            impacto_pesticidas: breakdown.of(Subsystem::Pesticides).to_vec(),
            impacto_sistema_riego: breakdown.of(Subsystem::Irrigation).to_vec(),
            impacto_total: breakdown.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessSummary {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Impacts of a single process, calculated through a transient product system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessImpact {
    pub process: ProcessSummary,
    pub impact_result: Vec<ImpactEntry>,
}

pub struct AssessmentService {
    client: OlcaClient,
    settings: AssessmentSettings,
    gate: Mutex<()>,
}

impl AssessmentService {
    pub fn new(client: OlcaClient, settings: AssessmentSettings) -> Self {
        Self {
            client,
            settings,
            gate: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &OlcaClient {
        &self.client
    }

    pub fn settings(&self) -> &AssessmentSettings {
        &self.settings
    }

    #[instrument(skip_all)]
    pub async fn assess(&self, input: &AcvInput) -> Result<AssessmentReport, AssessmentError> {
        let mappings = map_subsystems(input)?;

        let _turn = self.gate.lock().await;

        let mut processes = Vec::with_capacity(mappings.len());
        for (subsystem, _) in &mappings {
            let process: Process = self.client.get_process(Key::name(subsystem.process_name())).await?;
            processes.push(process);
        }
        let system = self
            .client
            .get_product_system(Key::name(&self.settings.product_system))
            .await?;

        let staged = processes
            .iter()
            .zip(&mappings)
            .map(|(process, (_, flows))| stage(process, flows))
            .collect::<Result<Vec<_>, _>>()?;
        for process in &staged {
            self.client.update_process(process).await?;
        }
        info!(processes = staged.len(), "Subsystem processes updated");

        let targets: Vec<(Subsystem, Ref)> = mappings
            .iter()
            .zip(&staged)
            .map(|((subsystem, _), process)| (*subsystem, process.to_ref()))
            .collect();
        let breakdown = ImpactDecomposer::new(&self.client, &self.settings)
            .decompose(&system, &targets)
            .await?;

        Ok(AssessmentReport::from(breakdown))
    }

    #[instrument(skip(self))]
    pub async fn process_impact(
        &self,
        process_uid: &str,
        impact_method_uid: &str,
        amount: f64,
    ) -> Result<ProcessImpact, AssessmentError> {
        let process = self.client.get_process(Key::id(process_uid)).await?;
        let result = self
            .client
            .calculate_process_impact(process_uid, impact_method_uid, amount)
            .await?;

        let impacts = result.total_impacts().await;
        if let Err(e) = result.dispose().await {
            warn!(error = %e, "Dispose failed");
        }

        Ok(ProcessImpact {
            process: ProcessSummary {
                name: process.name,
                category: process.category,
                description: process.description,
            },
            impact_result: impacts?.into_iter().map(ImpactEntry::from).collect(),
        })
    }
}
