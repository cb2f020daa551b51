//! # Impact Decomposer
//!
//! One calculation of the product system, read twice: once for the aggregate and
//! once per subsystem through its technology flow. The result is disposed on
//! every path.

use tracing::{info, instrument, warn};

use super::{AssessmentError, AssessmentSettings};
use crate::clients::{CalculationResult, OlcaClient};
use crate::mapping::Subsystem;
use crate::model::{ImpactEntry, ImpactValue, ProductSystem, Ref, TechFlow, TechFlowValue};

/// Aggregate and per-subsystem impacts from a single calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactBreakdown {
    pub total: Vec<ImpactEntry>,
    pub subsystems: Vec<(Subsystem, Vec<ImpactEntry>)>,
}

impl ImpactBreakdown {
    pub fn of(&self, subsystem: Subsystem) -> &[ImpactEntry] {
        self.subsystems
            .iter()
            .find(|(s, _)| *s == subsystem)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or_default()
    }
}

/// The first technology flow whose provider is `process`: by id, else by exact name.
pub fn find_tech_flow<'a>(requirements: &'a [TechFlowValue], process: &Ref) -> Option<&'a TechFlow> {
    let by_id = requirements
        .iter()
        .find(|r| r.tech_flow.provider.id == process.id);
    let by_name = || {
        process.name.as_deref().and_then(|name| {
            requirements
                .iter()
                .find(|r| r.tech_flow.provider.name.as_deref() == Some(name))
        })
    };
    by_id.or_else(by_name).map(|r| &r.tech_flow)
}

fn entries(values: Vec<ImpactValue>) -> Vec<ImpactEntry> {
    values.into_iter().map(ImpactEntry::from).collect()
}

pub struct ImpactDecomposer<'a> {
    client: &'a OlcaClient,
    settings: &'a AssessmentSettings,
}

impl<'a> ImpactDecomposer<'a> {
    pub fn new(client: &'a OlcaClient, settings: &'a AssessmentSettings) -> Self {
        Self { client, settings }
    }

    #[instrument(skip_all, fields(system = %system.name))]
    pub async fn decompose(
        &self,
        system: &ProductSystem,
        subsystems: &[(Subsystem, Ref)],
    ) -> Result<ImpactBreakdown, AssessmentError> {
        let result = self
            .client
            .calculate_product_system_impact(
                &system.id,
                &self.settings.impact_method_id,
                self.settings.calculation_amount,
            )
            .await?;

        let outcome = self.read(&result, subsystems).await;
        let result_id = result.id().to_string();
        if let Err(e) = result.dispose().await {
            warn!(result = %result_id, error = %e, "Dispose failed");
        }

        let breakdown = outcome?;
        info!(categories = breakdown.total.len(), "Impacts decomposed");
        Ok(breakdown)
    }

    async fn read(
        &self,
        result: &CalculationResult,
        subsystems: &[(Subsystem, Ref)],
    ) -> Result<ImpactBreakdown, AssessmentError> {
        let total = entries(result.total_impacts().await?);
        let requirements = result.total_requirements().await?;

        let mut parts = Vec::with_capacity(subsystems.len());
        for (subsystem, process) in subsystems {
            let impacts = match find_tech_flow(&requirements, process) {
                Some(tech_flow) => entries(result.total_impacts_of(tech_flow).await?),
                None => {
                    warn!(%subsystem, process = %process.id, "No technology flow for subsystem");
                    Vec::new()
                }
            };
            parts.push((*subsystem, impacts));
        }

        Ok(ImpactBreakdown {
            total,
            subsystems: parts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RefType;

    fn requirement(provider_id: &str, provider_name: &str) -> TechFlowValue {
        TechFlowValue {
            tech_flow: TechFlow {
                provider: Ref::new(RefType::Process, provider_id).with_name(provider_name),
                flow: Ref::new(RefType::Flow, format!("{provider_id}-out")),
            },
            amount: 1.0,
        }
    }

    #[test]
    fn test_id_match_wins_over_name() {
        let requirements = vec![
            requirement("p-copy", "Pesticidas T"),
            requirement("p-1", "Pesticidas T"),
        ];
        let process = Ref::new(RefType::Process, "p-1").with_name("Pesticidas T");

        let found = find_tech_flow(&requirements, &process).unwrap();
        assert_eq!(found.provider.id, "p-1");
    }

    #[test]
    fn test_falls_back_to_exact_name() {
        let requirements = vec![requirement("x", "Pesticidas"), requirement("y", "Pesticidas T")];
        let process = Ref::new(RefType::Process, "elsewhere").with_name("Pesticidas T");

        let found = find_tech_flow(&requirements, &process).unwrap();
        assert_eq!(found.provider.id, "y");
    }

    #[test]
    fn test_absent_provider_is_none() {
        let requirements = vec![requirement("x", "Fertilizantes T")];
        let process = Ref::new(RefType::Process, "p-1").with_name("Pesticidas T");
        assert!(find_tech_flow(&requirements, &process).is_none());
    }
}
