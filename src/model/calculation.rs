//! Calculation setup and the shapes the engine returns for a result.

use serde::{Deserialize, Serialize};

use super::refs::{Ref, RefType};

/// What to calculate: a target (product system or process), an optional impact
/// method and the reference amount to scale to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationSetup {
    pub target: Ref,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_method: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Ref>,
}

impl CalculationSetup {
    pub fn for_product_system(system_id: &str, impact_method_id: &str, amount: f64) -> Self {
        Self {
            target: Ref::new(RefType::ProductSystem, system_id),
            impact_method: Some(Ref::new(RefType::ImpactMethod, impact_method_id)),
            amount: Some(amount),
            unit: None,
        }
    }
}

/// Progress of a calculation as reported by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultState {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub is_scheduled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One process's node inside a solved product system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechFlow {
    pub provider: Ref,
    pub flow: Ref,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechFlowValue {
    pub tech_flow: TechFlow,
    #[serde(default)]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactValue {
    pub impact_category: Ref,
    #[serde(default)]
    pub amount: f64,
}

/// The flattened (category, amount, unit) triple every response is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub category: String,
    pub amount: f64,
    pub unit: String,
}

impl From<ImpactValue> for ImpactEntry {
    fn from(value: ImpactValue) -> Self {
        Self {
            category: value.impact_category.name.unwrap_or_default(),
            amount: value.amount,
            unit: value.impact_category.ref_unit.unwrap_or_default(),
        }
    }
}
