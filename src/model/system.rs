use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::refs::{EngineEntity, Ref, RefType};

/// A linked network of processes rooted at a reference process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSystem {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_process: Option<Ref>,
    #[serde(default)]
    pub processes: Vec<Ref>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineEntity for ProductSystem {
    const KIND: RefType = RefType::ProductSystem;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// An impact assessment method with its categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMethod {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub impact_categories: Vec<Ref>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EngineEntity for ImpactMethod {
    const KIND: RefType = RefType::ImpactMethod;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// How the engine picks a provider when a product has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderLinking {
    IgnoreDefaults,
    PreferDefaults,
    OnlyDefaults,
}

/// Linking rules used when the engine builds a product system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingConfig {
    pub prefer_unit_processes: bool,
    pub provider_linking: ProviderLinking,
}

impl Default for LinkingConfig {
    /// Unit processes first, default providers preferred.
    fn default() -> Self {
        Self {
            prefer_unit_processes: true,
            provider_linking: ProviderLinking::PreferDefaults,
        }
    }
}
