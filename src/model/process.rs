use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flow::Flow;
use super::refs::{new_id, EngineEntity, Ref, RefType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessType {
    UnitProcess,
    LciResult,
}

/// One signed, quantified link between a process and a flow.
///
/// `amount` is always non-negative; the direction lives in `is_input`.
/// Fields this crate does not model (uncertainty, providers, formulas) are kept
/// in `extra` so an update writes them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<i64>,
    pub flow: Ref,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub is_input: bool,
    #[serde(default)]
    pub is_quantitative_reference: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_property: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Ref>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exchange {
    pub fn flow_name(&self) -> &str {
        self.flow.name_or_empty()
    }
}

/// A process as stored in the engine.
///
/// The assessment only ever rewrites exchange amounts; everything else is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_type: Option<ProcessType>,
    #[serde(default)]
    pub exchanges: Vec<Exchange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_internal_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Process {
    /// Creates an empty unit process with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            category: None,
            description: None,
            process_type: Some(ProcessType::UnitProcess),
            exchanges: Vec::new(),
            last_internal_id: Some(0),
            extra: Map::new(),
        }
    }

    /// Appends an input exchange of `flow` and returns it for further tweaking.
    pub fn add_input(&mut self, flow: &Flow, amount: f64) -> &mut Exchange {
        self.push_exchange(flow, amount, true)
    }

    /// Appends an output exchange of `flow` and returns it for further tweaking.
    pub fn add_output(&mut self, flow: &Flow, amount: f64) -> &mut Exchange {
        self.push_exchange(flow, amount, false)
    }

    fn push_exchange(&mut self, flow: &Flow, amount: f64, is_input: bool) -> &mut Exchange {
        let internal_id = self.last_internal_id.unwrap_or(0) + 1;
        self.last_internal_id = Some(internal_id);
        self.exchanges.push(Exchange {
            internal_id: Some(internal_id),
            flow: flow.to_ref(),
            amount,
            is_input,
            is_quantitative_reference: false,
            flow_property: flow.ref_flow_property().cloned(),
            unit: None,
            extra: Map::new(),
        });
        let last = self.exchanges.len() - 1;
        &mut self.exchanges[last]
    }

    pub fn quantitative_reference(&self) -> Option<&Exchange> {
        self.exchanges.iter().find(|e| e.is_quantitative_reference)
    }

    /// Finds the first exchange of `flow_name` in the given direction.
    pub fn exchange(&self, flow_name: &str, is_input: bool) -> Option<&Exchange> {
        self.exchanges
            .iter()
            .find(|e| e.is_input == is_input && e.flow_name() == flow_name)
    }
}

impl EngineEntity for Process {
    const KIND: RefType = RefType::Process;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
