use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::refs::{new_id, EngineEntity, Ref, RefType};

/// A single unit inside a [`UnitGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_ref_unit: bool,
    #[serde(default = "one")]
    pub conversion_factor: f64,
}

fn one() -> f64 {
    1.0
}

/// A group of convertible units (e.g. "Mass units" with reference unit "kg").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitGroup {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UnitGroup {
    /// Creates a unit group holding only its reference unit.
    pub fn new(name: impl Into<String>, ref_unit: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            units: vec![Unit {
                id: new_id(),
                name: ref_unit.into(),
                is_ref_unit: true,
                conversion_factor: 1.0,
            }],
            extra: Map::new(),
        }
    }

    pub fn ref_unit(&self) -> Option<&Unit> {
        self.units.iter().find(|u| u.is_ref_unit)
    }
}

impl EngineEntity for UnitGroup {
    const KIND: RefType = RefType::UnitGroup;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowPropertyType {
    PhysicalQuantity,
    EconomicQuantity,
}

/// A measurable quantity of a flow (mass, energy, number of items) bound to a unit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowProperty {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_group: Option<Ref>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_property_type: Option<FlowPropertyType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowProperty {
    pub fn new(name: impl Into<String>, unit_group: &UnitGroup) -> Self {
        let mut group_ref = unit_group.to_ref();
        if let Some(unit) = unit_group.ref_unit() {
            group_ref = group_ref.with_ref_unit(unit.name.clone());
        }
        Self {
            id: new_id(),
            name: name.into(),
            unit_group: Some(group_ref),
            flow_property_type: Some(FlowPropertyType::PhysicalQuantity),
            extra: Map::new(),
        }
    }
}

impl EngineEntity for FlowProperty {
    const KIND: RefType = RefType::FlowProperty;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Type tag of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    ProductFlow,
    ElementaryFlow,
    WasteFlow,
}

/// Links a flow to one of its flow properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPropertyFactor {
    pub flow_property: Ref,
    #[serde(default = "one")]
    pub conversion_factor: f64,
    #[serde(default)]
    pub is_ref_flow_property: bool,
}

/// A named physical quantity tracked across processes.
///
/// Flows are addressed by name throughout this crate; the engine is trusted to
/// keep names unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(rename = "@id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<FlowType>,
    #[serde(default)]
    pub flow_properties: Vec<FlowPropertyFactor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flow {
    /// Creates a flow whose reference flow property is `property`.
    pub fn new(name: impl Into<String>, flow_type: FlowType, property: &FlowProperty) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            flow_type: Some(flow_type),
            flow_properties: vec![FlowPropertyFactor {
                flow_property: property.to_ref(),
                conversion_factor: 1.0,
                is_ref_flow_property: true,
            }],
            extra: Map::new(),
        }
    }

    pub fn ref_flow_property(&self) -> Option<&Ref> {
        self.flow_properties
            .iter()
            .find(|f| f.is_ref_flow_property)
            .map(|f| &f.flow_property)
    }

    pub fn is(&self, flow_type: FlowType) -> bool {
        self.flow_type == Some(flow_type)
    }
}

impl EngineEntity for Flow {
    const KIND: RefType = RefType::Flow;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_ref(&self) -> Ref {
        let mut r = Ref::new(RefType::Flow, &self.id).with_name(&self.name);
        r.flow_type = self.flow_type;
        r
    }
}
