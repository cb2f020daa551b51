//! References and the entity contract shared by everything stored in the engine.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

use super::FlowType;

/// The kind of object addressed in the engine (`@type` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefType {
    UnitGroup,
    FlowProperty,
    Flow,
    Process,
    ProductSystem,
    ImpactMethod,
    ImpactCategory,
}

impl Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefType::UnitGroup => "UnitGroup",
            RefType::FlowProperty => "FlowProperty",
            RefType::Flow => "Flow",
            RefType::Process => "Process",
            RefType::ProductSystem => "ProductSystem",
            RefType::ImpactMethod => "ImpactMethod",
            RefType::ImpactCategory => "ImpactCategory",
        };
        f.write_str(name)
    }
}

/// A lightweight pointer to an engine object.
///
/// The engine decorates references with a few descriptive fields (name, unit,
/// flow type) so that results can be rendered without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<RefType>,
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<FlowType>,
}

impl Ref {
    pub fn new(ref_type: RefType, id: impl Into<String>) -> Self {
        Self {
            ref_type: Some(ref_type),
            id: id.into(),
            name: None,
            category: None,
            ref_unit: None,
            flow_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ref_unit(mut self, unit: impl Into<String>) -> Self {
        self.ref_unit = Some(unit.into());
        self
    }

    /// The name if the engine sent one, otherwise the empty string.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// How an object is addressed in a lookup: by its id or by its (pseudo-unique) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Id(String),
    Name(String),
}

impl Key {
    pub fn id(id: impl Into<String>) -> Self {
        Key::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Key::Name(name.into())
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Id(id) => write!(f, "id={id}"),
            Key::Name(name) => write!(f, "name={name:?}"),
        }
    }
}

/// Contract for every typed object the client reads from or writes to the engine.
///
/// The engine speaks untyped JSON; implementing this trait is what lets the
/// [`Repository`](crate::clients::Repository) helpers decode lookups into a
/// concrete struct and stamp the right `@type` on writes.
pub trait EngineEntity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// The `@type` this entity is stored under.
    const KIND: RefType;

    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn to_ref(&self) -> Ref {
        Ref::new(Self::KIND, self.id()).with_name(self.name())
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_wire_shape() {
        let r = Ref::new(RefType::ProductSystem, "ps-1").with_name("TOMATE");
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(
            value,
            json!({"@type": "ProductSystem", "@id": "ps-1", "name": "TOMATE"})
        );
    }

    #[test]
    fn test_ref_reads_impact_category() {
        let r: Ref = serde_json::from_value(json!({
            "@type": "ImpactCategory",
            "@id": "c-1",
            "name": "Climate change",
            "refUnit": "kg CO2 eq"
        }))
        .unwrap();
        assert_eq!(r.ref_type, Some(RefType::ImpactCategory));
        assert_eq!(r.ref_unit.as_deref(), Some("kg CO2 eq"));
    }

    #[test]
    fn test_key_display_names_the_lookup() {
        assert_eq!(Key::id("abc").to_string(), "id=abc");
        assert_eq!(Key::name("TOMATE").to_string(), "name=\"TOMATE\"");
    }
}
