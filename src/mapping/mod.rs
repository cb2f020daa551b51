//! # Flow Mapping
//!
//! Translates the questionnaire record into the exchange amounts of the four
//! subsystem processes of the tomato product system.
//!
//! Each subsystem gets a [`FlowDict`]: one map for input exchanges and one for
//! output exchanges, keyed by flow name. Many entries are the literal `0.0`. They
//! are placeholders for exchanges the form does not parameterize yet, and they stay
//! in the table because every exchange of the process must receive a value when the
//! process is updated.

mod tables;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use thiserror::Error;

use crate::model::AcvInput;

/// Errors raised while building or applying a flow mapping.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MappingError {
    /// A key required by a lookup is absent from its source map.
    #[error("missing mapping key {key:?} in {map}")]
    MissingMappingKey { map: String, key: String },

    /// A mapped flow name has no exchange in that direction on the target process.
    #[error("mapping key {key:?} in {map} has no exchange on the process")]
    UnmatchedMappingKey { map: String, key: String },

    /// The same flow name was declared twice for one direction of a table.
    #[error("duplicate mapping key {key:?} in {map}")]
    DuplicateMappingKey { map: String, key: String },
}

/// The four processes of the tomato product system that the form parameterizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Subsystem {
    Fertilizers,
    CropManagement,
    Pesticides,
    Irrigation,
}

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Fertilizers,
        Subsystem::CropManagement,
        Subsystem::Pesticides,
        Subsystem::Irrigation,
    ];

    /// Name of the engine process this subsystem writes into.
    pub fn process_name(self) -> &'static str {
        match self {
            Subsystem::Fertilizers => "Fertilizantes T",
            Subsystem::CropManagement => "Manejo de cultivo T",
            Subsystem::Pesticides => "Pesticidas T",
            Subsystem::Irrigation => "Sistema de riego T",
        }
    }

    /// Builds this subsystem's exchange amounts from the form record.
    pub fn flows(self, input: &AcvInput) -> Result<FlowDict, MappingError> {
        match self {
            Subsystem::Fertilizers => tables::fertilizers(input),
            Subsystem::CropManagement => tables::crop_management(input),
            Subsystem::Pesticides => tables::pesticides(input),
            Subsystem::Irrigation => tables::irrigation(input),
        }
    }
}

impl Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.process_name())
    }
}

/// Named input and output amounts for one process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowDict {
    name: String,
    inputs: BTreeMap<String, f64>,
    outputs: BTreeMap<String, f64>,
}

impl FlowDict {
    /// Builds a dict from literal entries, rejecting any flow name declared twice
    /// in the same direction.
    pub fn from_entries(
        name: impl Into<String>,
        inputs: &[(&str, f64)],
        outputs: &[(&str, f64)],
    ) -> Result<Self, MappingError> {
        let name = name.into();
        let inputs = collect_unique(&format!("{name} inputs"), inputs)?;
        let outputs = collect_unique(&format!("{name} outputs"), outputs)?;
        Ok(Self { name, inputs, outputs })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &BTreeMap<String, f64> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<String, f64> {
        &self.outputs
    }

    /// Label of one direction's map, as used in error messages.
    pub fn map_label(&self, is_input: bool) -> String {
        let direction = if is_input { "inputs" } else { "outputs" };
        format!("{} {}", self.name, direction)
    }

    /// Amount for an exchange of `flow_name` in the given direction.
    pub fn amount(&self, flow_name: &str, is_input: bool) -> Result<f64, MappingError> {
        let map = if is_input { &self.inputs } else { &self.outputs };
        map.get(flow_name)
            .copied()
            .ok_or_else(|| MappingError::MissingMappingKey {
                map: self.map_label(is_input),
                key: flow_name.to_string(),
            })
    }
}

fn collect_unique(map: &str, entries: &[(&str, f64)]) -> Result<BTreeMap<String, f64>, MappingError> {
    let mut out = BTreeMap::new();
    for (flow, amount) in entries {
        if out.insert((*flow).to_string(), *amount).is_some() {
            return Err(MappingError::DuplicateMappingKey {
                map: map.to_string(),
                key: (*flow).to_string(),
            });
        }
    }
    Ok(out)
}

/// Maps the record for all four subsystems, in [`Subsystem::ALL`] order.
///
/// Fails on the first missing key, before anything touches the engine.
pub fn map_subsystems(input: &AcvInput) -> Result<Vec<(Subsystem, FlowDict)>, MappingError> {
    Subsystem::ALL
        .iter()
        .map(|subsystem| subsystem.flows(input).map(|flows| (*subsystem, flows)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::input::sample_input;

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let err = FlowDict::from_entries(
            "Pesticidas T",
            &[],
            &[("Tebuconazole", 0.0), ("Metribuzin", 0.0), ("Tebuconazole", 0.0)],
        )
        .unwrap_err();

        assert_eq!(
            err,
            MappingError::DuplicateMappingKey {
                map: "Pesticidas T outputs".to_string(),
                key: "Tebuconazole".to_string(),
            }
        );
    }

    #[test]
    fn test_same_flow_may_appear_in_both_directions() {
        let dict = FlowDict::from_entries("p", &[("water", 1.0)], &[("water", 2.0)]).unwrap();
        assert_eq!(dict.amount("water", true), Ok(1.0));
        assert_eq!(dict.amount("water", false), Ok(2.0));
    }

    #[test]
    fn test_amount_names_the_missing_direction() {
        let dict = FlowDict::from_entries("Fertilizantes T", &[], &[]).unwrap();
        let err = dict.amount("Ammonia", false).unwrap_err();
        assert_eq!(err.to_string(), "missing mapping key \"Ammonia\" in Fertilizantes T outputs");
    }

    #[test]
    fn test_all_static_tables_build() {
        let mapped = map_subsystems(&sample_input()).unwrap();
        let names: Vec<_> = mapped.iter().map(|(s, d)| (s.process_name(), d.name())).collect();
        assert_eq!(
            names,
            vec![
                ("Fertilizantes T", "Fertilizantes T"),
                ("Manejo de cultivo T", "Manejo de cultivo T"),
                ("Pesticidas T", "Pesticidas T"),
                ("Sistema de riego T", "Sistema de riego T"),
            ]
        );
    }

    #[test]
    fn test_missing_pesticide_stops_the_whole_mapping() {
        let mut input = sample_input();
        input
            .fitosanitarios
            .remove("Pesticice, unspecified {RER}| pesticice, unspecified production");

        let err = map_subsystems(&input).unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingMappingKey { ref map, ref key }
                if map == "fitosanitarios"
                    && key == "Pesticice, unspecified {RER}| pesticice, unspecified production"
        ));
    }
}
