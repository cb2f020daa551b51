//! Writes mapped amounts onto process exchanges.

use tracing::{debug, instrument};

use super::AssessmentError;
use crate::clients::OlcaClient;
use crate::mapping::{FlowDict, MappingError};
use crate::model::Process;

/// Assigns every exchange of `process` its amount from `flows`.
///
/// Inputs are looked up among the inputs, outputs among the outputs. The names
/// must match both ways: an exchange without an entry and an entry without an
/// exchange are both errors, and either leaves the process exactly as it was.
pub fn apply_amounts(process: &mut Process, flows: &FlowDict) -> Result<(), MappingError> {
    let amounts = process
        .exchanges
        .iter()
        .map(|e| flows.amount(e.flow_name(), e.is_input))
        .collect::<Result<Vec<_>, _>>()?;
    check_every_key_matches(process, flows)?;
    for (exchange, amount) in process.exchanges.iter_mut().zip(amounts) {
        exchange.amount = amount;
    }
    Ok(())
}

fn check_every_key_matches(process: &Process, flows: &FlowDict) -> Result<(), MappingError> {
    for (is_input, keys) in [(true, flows.inputs()), (false, flows.outputs())] {
        let unmatched = keys.keys().find(|key| {
            !process
                .exchanges
                .iter()
                .any(|e| e.is_input == is_input && e.flow_name() == key.as_str())
        });
        if let Some(key) = unmatched {
            return Err(MappingError::UnmatchedMappingKey {
                map: flows.map_label(is_input),
                key: key.clone(),
            });
        }
    }
    Ok(())
}

/// Returns an updated copy of `process`; the original is not touched.
pub fn stage(process: &Process, flows: &FlowDict) -> Result<Process, MappingError> {
    let mut staged = process.clone();
    apply_amounts(&mut staged, flows)?;
    Ok(staged)
}

/// Stages the new amounts and persists the process once.
#[instrument(skip_all, fields(process = %process.name))]
pub async fn update_process_exchanges(
    client: &OlcaClient,
    process: &Process,
    flows: &FlowDict,
) -> Result<Process, AssessmentError> {
    let staged = stage(process, flows)?;
    client.update_process(&staged).await?;
    debug!(exchanges = staged.exchanges.len(), "Exchanges updated");
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::FakeEngine;
    use crate::framework::EngineActor;
    use crate::model::{Flow, FlowProperty, FlowType, UnitGroup};
    use std::time::Duration;

    fn process() -> Process {
        let group = UnitGroup::new("Units of mass", "kg");
        let mass = FlowProperty::new("Mass", &group);
        let diesel = Flow::new("Diesel", FlowType::ProductFlow, &mass);
        let nitrate = Flow::new("Nitrate", FlowType::ElementaryFlow, &mass);
        let output = Flow::new("Fertilizantes T", FlowType::ProductFlow, &mass);

        let mut process = Process::new("Fertilizantes T");
        process.add_input(&diesel, 1.0);
        process.add_input(&diesel, 1.0);
        process.add_output(&nitrate, 1.0);
        process.add_output(&output, 1.0).is_quantitative_reference = true;
        process
    }

    #[test]
    fn test_amounts_follow_direction() {
        let flows = FlowDict::from_entries(
            "Fertilizantes T",
            &[("Diesel", 3.0)],
            &[("Fertilizantes T", 1.0), ("Nitrate", 0.25)],
        )
        .unwrap();

        let mut process = process();
        apply_amounts(&mut process, &flows).unwrap();

        let amounts: Vec<f64> = process.exchanges.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![3.0, 3.0, 0.25, 1.0]);
    }

    #[test]
    fn test_missing_entry_leaves_process_untouched() {
        let flows = FlowDict::from_entries("Fertilizantes T", &[("Diesel", 3.0)], &[("Nitrate", 0.25)])
            .unwrap();

        let mut process = process();
        let before = process.clone();
        let err = apply_amounts(&mut process, &flows).unwrap_err();

        assert_eq!(
            err,
            MappingError::MissingMappingKey {
                map: "Fertilizantes T outputs".to_string(),
                key: "Fertilizantes T".to_string(),
            }
        );
        assert_eq!(process, before);
    }

    #[test]
    fn test_mapped_flow_missing_from_process_is_rejected() {
        let flows = FlowDict::from_entries(
            "Fertilizantes T",
            &[
                ("Diesel", 3.0),
                ("Ammonium nitrate phosphate, as N, at regional storehouse {RER}", 12.5),
            ],
            &[("Fertilizantes T", 1.0), ("Nitrate", 0.25)],
        )
        .unwrap();

        let mut process = process();
        let before = process.clone();
        let err = apply_amounts(&mut process, &flows).unwrap_err();

        assert_eq!(
            err,
            MappingError::UnmatchedMappingKey {
                map: "Fertilizantes T inputs".to_string(),
                key: "Ammonium nitrate phosphate, as N, at regional storehouse {RER}".to_string(),
            }
        );
        assert_eq!(process, before);
    }

    #[test]
    fn test_mapped_flow_in_the_wrong_direction_is_rejected() {
        let flows = FlowDict::from_entries(
            "Fertilizantes T",
            &[("Diesel", 3.0), ("Nitrate", 99.0)],
            &[("Fertilizantes T", 1.0), ("Nitrate", 0.25)],
        )
        .unwrap();

        let err = stage(&process(), &flows).unwrap_err();
        assert!(matches!(
            err,
            MappingError::UnmatchedMappingKey { ref map, ref key }
                if map == "Fertilizantes T inputs" && key == "Nitrate"
        ));
    }

    #[test]
    fn test_zero_is_a_legal_amount() {
        let flows = FlowDict::from_entries(
            "Fertilizantes T",
            &[("Diesel", 0.0)],
            &[("Fertilizantes T", 1.0), ("Nitrate", 0.0)],
        )
        .unwrap();

        let staged = stage(&process(), &flows).unwrap();
        assert_eq!(staged.exchanges.len(), 4);
        assert_eq!(staged.exchanges[0].amount, 0.0);
    }

    #[test]
    fn test_staging_twice_gives_the_same_process() {
        let flows = FlowDict::from_entries(
            "Fertilizantes T",
            &[("Diesel", 2.0)],
            &[("Fertilizantes T", 1.0), ("Nitrate", 0.5)],
        )
        .unwrap();

        let once = stage(&process(), &flows).unwrap();
        let twice = stage(&once, &flows).unwrap();
        assert_eq!(once, twice);
    }

    fn client(engine: &FakeEngine) -> OlcaClient {
        let (actor, handle) = EngineActor::new(engine.clone(), 8, Duration::from_secs(1));
        tokio::spawn(actor.run());
        OlcaClient::new(handle, Duration::from_millis(1), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_update_persists_the_staged_process() {
        let engine = FakeEngine::new();
        let original = process();
        engine.insert(&original);
        let flows = FlowDict::from_entries(
            "Fertilizantes T",
            &[("Diesel", 7.5)],
            &[("Fertilizantes T", 1.0), ("Nitrate", 0.5)],
        )
        .unwrap();

        let updated = update_process_exchanges(&client(&engine), &original, &flows)
            .await
            .unwrap();

        let stored: Process = engine.entity(&original.id).unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.exchanges[0].amount, 7.5);
        assert_eq!(engine.calls().puts, 1);
    }

    #[tokio::test]
    async fn test_update_skips_the_write_on_mapping_error() {
        let engine = FakeEngine::new();
        let original = process();
        engine.insert(&original);
        let flows = FlowDict::from_entries("Fertilizantes T", &[], &[]).unwrap();

        let err = update_process_exchanges(&client(&engine), &original, &flows)
            .await
            .unwrap_err();

        assert!(matches!(err, AssessmentError::Mapping(_)));
        assert_eq!(engine.calls().puts, 0);
        assert_eq!(engine.entity::<Process>(&original.id), Some(original));
    }
}
