//! # Engine Client
//!
//! The domain vocabulary of the engine: unit groups, flow properties, flows,
//! processes, product systems, impact methods and calculations. Every method is
//! one or more round-trips through the engine actor.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::calculation::CalculationResult;
use super::repository::Repository;
use crate::framework::{EngineError, EngineHandle};
use crate::model::{
    CalculationSetup, EngineEntity, Flow, FlowProperty, FlowType, ImpactMethod, Key,
    LinkingConfig, Process, ProductSystem, Ref, RefType, ResultState, UnitGroup,
};

/// Parameters for [`OlcaClient::add_process`].
///
/// Amounts are signed: negative is an input of `|amount|`, positive an output,
/// zero is skipped.
#[derive(Debug, Clone, Default)]
pub struct ProcessCreate {
    pub name: String,
    pub product_exchanges: Vec<(String, f64)>,
    pub elementary_exchanges: Vec<(String, f64)>,
    pub waste_exchanges: Vec<(String, f64)>,
    pub quantitative_reference: Option<String>,
}

impl ProcessCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn product(mut self, flow: impl Into<String>, amount: f64) -> Self {
        self.product_exchanges.push((flow.into(), amount));
        self
    }

    pub fn elementary(mut self, flow: impl Into<String>, amount: f64) -> Self {
        self.elementary_exchanges.push((flow.into(), amount));
        self
    }

    pub fn waste(mut self, flow: impl Into<String>, amount: f64) -> Self {
        self.waste_exchanges.push((flow.into(), amount));
        self
    }

    pub fn reference(mut self, flow: impl Into<String>) -> Self {
        self.quantitative_reference = Some(flow.into());
        self
    }
}

/// Client for the calculation engine.
#[derive(Clone)]
pub struct OlcaClient {
    engine: EngineHandle,
    poll_interval: Duration,
    calculation_timeout: Duration,
}

impl Repository for OlcaClient {
    fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}

impl OlcaClient {
    pub fn new(
        engine: EngineHandle,
        poll_interval: Duration,
        calculation_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            poll_interval,
            calculation_timeout,
        }
    }

    // Unit groups

    pub async fn get_all_unit_groups(&self) -> Result<Vec<UnitGroup>, EngineError> {
        self.lookup_all().await
    }

    pub async fn get_unit_group(&self, name: &str) -> Result<UnitGroup, EngineError> {
        self.lookup(Key::name(name)).await
    }

    #[instrument(skip(self))]
    pub async fn add_unit_group(
        &self,
        name: &str,
        ref_unit: &str,
    ) -> Result<UnitGroup, EngineError> {
        let group = UnitGroup::new(name, ref_unit);
        self.store(&group).await?;
        info!(id = %group.id, "Unit group created");
        Ok(group)
    }

    // Flow properties

    pub async fn get_all_flow_properties(&self) -> Result<Vec<FlowProperty>, EngineError> {
        self.lookup_all().await
    }

    pub async fn get_flow_property(&self, name: &str) -> Result<FlowProperty, EngineError> {
        self.lookup(Key::name(name)).await
    }

    #[instrument(skip(self))]
    pub async fn add_flow_property(
        &self,
        name: &str,
        unit_group_name: &str,
    ) -> Result<FlowProperty, EngineError> {
        let group = self.get_unit_group(unit_group_name).await?;
        let property = FlowProperty::new(name, &group);
        self.store(&property).await?;
        info!(id = %property.id, "Flow property created");
        Ok(property)
    }

    // Flows

    pub async fn get_all_flows(&self) -> Result<Vec<Flow>, EngineError> {
        self.lookup_all().await
    }

    pub async fn get_flow(&self, name: &str) -> Result<Flow, EngineError> {
        self.lookup(Key::name(name)).await
    }

    async fn flows_of(&self, flow_type: FlowType) -> Result<Vec<Flow>, EngineError> {
        let mut flows = self.get_all_flows().await?;
        flows.retain(|f| f.is(flow_type));
        Ok(flows)
    }

    pub async fn get_all_product_flows(&self) -> Result<Vec<Flow>, EngineError> {
        self.flows_of(FlowType::ProductFlow).await
    }

    pub async fn get_all_elementary_flows(&self) -> Result<Vec<Flow>, EngineError> {
        self.flows_of(FlowType::ElementaryFlow).await
    }

    pub async fn get_all_waste_flows(&self) -> Result<Vec<Flow>, EngineError> {
        self.flows_of(FlowType::WasteFlow).await
    }

    #[instrument(skip(self))]
    async fn add_flow(
        &self,
        name: &str,
        flow_type: FlowType,
        flow_property_name: &str,
    ) -> Result<Flow, EngineError> {
        let property = self.get_flow_property(flow_property_name).await?;
        let flow = Flow::new(name, flow_type, &property);
        self.store(&flow).await?;
        info!(id = %flow.id, "Flow created");
        Ok(flow)
    }

    pub async fn add_product_flow(
        &self,
        name: &str,
        flow_property_name: &str,
    ) -> Result<Flow, EngineError> {
        self.add_flow(name, FlowType::ProductFlow, flow_property_name).await
    }

    pub async fn add_elementary_flow(
        &self,
        name: &str,
        flow_property_name: &str,
    ) -> Result<Flow, EngineError> {
        self.add_flow(name, FlowType::ElementaryFlow, flow_property_name).await
    }

    pub async fn add_waste_flow(
        &self,
        name: &str,
        flow_property_name: &str,
    ) -> Result<Flow, EngineError> {
        self.add_flow(name, FlowType::WasteFlow, flow_property_name).await
    }

    // Processes

    pub async fn get_all_processes(&self) -> Result<Vec<Process>, EngineError> {
        self.lookup_all().await
    }

    pub async fn get_process(&self, key: Key) -> Result<Process, EngineError> {
        self.lookup(key).await
    }

    /// Creates a process from signed exchange amounts.
    ///
    /// All flows are resolved before anything is written, so an unknown flow name
    /// leaves the engine untouched. The quantitative reference can only be a
    /// product or waste exchange, and only the first match is marked.
    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn add_process(&self, params: ProcessCreate) -> Result<Process, EngineError> {
        let groups = [
            (&params.product_exchanges, true),
            (&params.elementary_exchanges, false),
            (&params.waste_exchanges, true),
        ];

        let mut resolved = Vec::new();
        for (exchanges, may_be_reference) in groups {
            for (flow_name, amount) in exchanges {
                let flow = self.get_flow(flow_name).await?;
                resolved.push((flow, *amount, may_be_reference));
            }
        }

        let mut process = Process::new(&params.name);
        let mut reference_marked = false;
        for (flow, amount, may_be_reference) in resolved {
            if amount == 0.0 {
                debug!(flow = %flow.name, "Skipping zero exchange");
                continue;
            }
            let exchange = if amount < 0.0 {
                process.add_input(&flow, amount.abs())
            } else {
                process.add_output(&flow, amount)
            };
            if may_be_reference
                && !reference_marked
                && params.quantitative_reference.as_deref() == Some(flow.name.as_str())
            {
                exchange.is_quantitative_reference = true;
                reference_marked = true;
            }
        }

        self.store(&process).await?;
        info!(id = %process.id, exchanges = process.exchanges.len(), "Process created");
        Ok(process)
    }

    /// Overwrites the stored process with `process`. Repeating it is harmless.
    #[instrument(skip(self, process), fields(id = %process.id, name = %process.name))]
    pub async fn update_process(&self, process: &Process) -> Result<(), EngineError> {
        self.store(process).await?;
        debug!("Process updated");
        Ok(())
    }

    // Product systems

    /// Builds a linked product system rooted at the process.
    #[instrument(skip(self))]
    pub async fn add_product_system(&self, process_uid: &str) -> Result<Ref, EngineError> {
        let process = self.get_process(Key::id(process_uid)).await?;
        let system = self
            .engine
            .create_product_system(process.to_ref(), LinkingConfig::default())
            .await?;
        info!(id = %system.id, "Product system created");
        Ok(system)
    }

    pub async fn get_product_system(&self, key: Key) -> Result<ProductSystem, EngineError> {
        self.lookup(key).await
    }

    #[instrument(skip(self))]
    pub async fn remove_product_system(&self, uid: &str) -> Result<(), EngineError> {
        self.remove(Ref::new(RefType::ProductSystem, uid)).await
    }

    // Impact methods

    pub async fn get_impact_method(&self, uid: &str) -> Result<ImpactMethod, EngineError> {
        self.lookup(Key::id(uid)).await
    }

    // Calculations

    /// Calculates a process through a transient product system.
    ///
    /// The transient system is removed whether or not the calculation succeeds.
    /// The returned result is live; the caller disposes it.
    #[instrument(skip(self))]
    pub async fn calculate_process_impact(
        &self,
        process_uid: &str,
        impact_method_uid: &str,
        amount: f64,
    ) -> Result<CalculationResult, EngineError> {
        let system = self.add_product_system(process_uid).await?;
        let setup = CalculationSetup::for_product_system(&system.id, impact_method_uid, amount);
        let outcome = self.calculate(setup).await;
        if let Err(e) = self.remove_product_system(&system.id).await {
            warn!(system = %system.id, error = %e, "Transient product system not removed");
        }
        outcome
    }

    /// Calculates an existing product system. The caller disposes the result.
    #[instrument(skip(self))]
    pub async fn calculate_product_system_impact(
        &self,
        product_system_uid: &str,
        impact_method_uid: &str,
        amount: f64,
    ) -> Result<CalculationResult, EngineError> {
        let system = self.get_product_system(Key::id(product_system_uid)).await?;
        let setup = CalculationSetup::for_product_system(&system.id, impact_method_uid, amount);
        self.calculate(setup).await
    }

    /// Schedules a calculation and waits for it. A result that fails or never
    /// becomes ready is disposed before the error is returned.
    async fn calculate(&self, setup: CalculationSetup) -> Result<CalculationResult, EngineError> {
        let state = self.engine.calculate(setup).await?;
        let result = CalculationResult::new(state.id.clone(), self.engine.clone());
        match self.wait_until_ready(state).await {
            Ok(()) => {
                info!(result = %result.id(), "Calculation ready");
                Ok(result)
            }
            Err(e) => {
                if let Err(dispose_error) = result.dispose().await {
                    warn!(error = %dispose_error, "Dispose after failed calculation failed");
                }
                Err(e)
            }
        }
    }

    async fn wait_until_ready(&self, mut state: ResultState) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.calculation_timeout;
        loop {
            if let Some(reason) = state.error {
                return Err(EngineError::CalculationFailed {
                    result: state.id,
                    reason,
                });
            }
            if state.is_ready {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(EngineError::CalculationFailed {
                    result: state.id,
                    reason: format!("not ready after {:?}", self.calculation_timeout),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
            state = self.engine.result_state(&state.id).await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::fixtures::seed_tomato_system;
    use crate::framework::mock::FakeEngine;
    use crate::framework::EngineActor;

    fn client(engine: &FakeEngine) -> OlcaClient {
        let (actor, handle) = EngineActor::new(engine.clone(), 16, Duration::from_secs(1));
        tokio::spawn(actor.run());
        OlcaClient::new(handle, Duration::from_millis(1), Duration::from_millis(50))
    }

    async fn seeded_flows(client: &OlcaClient) {
        client.add_unit_group("Units of mass", "kg").await.unwrap();
        client.add_flow_property("Mass", "Units of mass").await.unwrap();
        client.add_product_flow("Bread", "Mass").await.unwrap();
        client.add_product_flow("Sandwich", "Mass").await.unwrap();
        client.add_elementary_flow("Carbon dioxide", "Mass").await.unwrap();
        client.add_waste_flow("Packaging waste", "Mass").await.unwrap();
    }

    #[tokio::test]
    async fn test_flow_listing_filters_by_type() {
        let engine = FakeEngine::new();
        let client = client(&engine);
        seeded_flows(&client).await;

        assert_eq!(client.get_all_flows().await.unwrap().len(), 4);
        assert_eq!(client.get_all_product_flows().await.unwrap().len(), 2);
        assert_eq!(client.get_all_elementary_flows().await.unwrap().len(), 1);
        let waste = client.get_all_waste_flows().await.unwrap();
        assert_eq!(waste[0].name, "Packaging waste");
    }

    #[tokio::test]
    async fn test_add_flow_property_needs_the_unit_group() {
        let engine = FakeEngine::new();
        let client = client(&engine);

        let err = client.add_flow_property("Mass", "Units of mass").await.unwrap_err();
        assert_eq!(
            err,
            EngineError::LookupMiss {
                kind: RefType::UnitGroup,
                key: Key::name("Units of mass"),
            }
        );
        assert_eq!(engine.calls().puts, 0);
    }

    #[tokio::test]
    async fn test_add_process_applies_sign_and_zero_rules() {
        let engine = FakeEngine::new();
        let client = client(&engine);
        seeded_flows(&client).await;

        let process = client
            .add_process(
                ProcessCreate::new("Sandwich making")
                    .product("Bread", -0.2)
                    .product("Sandwich", 1.0)
                    .elementary("Carbon dioxide", 0.0)
                    .waste("Packaging waste", 0.05)
                    .reference("Sandwich"),
            )
            .await
            .unwrap();

        assert_eq!(process.exchanges.len(), 3);
        let bread = process.exchange("Bread", true).unwrap();
        assert_eq!(bread.amount, 0.2);
        assert!(process.exchange("Carbon dioxide", false).is_none());
        assert_eq!(process.quantitative_reference().unwrap().flow_name(), "Sandwich");

        let stored: Process = engine.entity(&process.id).unwrap();
        assert_eq!(stored, process);
    }

    #[tokio::test]
    async fn test_elementary_exchange_is_never_the_reference() {
        let engine = FakeEngine::new();
        let client = client(&engine);
        seeded_flows(&client).await;

        let process = client
            .add_process(
                ProcessCreate::new("Combustion")
                    .elementary("Carbon dioxide", 1.0)
                    .reference("Carbon dioxide"),
            )
            .await
            .unwrap();
        assert!(process.quantitative_reference().is_none());
    }

    #[tokio::test]
    async fn test_add_process_with_unknown_flow_writes_nothing() {
        let engine = FakeEngine::new();
        let client = client(&engine);
        seeded_flows(&client).await;
        let puts_before = engine.calls().puts;

        let err = client
            .add_process(ProcessCreate::new("Broken").product("Cheese", 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LookupMiss { kind: RefType::Flow, .. }));
        assert_eq!(engine.calls().puts, puts_before);
    }

    #[tokio::test]
    async fn test_impact_method_by_uid() {
        let engine = FakeEngine::new();
        let fixture = seed_tomato_system(&engine);
        let client = client(&engine);

        let method = client.get_impact_method(&fixture.method.id).await.unwrap();
        assert_eq!(method.impact_categories.len(), 2);

        let err = client.get_impact_method("missing").await.unwrap_err();
        assert_eq!(
            err,
            EngineError::LookupMiss {
                kind: RefType::ImpactMethod,
                key: Key::id("missing"),
            }
        );
    }

    #[tokio::test]
    async fn test_update_process_is_idempotent() {
        let engine = FakeEngine::new();
        let fixture = seed_tomato_system(&engine);
        let client = client(&engine);

        let mut process = client.get_process(Key::id(&fixture.fertilizers.id)).await.unwrap();
        process.exchanges[0].amount = 12.5;
        client.update_process(&process).await.unwrap();
        let once: Process = engine.entity(&process.id).unwrap();
        client.update_process(&process).await.unwrap();
        let twice: Process = engine.entity(&process.id).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.exchanges[0].amount, 12.5);
        assert_eq!(engine.count(RefType::Process), 5);
    }

    #[tokio::test]
    async fn test_process_impact_removes_transient_system() {
        let engine = FakeEngine::new();
        let fixture = seed_tomato_system(&engine);
        let client = client(&engine);

        let result = client
            .calculate_process_impact(&fixture.root.id, &fixture.method.id, 1.0)
            .await
            .unwrap();
        let impacts = result.total_impacts().await.unwrap();
        assert_eq!(impacts.len(), 2);
        result.dispose().await.unwrap();

        // Only the seeded TOMATE system is left.
        assert_eq!(engine.count(RefType::ProductSystem), 1);
        assert_eq!(engine.calls().deletes, 1);
        assert_eq!(engine.live_results(), 0);
    }

    #[tokio::test]
    async fn test_failed_process_impact_still_removes_transient_system() {
        let engine = FakeEngine::new();
        let fixture = seed_tomato_system(&engine);
        let client = client(&engine);
        engine.fail_calculations("singular matrix");

        let err = client
            .calculate_process_impact(&fixture.root.id, &fixture.method.id, 1.0)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::CalculationFailed { ref reason, .. } if reason == "singular matrix"));
        assert_eq!(engine.count(RefType::ProductSystem), 1);
        assert_eq!(engine.calls().disposals, 1);
        assert_eq!(engine.live_results(), 0);
    }

    #[tokio::test]
    async fn test_never_ready_times_out_and_disposes() {
        let engine = FakeEngine::new();
        let fixture = seed_tomato_system(&engine);
        let client = client(&engine);
        engine.never_ready();

        let err = client
            .calculate_product_system_impact(&fixture.system.id, &fixture.method.id, 0.001)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::CalculationFailed { .. }));
        assert_eq!(engine.calls().disposals, 1);
        assert_eq!(engine.live_results(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_system_skips_calculation() {
        let engine = FakeEngine::new();
        seed_tomato_system(&engine);
        let client = client(&engine);

        let err = client
            .calculate_product_system_impact("missing", "method", 0.001)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::LookupMiss {
                kind: RefType::ProductSystem,
                key: Key::id("missing"),
            }
        );
        assert_eq!(engine.calls().calculations, 0);
    }
}
