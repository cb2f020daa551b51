//! # Fake Engine & Testing Guide
//!
//! [`FakeEngine`] implements the same [`Engine`] trait as the IPC connection but
//! keeps everything in memory. Put it behind an [`EngineActor`](super::EngineActor)
//! and the rest of the crate cannot tell the difference.
//!
//! ## When to use the Fake vs a Real Engine
//!
//! | Feature | FakeEngine | IpcEngine |
//! |---------|------------|-----------|
//! | **Speed** | Instant (in-memory) | One HTTP round-trip per call |
//! | **Determinism** | 100% Deterministic | Depends on the engine's database |
//! | **Impacts** | Synthetic, proportional to exchange amounts | Real LCIA |
//! | **Error Injection** | Easy (`fail_calculations`, `fail_reads`, `set_unavailable`) | Hard |
//!
//! ## Synthetic Results
//!
//! A calculation over a product system gives every process a contribution per
//! impact category of the method. For category `i` (zero-based, method order)
//! the contribution of a process is
//!
//! ```text
//! (i + 1) * amount * sum(|exchange amount|)
//! ```
//!
//! and the total is the sum over the processes of the system. Rewriting an
//! exchange amount therefore moves both the total and that process's share.
//!
//! ## Example
//!
//! ```rust
//! use tomato_lca::framework::mock::FakeEngine;
//! use tomato_lca::framework::EngineActor;
//! use tomato_lca::model::{Key, RefType};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = FakeEngine::new();
//!     let (actor, handle) = EngineActor::new(engine.clone(), 16, Duration::from_secs(1));
//!     tokio::spawn(actor.run());
//!
//!     let found = handle.get(RefType::Process, Key::name("Tomate")).await.unwrap();
//!     assert!(found.is_none());
//!     assert_eq!(engine.calls().gets, 1);
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::engine::{decode, decode_entity, Engine};
use super::error::EngineError;
use crate::model::refs::new_id;
use crate::model::{
    CalculationSetup, EngineEntity, ImpactMethod, ImpactValue, Key, LinkingConfig,
    Process, ProductSystem, Ref, RefType, ResultState, TechFlow, TechFlowValue,
};

/// How many times each engine operation has been invoked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineCalls {
    pub gets: usize,
    pub puts: usize,
    pub deletes: usize,
    pub systems_created: usize,
    pub calculations: usize,
    pub disposals: usize,
}

#[derive(Debug, Clone)]
struct Contribution {
    tech_flow: TechFlow,
    amount: f64,
    impacts: Vec<ImpactValue>,
}

#[derive(Debug, Clone)]
struct FakeResult {
    impacts: Vec<ImpactValue>,
    contributions: Vec<Contribution>,
}

#[derive(Default)]
struct FakeState {
    entities: Vec<(RefType, Value)>,
    results: HashMap<String, FakeResult>,
    calls: EngineCalls,
    calculation_failure: Option<String>,
    read_failure: Option<String>,
    never_ready: bool,
    unavailable: bool,
    latency: Option<Duration>,
}

impl FakeState {
    fn find(&self, kind: RefType, key: &Key) -> Option<&Value> {
        self.entities
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, v)| v)
            .find(|v| match key {
                Key::Id(id) => v["@id"].as_str() == Some(id.as_str()),
                Key::Name(name) => v["name"].as_str() == Some(name.as_str()),
            })
    }

    fn typed<T: EngineEntity>(&self, id: &str) -> Result<T, EngineError> {
        let value = self
            .find(T::KIND, &Key::id(id))
            .cloned()
            .ok_or_else(|| not_found("data/get", T::KIND, id))?;
        decode_entity(value)
    }

    fn processes(&self) -> Result<Vec<Process>, EngineError> {
        self.entities
            .iter()
            .filter(|(k, _)| *k == RefType::Process)
            .map(|(_, v)| decode_entity(v.clone()))
            .collect()
    }

    fn result(&self, method: &str, result_id: &str) -> Result<&FakeResult, EngineError> {
        self.results.get(result_id).ok_or_else(|| EngineError::Rejected {
            method: method.to_string(),
            code: 404,
            message: format!("no result with id {result_id}"),
        })
    }

    /// A stored result that may be read, unless reads are failing.
    fn readable(&self, method: &str, result_id: &str) -> Result<&FakeResult, EngineError> {
        let result = self.result(method, result_id)?;
        match &self.read_failure {
            Some(reason) => Err(EngineError::Rejected {
                method: method.to_string(),
                code: 500,
                message: reason.clone(),
            }),
            None => Ok(result),
        }
    }
}

fn not_found(method: &str, kind: RefType, id: &str) -> EngineError {
    EngineError::Rejected {
        method: method.to_string(),
        code: 404,
        message: format!("{kind} {id} does not exist"),
    }
}

/// An in-memory calculation engine.
///
/// Clones share state, so a test can keep one clone for assertions while the
/// actor owns another.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Stores an entity directly, bypassing the call counters.
    pub fn insert<T: EngineEntity>(&self, entity: &T) -> Ref {
        let mut value = serde_json::to_value(entity).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut value {
            map.insert("@type".to_string(), Value::String(T::KIND.to_string()));
        }
        let mut state = self.state();
        upsert(&mut state.entities, T::KIND, value);
        entity.to_ref()
    }

    /// Reads back a stored entity without counting a call.
    pub fn entity<T: EngineEntity>(&self, id: &str) -> Option<T> {
        self.state().typed(id).ok()
    }

    pub fn count(&self, kind: RefType) -> usize {
        self.state().entities.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn calls(&self) -> EngineCalls {
        self.state().calls.clone()
    }

    /// Results that have been calculated but not yet disposed.
    pub fn live_results(&self) -> usize {
        self.state().results.len()
    }

    /// Every calculation from now on reports `reason` as its error.
    pub fn fail_calculations(&self, reason: impl Into<String>) {
        self.state().calculation_failure = Some(reason.into());
    }

    /// Every impact or requirement read of a result from now on fails with `reason`.
    pub fn fail_reads(&self, reason: impl Into<String>) {
        self.state().read_failure = Some(reason.into());
    }

    /// Every calculation from now on stays scheduled forever.
    pub fn never_ready(&self) {
        self.state().never_ready = true;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    async fn enter(&self) -> Result<(), EngineError> {
        let latency = {
            let state = self.state();
            if state.unavailable {
                return Err(EngineError::Unavailable("connection refused".to_string()));
            }
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

fn upsert(entities: &mut Vec<(RefType, Value)>, kind: RefType, value: Value) {
    let id = value["@id"].as_str().map(str::to_string);
    match entities
        .iter_mut()
        .find(|(k, v)| *k == kind && v["@id"].as_str().map(str::to_string) == id)
    {
        Some(slot) => slot.1 = value,
        None => entities.push((kind, value)),
    }
}

/// Walks provider links from `root`: every input exchange is linked to the first
/// process whose quantitative reference is the same flow.
fn link_providers(root: &Process, all: &[Process]) -> Vec<Ref> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([root.clone()]);
    let mut linked = Vec::new();
    seen.insert(root.id.clone());

    while let Some(process) = queue.pop_front() {
        linked.push(process.to_ref());
        for exchange in process.exchanges.iter().filter(|e| e.is_input) {
            let provider = all.iter().find(|p| {
                p.quantitative_reference()
                    .is_some_and(|q| q.flow.id == exchange.flow.id)
            });
            if let Some(provider) = provider {
                if seen.insert(provider.id.clone()) {
                    queue.push_back(provider.clone());
                }
            }
        }
    }
    linked
}

fn weight(process: &Process) -> f64 {
    process.exchanges.iter().map(|e| e.amount.abs()).sum()
}

#[async_trait]
impl Engine for FakeEngine {
    async fn get(&self, kind: RefType, key: &Key) -> Result<Option<Value>, EngineError> {
        self.enter().await?;
        let mut state = self.state();
        state.calls.gets += 1;
        Ok(state.find(kind, key).cloned())
    }

    async fn get_all(&self, kind: RefType) -> Result<Vec<Value>, EngineError> {
        self.enter().await?;
        let mut state = self.state();
        state.calls.gets += 1;
        Ok(state
            .entities
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn put(&self, entity: Value) -> Result<Ref, EngineError> {
        self.enter().await?;
        let header: Ref = decode("data/put", entity.clone())?;
        let kind = header.ref_type.ok_or_else(|| EngineError::Rejected {
            method: "data/put".to_string(),
            code: 400,
            message: "missing @type".to_string(),
        })?;
        let mut state = self.state();
        state.calls.puts += 1;
        upsert(&mut state.entities, kind, entity);
        Ok(header)
    }

    async fn delete(&self, target: &Ref) -> Result<(), EngineError> {
        self.enter().await?;
        let mut state = self.state();
        state.calls.deletes += 1;
        let before = state.entities.len();
        state.entities.retain(|(k, v)| {
            !(Some(*k) == target.ref_type && v["@id"].as_str() == Some(target.id.as_str()))
        });
        if state.entities.len() == before {
            let kind = target.ref_type.unwrap_or(RefType::Process);
            return Err(not_found("data/delete", kind, &target.id));
        }
        Ok(())
    }

    async fn create_product_system(
        &self,
        process: &Ref,
        _config: &LinkingConfig,
    ) -> Result<Ref, EngineError> {
        self.enter().await?;
        let mut state = self.state();
        state.calls.systems_created += 1;
        let root: Process = state
            .typed(&process.id)
            .map_err(|_| not_found("data/create/system", RefType::Process, &process.id))?;
        let all = state.processes()?;
        let system = ProductSystem {
            id: new_id(),
            name: root.name.clone(),
            ref_process: Some(root.to_ref()),
            processes: link_providers(&root, &all),
            extra: Default::default(),
        };
        let mut value = serde_json::to_value(&system).map_err(|e| EngineError::Decode {
            context: "ProductSystem".to_string(),
            reason: e.to_string(),
        })?;
        if let Value::Object(map) = &mut value {
            map.insert("@type".to_string(), Value::String(RefType::ProductSystem.to_string()));
        }
        upsert(&mut state.entities, RefType::ProductSystem, value);
        Ok(system.to_ref())
    }

    async fn calculate(&self, setup: &CalculationSetup) -> Result<ResultState, EngineError> {
        self.enter().await?;
        let mut state = self.state();
        state.calls.calculations += 1;

        let system: ProductSystem = state.typed(&setup.target.id)?;
        let method: ImpactMethod = match &setup.impact_method {
            Some(method) => state.typed(&method.id)?,
            None => {
                return Err(EngineError::Rejected {
                    method: "result/calculate".to_string(),
                    code: 400,
                    message: "no impact method".to_string(),
                })
            }
        };
        let amount = setup.amount.unwrap_or(1.0);

        let mut contributions = Vec::new();
        for member in &system.processes {
            let process: Process = state.typed(&member.id)?;
            let Some(reference) = process.quantitative_reference() else {
                continue;
            };
            let weight = weight(&process);
            let impacts = method
                .impact_categories
                .iter()
                .enumerate()
                .map(|(i, category)| ImpactValue {
                    impact_category: category.clone(),
                    amount: (i + 1) as f64 * amount * weight,
                })
                .collect();
            contributions.push(Contribution {
                tech_flow: TechFlow {
                    provider: process.to_ref(),
                    flow: reference.flow.clone(),
                },
                amount: amount * reference.amount,
                impacts,
            });
        }

        let impacts = method
            .impact_categories
            .iter()
            .enumerate()
            .map(|(i, category)| ImpactValue {
                impact_category: category.clone(),
                amount: contributions.iter().map(|c| c.impacts[i].amount).sum(),
            })
            .collect();

        let id = new_id();
        state.results.insert(
            id.clone(),
            FakeResult {
                impacts,
                contributions,
            },
        );
        Ok(ResultState {
            id,
            is_ready: false,
            is_scheduled: true,
            error: None,
        })
    }

    async fn result_state(&self, result_id: &str) -> Result<ResultState, EngineError> {
        self.enter().await?;
        let state = self.state();
        state.result("result/state", result_id)?;
        Ok(ResultState {
            id: result_id.to_string(),
            is_ready: state.calculation_failure.is_none() && !state.never_ready,
            is_scheduled: state.never_ready,
            error: state.calculation_failure.clone(),
        })
    }

    async fn total_impacts(&self, result_id: &str) -> Result<Vec<ImpactValue>, EngineError> {
        self.enter().await?;
        let state = self.state();
        Ok(state.readable("result/total-impacts", result_id)?.impacts.clone())
    }

    async fn total_requirements(
        &self,
        result_id: &str,
    ) -> Result<Vec<TechFlowValue>, EngineError> {
        self.enter().await?;
        let state = self.state();
        Ok(state
            .readable("result/total-requirements", result_id)?
            .contributions
            .iter()
            .map(|c| TechFlowValue {
                tech_flow: c.tech_flow.clone(),
                amount: c.amount,
            })
            .collect())
    }

    async fn total_impacts_of(
        &self,
        result_id: &str,
        tech_flow: &TechFlow,
    ) -> Result<Vec<ImpactValue>, EngineError> {
        self.enter().await?;
        let state = self.state();
        Ok(state
            .readable("result/total-impacts-of", result_id)?
            .contributions
            .iter()
            .find(|c| {
                c.tech_flow.provider.id == tech_flow.provider.id
                    && c.tech_flow.flow.id == tech_flow.flow.id
            })
            .map(|c| c.impacts.clone())
            .unwrap_or_default())
    }

    async fn dispose(&self, result_id: &str) -> Result<(), EngineError> {
        self.enter().await?;
        let mut state = self.state();
        state.calls.disposals += 1;
        state
            .results
            .remove(result_id)
            .map(|_| ())
            .ok_or_else(|| EngineError::Rejected {
                method: "result/dispose".to_string(),
                code: 404,
                message: format!("no result with id {result_id}"),
            })
    }
}
