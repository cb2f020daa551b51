//! # The Engine Actor
//!
//! Owns the engine connection and processes requests one at a time.
//!
//! ## Concurrency Model
//! The engine connection is a process-wide resource. Rather than sharing it behind
//! a lock, one Tokio task owns it and drains an mpsc channel; every
//! [`EngineHandle`] clone feeds the same queue. Calls therefore reach the engine
//! strictly in arrival order, and a slow call delays the ones behind it.
//!
//! ## Timeouts
//! The engine protocol has no timeout of its own. Each call is bounded by
//! `call_timeout`; on expiry the caller receives [`EngineError::Unavailable`] and
//! the actor moves on to the next request.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::client::EngineHandle;
use super::engine::Engine;
use super::error::EngineError;
use super::message::{EngineRequest, Response};

pub struct EngineActor<E: Engine> {
    receiver: mpsc::Receiver<EngineRequest>,
    engine: E,
    call_timeout: Duration,
}

impl<E: Engine> EngineActor<E> {
    pub fn new(engine: E, buffer_size: usize, call_timeout: Duration) -> (Self, EngineHandle) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            engine,
            call_timeout,
        };
        (actor, EngineHandle::new(sender))
    }

    /// Runs the actor's event loop until every handle has been dropped.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "IpcEngine" instead of "tomato_lca::ipc::IpcEngine")
        let engine_type = std::any::type_name::<E>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(engine_type, timeout_ms = self.call_timeout.as_millis() as u64, "Engine actor started");

        let mut served: u64 = 0;
        while let Some(msg) = self.receiver.recv().await {
            let op = msg.operation();
            debug!(engine_type, op, "Request");
            match msg {
                EngineRequest::Get { kind, key, respond_to } => {
                    self.serve(op, respond_to, self.engine.get(kind, &key)).await
                }
                EngineRequest::GetAll { kind, respond_to } => {
                    self.serve(op, respond_to, self.engine.get_all(kind)).await
                }
                EngineRequest::Put { entity, respond_to } => {
                    self.serve(op, respond_to, self.engine.put(entity)).await
                }
                EngineRequest::Delete { target, respond_to } => {
                    self.serve(op, respond_to, self.engine.delete(&target)).await
                }
                EngineRequest::CreateProductSystem { process, config, respond_to } => {
                    self.serve(op, respond_to, self.engine.create_product_system(&process, &config))
                        .await
                }
                EngineRequest::Calculate { setup, respond_to } => {
                    self.serve(op, respond_to, self.engine.calculate(&setup)).await
                }
                EngineRequest::ResultState { result_id, respond_to } => {
                    self.serve(op, respond_to, self.engine.result_state(&result_id)).await
                }
                EngineRequest::TotalImpacts { result_id, respond_to } => {
                    self.serve(op, respond_to, self.engine.total_impacts(&result_id)).await
                }
                EngineRequest::TotalRequirements { result_id, respond_to } => {
                    self.serve(op, respond_to, self.engine.total_requirements(&result_id)).await
                }
                EngineRequest::TotalImpactsOf { result_id, tech_flow, respond_to } => {
                    self.serve(op, respond_to, self.engine.total_impacts_of(&result_id, &tech_flow))
                        .await
                }
                EngineRequest::Dispose { result_id, respond_to } => {
                    self.serve(op, respond_to, self.engine.dispose(&result_id)).await
                }
            }
            served += 1;
        }

        info!(engine_type, served, "Shutdown");
    }

    async fn serve<T>(
        &self,
        op: &'static str,
        respond_to: Response<T>,
        call: impl Future<Output = Result<T, EngineError>>,
    ) {
        let result = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Unavailable(format!(
                "{op} timed out after {:?}",
                self.call_timeout
            ))),
        };
        if let Err(e) = &result {
            warn!(op, error = %e, "Engine call failed");
        }
        // The caller may have given up; nothing to do if so.
        let _ = respond_to.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::FakeEngine;
    use crate::model::{Key, RefType};
    use serde_json::json;

    #[tokio::test]
    async fn test_actor_round_trips_requests() {
        let engine = FakeEngine::new();
        let (actor, handle) = EngineActor::new(engine.clone(), 8, Duration::from_secs(1));
        let task = tokio::spawn(actor.run());

        let stored = handle
            .put(json!({"@type": "Flow", "@id": "f-1", "name": "Nitrate"}))
            .await
            .unwrap();
        assert_eq!(stored.id, "f-1");

        let found = handle.get(RefType::Flow, Key::name("Nitrate")).await.unwrap();
        assert_eq!(found.unwrap()["@id"], "f-1");

        let missing = handle.get(RefType::Flow, Key::name("Ammonia")).await.unwrap();
        assert!(missing.is_none());

        drop(handle);
        task.await.unwrap();
        assert_eq!(engine.calls().puts, 1);
    }

    #[tokio::test]
    async fn test_slow_engine_times_out_as_unavailable() {
        let engine = FakeEngine::new();
        engine.set_latency(Duration::from_millis(200));
        let (actor, handle) = EngineActor::new(engine, 8, Duration::from_millis(20));
        tokio::spawn(actor.run());

        let err = handle.get_all(RefType::Process).await.unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(ref msg) if msg.contains("get_all")));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_stopped_actor_reports_closed() {
        let (actor, handle) = EngineActor::new(FakeEngine::new(), 8, Duration::from_secs(1));
        drop(actor);

        let err = handle.get_all(RefType::Flow).await.unwrap_err();
        assert_eq!(err, EngineError::ActorClosed);
    }
}
