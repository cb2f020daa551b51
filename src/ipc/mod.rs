//! # IPC Engine
//!
//! [`Engine`] over the engine's JSON-RPC 2.0 endpoint. Every call is one HTTP POST
//! of a request envelope to `http://<host>:<port>/`.
//!
//! Error mapping:
//! - transport failures (refused, reset, HTTP timeout, non-2xx) become
//!   [`EngineError::Unavailable`];
//! - a JSON-RPC error object becomes [`EngineError::Rejected`], except a not-found
//!   answer to `data/get`, which is a plain miss;
//! - a result of an unexpected shape becomes [`EngineError::Decode`].

mod rpc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::framework::{decode, Engine, EngineError};
use crate::model::{
    CalculationSetup, ImpactValue, Key, LinkingConfig, Ref, RefType, ResultState, TechFlow,
    TechFlowValue,
};
use rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, NOT_FOUND};

pub struct IpcEngine {
    http: Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl IpcEngine {
    /// `timeout` bounds each HTTP exchange; the engine actor applies its own bound on top.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Unavailable(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one request and returns either the result or the engine's error object.
    async fn exchange(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Result<Value, JsonRpcError>, EngineError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, Some(params));
        debug!(id, method, "RPC request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EngineError::Unavailable(format!("{method}: {e}")))?;

        let body: JsonRpcResponse = response.json().await.map_err(|e| EngineError::Decode {
            context: method.to_string(),
            reason: e.to_string(),
        })?;

        match body.error {
            Some(error) => Ok(Err(error)),
            None => Ok(Ok(body.result.unwrap_or(Value::Null))),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, EngineError> {
        self.exchange(method, params)
            .await?
            .map_err(|error| EngineError::Rejected {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            })
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, EngineError> {
        let value = self.call(method, params).await?;
        decode(method, value)
    }
}

fn result_ref(result_id: &str) -> Value {
    json!({ "@id": result_id })
}

#[async_trait]
impl Engine for IpcEngine {
    async fn get(&self, kind: RefType, key: &Key) -> Result<Option<Value>, EngineError> {
        let params = match key {
            Key::Id(id) => json!({ "@type": kind, "@id": id }),
            Key::Name(name) => json!({ "@type": kind, "name": name }),
        };
        match self.exchange("data/get", params).await? {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(error) if error.code == NOT_FOUND => Ok(None),
            Err(error) => Err(EngineError::Rejected {
                method: "data/get".to_string(),
                code: error.code,
                message: error.message,
            }),
        }
    }

    async fn get_all(&self, kind: RefType) -> Result<Vec<Value>, EngineError> {
        self.call_as("data/get/all", json!({ "@type": kind })).await
    }

    async fn put(&self, entity: Value) -> Result<Ref, EngineError> {
        self.call_as("data/put", entity).await
    }

    async fn delete(&self, target: &Ref) -> Result<(), EngineError> {
        self.call("data/delete", json!(target)).await.map(|_| ())
    }

    async fn create_product_system(
        &self,
        process: &Ref,
        config: &LinkingConfig,
    ) -> Result<Ref, EngineError> {
        self.call_as(
            "data/create/system",
            json!({ "process": process, "config": config }),
        )
        .await
    }

    async fn calculate(&self, setup: &CalculationSetup) -> Result<ResultState, EngineError> {
        self.call_as("result/calculate", json!(setup)).await
    }

    async fn result_state(&self, result_id: &str) -> Result<ResultState, EngineError> {
        self.call_as("result/state", result_ref(result_id)).await
    }

    async fn total_impacts(&self, result_id: &str) -> Result<Vec<ImpactValue>, EngineError> {
        self.call_as("result/total-impacts", result_ref(result_id))
            .await
    }

    async fn total_requirements(
        &self,
        result_id: &str,
    ) -> Result<Vec<TechFlowValue>, EngineError> {
        self.call_as("result/total-requirements", result_ref(result_id))
            .await
    }

    async fn total_impacts_of(
        &self,
        result_id: &str,
        tech_flow: &TechFlow,
    ) -> Result<Vec<ImpactValue>, EngineError> {
        self.call_as(
            "result/total-impacts-of",
            json!({ "@id": result_id, "techFlow": tech_flow }),
        )
        .await
    }

    async fn dispose(&self, result_id: &str) -> Result<(), EngineError> {
        self.call("result/dispose", result_ref(result_id))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<JsonRpcRequest>>>;

    /// Serves a tiny JSON-RPC endpoint that answers from `reply` and records requests.
    async fn serve(reply: fn(&JsonRpcRequest) -> Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorded = seen.clone();
        let app = Router::new().route(
            "/",
            post(move |Json(request): Json<JsonRpcRequest>| {
                let recorded = recorded.clone();
                async move {
                    let body = reply(&request);
                    recorded.lock().unwrap().push(request);
                    Json(body)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/"), seen)
    }

    fn engine(endpoint: String) -> IpcEngine {
        IpcEngine::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_by_name_sends_type_and_name() {
        let (endpoint, seen) = serve(|request| {
            json!({
                "jsonrpc": "2.0",
                "result": {"@type": "ProductSystem", "@id": "ps-1", "name": "TOMATE"},
                "id": request.id
            })
        })
        .await;

        let found = engine(endpoint)
            .get(RefType::ProductSystem, &Key::name("TOMATE"))
            .await
            .unwrap();
        assert_eq!(found.unwrap()["@id"], "ps-1");

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].method, "data/get");
        assert_eq!(
            seen[0].params,
            Some(json!({"@type": "ProductSystem", "name": "TOMATE"}))
        );
    }

    #[tokio::test]
    async fn test_not_found_is_a_miss() {
        let (endpoint, _) = serve(|request| {
            json!({
                "jsonrpc": "2.0",
                "error": {"code": 404, "message": "not found"},
                "id": request.id
            })
        })
        .await;

        let found = engine(endpoint)
            .get(RefType::Process, &Key::id("nope"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_engine_error_is_rejected() {
        let (endpoint, _) = serve(|request| {
            json!({
                "jsonrpc": "2.0",
                "error": {"code": 500, "message": "singular matrix"},
                "id": request.id
            })
        })
        .await;

        let err = engine(endpoint).dispose("r-1").await.unwrap_err();
        assert_eq!(
            err,
            EngineError::Rejected {
                method: "result/dispose".to_string(),
                code: 500,
                message: "singular matrix".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let (endpoint, _) = serve(|request| {
            json!({"jsonrpc": "2.0", "result": "ready", "id": request.id})
        })
        .await;

        let err = engine(endpoint).result_state("r-1").await.unwrap_err();
        assert!(matches!(err, EngineError::Decode { ref context, .. } if context == "result/state"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = engine(format!("http://{addr}/"))
            .get_all(RefType::Flow)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
