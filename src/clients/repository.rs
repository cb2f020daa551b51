use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::framework::{decode_entity, EngineError, EngineHandle};
use crate::model::{EngineEntity, Key, Ref};

/// Typed storage operations on top of an [`EngineHandle`].
///
/// Implementors only provide the handle; lookups, listing, storing and removal
/// come for free. A lookup that finds nothing is an error here
/// ([`EngineError::LookupMiss`]), not an `Option`.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Access the engine handle.
    fn engine(&self) -> &EngineHandle;

    /// Fetch an entity by id or by name.
    #[instrument(skip(self), fields(kind = %T::KIND))]
    async fn lookup<T: EngineEntity>(&self, key: Key) -> Result<T, EngineError> {
        debug!("Sending request");
        match self.engine().get(T::KIND, key.clone()).await? {
            Some(value) => decode_entity(value),
            None => Err(EngineError::LookupMiss { kind: T::KIND, key }),
        }
    }

    /// Fetch every entity of a kind.
    #[instrument(skip(self), fields(kind = %T::KIND))]
    async fn lookup_all<T: EngineEntity>(&self) -> Result<Vec<T>, EngineError> {
        debug!("Sending request");
        self.engine()
            .get_all(T::KIND)
            .await?
            .into_iter()
            .map(decode_entity)
            .collect()
    }

    /// Insert or overwrite an entity by id.
    #[instrument(skip(self, entity), fields(kind = %T::KIND, id = entity.id()))]
    async fn store<T: EngineEntity>(&self, entity: &T) -> Result<Ref, EngineError> {
        debug!("Sending request");
        let mut value = serde_json::to_value(entity).map_err(|e| EngineError::Decode {
            context: format!("{} {}", T::KIND, entity.id()),
            reason: e.to_string(),
        })?;
        if let Value::Object(map) = &mut value {
            map.insert("@type".to_string(), Value::String(T::KIND.to_string()));
        }
        self.engine().put(value).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, target: Ref) -> Result<(), EngineError> {
        debug!("Sending request");
        self.engine().delete(target).await
    }
}
