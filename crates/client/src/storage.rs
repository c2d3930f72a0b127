//! Session persistence for the logged-in user and the cart.
//!
//! Values are stored as JSON under fixed keys, one document per key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::Mutex;

use proshop_core::wire::UserInfo;

use crate::state::CartItem;

/// Key under which the logged-in user is stored.
pub const USER_INFO_KEY: &str = "userInfo";
/// Key under which the cart lines are stored.
pub const CART_ITEMS_KEY: &str = "cartItems";

/// Errors from session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A string key-value store that survives restarts.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed accessors over any [`SessionStorage`].
#[async_trait]
pub trait SessionExt: SessionStorage {
    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get(key)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    async fn save<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.set(key, serde_json::to_value(value)?).await
    }

    async fn load_user_info(&self) -> Result<Option<UserInfo>, StorageError> {
        self.load(USER_INFO_KEY).await
    }

    async fn load_cart(&self) -> Result<Vec<CartItem>, StorageError> {
        Ok(self.load(CART_ITEMS_KEY).await?.unwrap_or_default())
    }
}

impl<S: SessionStorage + ?Sized> SessionExt for S {}

/// Storage kept in memory; lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.values.lock().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// a crash never leaves a half-written session.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, values: &BTreeMap<String, serde_json::Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(values)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_owned(), value);
        self.write_all(&values).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut values = self.read_all().await?;
        if values.remove(key).is_some() {
            self.write_all(&values).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proshop_core::{Price, ProductId, UserId};

    use super::*;

    fn user_info() -> UserInfo {
        UserInfo {
            id: UserId::new(3),
            name: "Jane".to_owned(),
            email: "jane@example.com".to_owned(),
            is_admin: false,
            token: "token".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session").join("proshop.json");

        let storage = JsonFileStorage::new(&path);
        assert!(storage.load_user_info().await.unwrap().is_none());
        storage.save(USER_INFO_KEY, &user_info()).await.unwrap();
        storage
            .save(
                CART_ITEMS_KEY,
                &vec![CartItem {
                    product: ProductId::new(1),
                    name: "Airpods".to_owned(),
                    image: String::new(),
                    price: Price::from_cents(8999),
                    count_in_stock: 10,
                    qty: 2,
                }],
            )
            .await
            .unwrap();

        let reopened = JsonFileStorage::new(&path);
        assert_eq!(reopened.load_user_info().await.unwrap(), Some(user_info()));
        assert_eq!(reopened.load_cart().await.unwrap().len(), 1);

        reopened.remove(USER_INFO_KEY).await.unwrap();
        assert!(JsonFileStorage::new(&path).load_user_info().await.unwrap().is_none());
        assert_eq!(JsonFileStorage::new(&path).load_cart().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proshop.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let storage = JsonFileStorage::new(&path);
        assert!(matches!(storage.load_user_info().await, Err(StorageError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.load_cart().await.unwrap().is_empty());
        storage.save(USER_INFO_KEY, &user_info()).await.unwrap();
        assert_eq!(storage.load_user_info().await.unwrap(), Some(user_info()));
        storage.remove(USER_INFO_KEY).await.unwrap();
        assert!(storage.get(USER_INFO_KEY).await.unwrap().is_none());
    }
}
