//! Key/value stores and the registry that owns them.
//!
//! A [`Store`] is the backing resource handed out by the broker: an
//! in-memory map from key to bytes with its own owner credentials. The
//! [`StoreRegistry`] allocates ids and keeps every live store reachable by
//! id, whether it was created directly or on behalf of a service instance.

mod password;
mod registry;

pub use password::{PasswordGenerator, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
pub use registry::{StoreRegistry, DEFAULT_STORE_USER};

use crate::error::{BrokerError, Result};
use broker_api::{Credentials, StoreView};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug)]
pub struct Store {
    id: String,
    user: String,
    password: String,
    /// Advisory only, derived from the host the store was created through.
    url: String,
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl Store {
    pub(crate) fn new(id: String, user: String, password: String, url: String) -> Self {
        Self {
            id,
            user,
            password,
            url,
            data: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn view(&self) -> StoreView {
        StoreView {
            id: self.id.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            url: self.url.clone(),
        }
    }

    /// The access url and owner credentials, as issued to a binding.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
            url: self.url.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Vec<u8>) {
        self.data.lock().insert(key.into(), value);
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().remove(key)
    }

    /// Like [`Store::get`], failing with `NotFound` for an absent key.
    pub fn value(&self, key: &str) -> Result<Vec<u8>> {
        self.get(key).ok_or_else(|| self.missing_key(key))
    }

    pub fn set_value(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if key.is_empty() {
            return Err(BrokerError::Validation("Missing key".into()));
        }
        debug!(
            "Store {}: Set {:?} to {:?}",
            self.id,
            key,
            String::from_utf8_lossy(&value)
        );
        self.set(key, value);
        Ok(())
    }

    pub fn delete_value(&self, key: &str) -> Result<()> {
        self.remove(key).ok_or_else(|| self.missing_key(key))?;
        debug!("Store {}: Removed {:?}", self.id, key);
        Ok(())
    }

    fn missing_key(&self, key: &str) -> BrokerError {
        BrokerError::NotFound(format!("Can't find key {key:?} in store {}", self.id))
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
