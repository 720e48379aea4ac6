use super::{PasswordGenerator, Store};
use crate::error::{BrokerError, Result};
use log::info;
use parking_lot::{Mutex, RwLock};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Owner name given to every new store.
pub const DEFAULT_STORE_USER: &str = "user";

/// Process-wide table of live stores.
///
/// Id allocation, the id to store map and each store's contents are guarded
/// separately. Work on two different stores never contends, and no method
/// holds more than one of these sections at a time.
pub struct StoreRegistry {
    last_id: Mutex<u64>,
    stores: RwLock<HashMap<String, Arc<Store>>>,
    passwords: PasswordGenerator,
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::with_passwords(PasswordGenerator::from_entropy())
    }

    pub fn with_passwords(passwords: PasswordGenerator) -> Self {
        Self {
            last_id: Mutex::new(0),
            stores: RwLock::new(HashMap::new()),
            passwords,
        }
    }

    /// Creates and registers a new, empty store.
    ///
    /// Without `requested_id` the next unused integer id is taken from a
    /// counter that never goes backwards, skipping ids that were claimed
    /// explicitly. `host` only feeds the advisory access url.
    pub fn create_store(&self, requested_id: Option<&str>, host: &str) -> Result<Arc<Store>> {
        let store = match requested_id {
            Some("") => return Err(BrokerError::Validation("Missing store id".into())),
            Some(id) => {
                let store = Arc::new(self.build(id.to_string(), host));
                match self.stores.write().entry(id.to_string()) {
                    Entry::Occupied(_) => {
                        return Err(BrokerError::Conflict(format!(
                            "Store with that ID({id}) already exists"
                        )))
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(store.clone());
                    }
                }
                store
            }
            None => loop {
                let store = Arc::new(self.build(self.next_id(), host));
                if let Entry::Vacant(slot) = self.stores.write().entry(store.id().to_string()) {
                    slot.insert(store.clone());
                    break store;
                }
            },
        };

        info!("Store {}: created", store.id());
        Ok(store)
    }

    fn next_id(&self) -> String {
        let mut last = self.last_id.lock();
        *last += 1;
        last.to_string()
    }

    fn build(&self, id: String, host: &str) -> Store {
        let url = format!("http://{host}/db/{id}");
        Store::new(
            id,
            DEFAULT_STORE_USER.to_string(),
            self.passwords.generate(),
            url,
        )
    }

    pub fn get_store(&self, id: &str) -> Result<Arc<Store>> {
        self.stores
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Snapshot of all live stores, in no particular order.
    pub fn list_stores(&self) -> Vec<Arc<Store>> {
        self.stores.read().values().cloned().collect()
    }

    /// Unregisters the store, dropping its contents with it.
    pub fn delete_store(&self, id: &str) -> Result<Arc<Store>> {
        let store = self.stores.write().remove(id).ok_or_else(|| not_found(id))?;
        info!("Store {}: deleted", id);
        Ok(store)
    }

    /// Unregisters `store` only if the id still maps to that same store.
    ///
    /// A store deleted and recreated under the same id in the meantime is
    /// left alone and the call fails with `NotFound`.
    pub fn remove_if_same(&self, store: &Arc<Store>) -> Result<()> {
        match self.stores.write().entry(store.id().to_string()) {
            Entry::Occupied(slot) if Arc::ptr_eq(slot.get(), store) => {
                slot.remove();
            }
            _ => return Err(not_found(store.id())),
        }
        info!("Store {}: deleted", store.id());
        Ok(())
    }

    pub fn get_value(&self, store_id: &str, key: &str) -> Result<Vec<u8>> {
        self.get_store(store_id)?.value(key)
    }

    pub fn set_value(&self, store_id: &str, key: &str, value: Vec<u8>) -> Result<()> {
        self.get_store(store_id)?.set_value(key, value)
    }

    pub fn delete_value(&self, store_id: &str, key: &str) -> Result<()> {
        self.get_store(store_id)?.delete_value(key)
    }

    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn not_found(id: &str) -> BrokerError {
    BrokerError::NotFound(format!("Can't find store with id: {id}"))
}
