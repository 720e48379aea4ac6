//! Provisioning ledger: service instances and their bindings.
//!
//! Per instance id the lifecycle is `absent -> provisioned -> deprovisioned`,
//! per binding id within an instance it is `absent -> bound -> unbound`.
//! Deprovisioning forgets the instance entirely, so the id can be provisioned
//! again from scratch.
//!
//! The ledger lock is never held while the registry is called: stores are
//! allocated before an instance is recorded and removed after it is
//! forgotten.

use crate::error::{BrokerError, Result};
use crate::store::{Store, StoreRegistry};
use broker_api::{Catalog, Credentials, ProvisionRequest};
use log::{info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A new instance and its store were created.
    Created,
    /// An identical request was already served, nothing changed.
    AlreadyProvisioned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Created(Credentials),
    /// The binding already exists. Its request is not compared again.
    AlreadyBound,
}

#[derive(Debug, Clone)]
pub struct Binding {
    id: String,
    credentials: Credentials,
}

impl Binding {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[derive(Debug)]
pub struct Instance {
    id: String,
    store: Arc<Store>,
    request: ProvisionRequest,
    bindings: HashMap<String, Binding>,
}

impl Instance {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn request(&self) -> &ProvisionRequest {
        &self.request
    }

    pub fn binding(&self, binding_id: &str) -> Option<&Binding> {
        self.bindings.get(binding_id)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

/// Read-only copy of an instance, safe to hold outside the ledger lock.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSummary {
    pub id: String,
    pub store_id: String,
    pub request: ProvisionRequest,
    pub binding_ids: Vec<String>,
}

pub struct ProvisioningLedger {
    catalog: Arc<Catalog>,
    registry: Arc<StoreRegistry>,
    instances: Mutex<HashMap<String, Instance>>,
}

impl ProvisioningLedger {
    pub fn new(catalog: Arc<Catalog>, registry: Arc<StoreRegistry>) -> Self {
        Self {
            catalog,
            registry,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Creates the instance `instance_id` backed by a fresh store.
    ///
    /// Validation runs instance id, service id, plan id, then catalog
    /// membership. Repeating a request with equal parameters is a no-op
    /// success, any other request for a live id is a conflict.
    pub fn provision(
        &self,
        instance_id: &str,
        request: ProvisionRequest,
        host: &str,
    ) -> Result<ProvisionOutcome> {
        require(instance_id, "Missing InstanceID")?;
        require(&request.service_id, "Missing service_id")?;
        require(&request.plan_id, "Missing plan_id")?;

        if self
            .catalog
            .find_plan(&request.service_id, &request.plan_id)
            .is_none()
        {
            return Err(BrokerError::Validation(format!(
                "Can't find service/plan {}/{}",
                request.service_id, request.plan_id
            )));
        }

        if let Some(existing) = self.instances.lock().get(instance_id) {
            return repeat_outcome(instance_id, existing, &request);
        }

        // Allocated outside the ledger lock. A racing provision of the same
        // id may win in between, in which case this store is dropped again.
        let store = self.registry.create_store(None, host)?;

        let mut instances = self.instances.lock();
        if let Some(existing) = instances.get(instance_id) {
            let outcome = repeat_outcome(instance_id, existing, &request);
            drop(instances);
            self.discard_store(&store);
            return outcome;
        }
        instances.insert(
            instance_id.to_string(),
            Instance {
                id: instance_id.to_string(),
                store,
                request,
                bindings: HashMap::new(),
            },
        );
        drop(instances);

        info!("Instance {}: created", instance_id);
        Ok(ProvisionOutcome::Created)
    }

    /// Removes the instance together with its store and every binding.
    ///
    /// `service_id` and `plan_id` must be present but are not checked
    /// against the instance or the catalog.
    pub fn deprovision(
        &self,
        instance_id: &str,
        service_id: Option<&str>,
        plan_id: Option<&str>,
    ) -> Result<()> {
        require(instance_id, "Missing InstanceID")?;
        require(service_id.unwrap_or_default(), "Missing ServiceID")?;
        require(plan_id.unwrap_or_default(), "Missing PlanID")?;

        let instance = self
            .instances
            .lock()
            .remove(instance_id)
            .ok_or_else(|| missing_instance(instance_id))?;

        if let Err(e) = self.registry.remove_if_same(&instance.store) {
            // Already removed through the store API, nothing left to clean.
            warn!("Instance {}: {}", instance_id, e);
        }

        info!(
            "Instance {}: deleted ({} bindings dropped)",
            instance_id,
            instance.bindings.len()
        );
        Ok(())
    }

    /// Issues the instance's store credentials under `binding_id`.
    pub fn bind(&self, instance_id: &str, binding_id: &str) -> Result<BindOutcome> {
        require(instance_id, "Missing InstanceID")?;
        require(binding_id, "Missing BindingID")?;

        let mut instances = self.instances.lock();
        let instance = instances
            .get_mut(instance_id)
            .ok_or_else(|| missing_instance(instance_id))?;

        if instance.bindings.contains_key(binding_id) {
            return Ok(BindOutcome::AlreadyBound);
        }

        let credentials = instance.store.credentials();
        instance.bindings.insert(
            binding_id.to_string(),
            Binding {
                id: binding_id.to_string(),
                credentials: credentials.clone(),
            },
        );

        info!("Instance {}: Binding {:?} created", instance_id, binding_id);
        Ok(BindOutcome::Created(credentials))
    }

    pub fn unbind(
        &self,
        instance_id: &str,
        binding_id: &str,
        service_id: Option<&str>,
        plan_id: Option<&str>,
    ) -> Result<()> {
        require(instance_id, "Missing InstanceID")?;
        require(binding_id, "Missing BindingID")?;
        require(service_id.unwrap_or_default(), "Missing ServiceID")?;
        require(plan_id.unwrap_or_default(), "Missing PlanID")?;

        let mut instances = self.instances.lock();
        let instance = instances
            .get_mut(instance_id)
            .ok_or_else(|| missing_instance(instance_id))?;

        instance.bindings.remove(binding_id).ok_or_else(|| {
            BrokerError::Gone(format!("Can't find binding with id: {binding_id}"))
        })?;

        info!("Instance {}: Binding {:?} deleted", instance_id, binding_id);
        Ok(())
    }

    pub fn instance(&self, instance_id: &str) -> Option<InstanceSummary> {
        self.instances.lock().get(instance_id).map(|i| {
            let mut binding_ids: Vec<String> = i.bindings.keys().cloned().collect();
            binding_ids.sort();
            InstanceSummary {
                id: i.id.clone(),
                store_id: i.store.id().to_string(),
                request: i.request.clone(),
                binding_ids,
            }
        })
    }

    fn discard_store(&self, store: &Arc<Store>) {
        if let Err(e) = self.registry.remove_if_same(store) {
            warn!("Store {}: {}", store.id(), e);
        }
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of provisioning an id that is already live.
fn repeat_outcome(
    instance_id: &str,
    existing: &Instance,
    request: &ProvisionRequest,
) -> Result<ProvisionOutcome> {
    if existing.request.parameters == request.parameters {
        return Ok(ProvisionOutcome::AlreadyProvisioned);
    }
    Err(BrokerError::Conflict(format!(
        "Instance with that ID({instance_id}) already exists"
    )))
}

fn require(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BrokerError::Validation(message.to_string()));
    }
    Ok(())
}

fn missing_instance(instance_id: &str) -> BrokerError {
    BrokerError::Gone(format!("Can't find instance with id: {instance_id}"))
}

#[cfg(test)]
mod tests;
