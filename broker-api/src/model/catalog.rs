//! Catalog of offerable services and their plans.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The full list of services a broker offers, as served on `/v2/catalog`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
}

impl Catalog {
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    /// Looks up a service by its id.
    pub fn service(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }

    /// Finds the plan `plan_id` offered by the service `service_id`.
    ///
    /// Only the first service carrying `service_id` is searched, a plan with
    /// the same id under another service does not match.
    pub fn find_plan(&self, service_id: &str, plan_id: &str) -> Option<&Plan> {
        self.service(service_id)?
            .plans
            .iter()
            .find(|p| p.id == plan_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    pub bindable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub plan_updateable: bool,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    #[serde(default)]
    pub free: bool,
    /// Overrides the service level `bindable` flag when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindable: Option<bool>,
}
