//! Loading the service catalog.
//!
//! The catalog is read once before serving and never changes afterwards.

use anyhow::{Context, Result};
use broker_api::{Catalog, Plan, Service};
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_SERVICE_ID: &str = "service-1-id";
pub const DEFAULT_PLAN_ID: &str = "plan-1-id";

/// The single in-memory key/value service with its free plan.
pub fn default_catalog() -> Catalog {
    Catalog::new(vec![Service {
        name: "db".to_string(),
        id: DEFAULT_SERVICE_ID.to_string(),
        description: "In-memory DB for demos".to_string(),
        tags: Vec::new(),
        requires: Vec::new(),
        bindable: true,
        metadata: BTreeMap::new(),
        plan_updateable: false,
        plans: vec![Plan {
            id: DEFAULT_PLAN_ID.to_string(),
            name: "free".to_string(),
            description: "Totally free usage".to_string(),
            metadata: BTreeMap::new(),
            free: true,
            bindable: None,
        }],
    }])
}

/// Reads a `{ "services": [...] }` document.
pub fn from_file(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let catalog: Catalog = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;

    info!(
        "Loaded catalog from {} ({} services)",
        path.display(),
        catalog.services.len()
    );
    Ok(catalog)
}

/// The catalog at `path`, or the built-in one.
pub fn load(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => from_file(path),
        None => Ok(default_catalog()),
    }
}
