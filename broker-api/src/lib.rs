//! Wire model of the key/value service broker.
//!
//! Everything in here is plain data shared by the broker and its clients:
//! the service catalog, the provisioning and binding bodies, the store view
//! and the OSB error body. Nothing in this crate performs I/O.

pub mod model;

pub use model::binding::{BindRequest, Credentials};
pub use model::catalog::{Catalog, Plan, Service};
pub use model::error::OsbError;
pub use model::provision::{LifecycleQuery, Parameters, ProvisionRequest, ProvisionResponse};
pub use model::store::StoreView;
