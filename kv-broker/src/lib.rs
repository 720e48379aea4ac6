//! An Open Service Broker whose backing resource is an in-memory key/value
//! store.
//!
//! The broker lets a platform provision, bind, unbind and deprovision
//! instances; each instance owns one [`store::Store`]. Stores are also
//! reachable directly under `/db`.

pub mod api;
pub mod args;
pub mod catalog;
pub mod config;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod store;

pub use error::{BrokerError, Result};
