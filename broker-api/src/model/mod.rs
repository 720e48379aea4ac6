pub mod binding;
pub mod catalog;
pub mod error;
pub mod provision;
pub mod store;
