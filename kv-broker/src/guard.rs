//! Credential checks in front of every broker and store operation.
//!
//! Two scopes exist: the broker admin credentials, guarding catalog,
//! instance, binding and registry-wide operations, and each store's own
//! owner credentials, guarding that store's contents.

use crate::error::{BrokerError, Result};
use crate::store::Store;
use log::warn;

/// Username and password presented by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessGuard {
    admin: BasicCredentials,
    disabled: bool,
}

impl AccessGuard {
    pub fn new(admin: BasicCredentials, disabled: bool) -> Self {
        Self { admin, disabled }
    }

    /// A guard that lets everything through.
    pub fn open() -> Self {
        Self::new(BasicCredentials::new("", ""), true)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn admin_user(&self) -> &str {
        &self.admin.user
    }

    /// Allows when checking is off or the resource has no user configured.
    /// Otherwise both fields of the claim must match exactly.
    pub fn verify(
        &self,
        claimed: Option<&BasicCredentials>,
        expected_user: &str,
        expected_password: &str,
    ) -> Result<()> {
        if self.disabled || expected_user.is_empty() {
            return Ok(());
        }

        match claimed {
            Some(c) if c.user == expected_user && c.password == expected_password => Ok(()),
            Some(c) => {
                warn!("Rejected credentials for user {:?}", c.user);
                Err(BrokerError::Unauthorized)
            }
            None => {
                warn!("Rejected request without credentials");
                Err(BrokerError::Unauthorized)
            }
        }
    }

    pub fn verify_admin(&self, claimed: Option<&BasicCredentials>) -> Result<()> {
        self.verify(claimed, &self.admin.user, &self.admin.password)
    }

    pub fn verify_store(&self, claimed: Option<&BasicCredentials>, store: &Store) -> Result<()> {
        self.verify(claimed, store.user(), store.password())
    }

    /// Store owner credentials, with the admin credentials as an override.
    pub fn verify_store_or_admin(
        &self,
        claimed: Option<&BasicCredentials>,
        store: &Store,
    ) -> Result<()> {
        self.verify_store(claimed, store)
            .or_else(|_| self.verify_admin(claimed))
    }
}
