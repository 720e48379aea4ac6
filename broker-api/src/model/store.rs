use serde::{Deserialize, Serialize};

/// Public view of a store: its id, owner credentials and access url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreView {
    pub id: String,
    pub user: String,
    pub password: String,
    pub url: String,
}
