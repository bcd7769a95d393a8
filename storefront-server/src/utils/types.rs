//! Shared Types
//!
//! Common query-string types used by every listing endpoint.

use serde::Deserialize;
use shared::OrderStatus;

use crate::db::query::SortDirection;

/// Listing query parameters
///
/// `filter` is the sort-direction selector (`"atoz"` / `"ztoa"`);
/// `parentId` scopes category listings, `status` scopes order listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,

    #[serde(default)]
    pub search: String,

    #[serde(default)]
    pub filter: String,

    pub parent_id: Option<String>,

    pub status: Option<OrderStatus>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: String::new(),
            filter: String::new(),
            parent_id: None,
            status: None,
        }
    }
}

impl ListParams {
    /// Sort direction selected by the `filter` parameter
    pub fn direction(&self) -> SortDirection {
        SortDirection::from_selector(&self.filter)
    }
}
