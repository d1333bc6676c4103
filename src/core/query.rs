//! Query parameters for item search and low-stock listings

use crate::core::entity::Item;
use serde::{Deserialize, Serialize};

/// Item search filters
///
/// All filters are optional and combined with AND.
///
/// # Example
/// ```text
/// GET /api/items/search?query=drill&minPrice=10&maxQuantity=5
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemQuery {
    /// Case-insensitive substring matched against name or description
    pub query: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<i64>,
    pub max_quantity: Option<i64>,
}

impl ItemQuery {
    pub fn matches(&self, item: &Item) -> bool {
        let text = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());
        if let Some(text) = text {
            let needle = text.to_lowercase();
            let hit = item.name.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        let price = item.price.as_f64();
        let quantity = i64::from(item.quantity);

        self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
            && self.min_quantity.is_none_or(|min| quantity >= min)
            && self.max_quantity.is_none_or(|max| quantity <= max)
    }
}

/// Query parameters of the low-stock listing
#[derive(Debug, Clone, Deserialize)]
pub struct LowStockParams {
    #[serde(default = "default_threshold")]
    pub threshold: i64,
}

impl Default for LowStockParams {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> i64 {
    10
}
