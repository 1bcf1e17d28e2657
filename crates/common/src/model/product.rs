use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, CategoryId, Money, ProductId};

/// A sellable product.
///
/// `category` is not stored with the product; services attach it when
/// reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub sku: Uuid,
    pub name: String,
    pub image: String,
    pub stock: u32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Input for creating a product. The SKU is generated by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub image: String,
    pub stock: u32,
    pub price: Money,
}

/// Partial update of a product. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub stock: Option<u32>,
    pub price: Option<Money>,
}

/// Filters for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl ProductFilter {
    /// Returns true if the product passes the filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id
            && product.category_id != category_id
        {
            return false;
        }
        if let Some(ref search) = self.search
            && !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }
        true
    }

    /// Returns the `"<category_id>-<search>"` encoding used in cache keys.
    ///
    /// A missing category is encoded as `0`, which no stored row uses.
    pub fn cache_params(&self) -> String {
        format!(
            "{}-{}",
            self.category_id.map(|id| id.get()).unwrap_or(0),
            self.search.as_deref().unwrap_or("")
        )
    }
}
