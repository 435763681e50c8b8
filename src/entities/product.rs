//! Product entity - stock items of a shop.
//!
//! The same type covers the private view (with `purchase_price` for a `SuperAdmin`) and the
//! public storefront view (with `in_stock` and `whatsapp_link`). Fields the server omits in a
//! given view are optional here.

use serde::{Deserialize, Serialize};

/// Products with stock strictly below this value count as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Product record of either view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
    /// Category tag, may be empty.
    #[serde(default)]
    pub category: String,
    /// Cost price. Only present in `SuperAdmin` responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    /// Price customers pay.
    pub selling_price: f64,
    /// Units on hand.
    #[serde(default)]
    pub stock: i64,
    /// Picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Server-computed availability, public view only.
    #[serde(rename = "in_stock", default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Prebuilt order deep link, public view only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp_link: Option<String>,
}

impl Product {
    /// Whether the product can be ordered. Falls back to `stock > 0` when the server omits it.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.available.unwrap_or(self.stock > 0)
    }

    /// Stock below [`LOW_STOCK_THRESHOLD`].
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    /// Image URL, treating an empty string as absent.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}
