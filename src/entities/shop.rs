//! Shop entity - tenants of the service.

use serde::{Deserialize, Serialize};

/// Public shop listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    /// Server id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Private shop settings, visible to a `SuperAdmin` of that shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    /// Server id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Number customers order through.
    #[serde(default)]
    pub whatsapp_number: String,
    /// Whether the storefront is listed.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}
