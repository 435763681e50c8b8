//! Request payloads and response envelopes of the shop API.
//!
//! Payload structs serialize to exactly the JSON bodies the server binds. Response envelopes
//! tolerate a missing or `null` list and treat it as empty.

use super::{DashboardStats, Product, Role, Shop, ShopSettings, Transaction, TransactionType, User};
use serde::{Deserialize, Serialize};

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain password; sent over TLS only.
    pub password: String,
}

/// Body of `POST /register`: a new shop and its first account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    /// Owner name.
    pub name: String,
    /// Owner email.
    pub email: String,
    /// Owner password.
    pub password: String,
    /// Role of the first account, normally `SuperAdmin`.
    pub role: Role,
    /// Name of the shop to create.
    pub shop_name: String,
    /// Number customers order through.
    pub whatsapp_number: String,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    /// Product name.
    pub name: String,
    /// Free text.
    pub description: String,
    /// Category tag.
    pub category: String,
    /// Cost price.
    pub purchase_price: f64,
    /// Price customers pay.
    pub selling_price: f64,
    /// Units on hand.
    pub stock: i64,
    /// Picture URL, may be empty.
    pub image_url: String,
}

/// Partial product update. Omitted fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// New cost price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    /// New selling price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selling_price: Option<f64>,
    /// New stock count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    /// New picture URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// New transaction. `product_id` and `quantity` are never serialized for non-sale types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    /// Sale, expense or withdrawal.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Total amount.
    pub amount: f64,
    /// Product sold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    /// Units sold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    /// Staff name.
    pub name: String,
    /// Staff email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Staff role.
    pub role: Role,
}

/// Partial staff account update. Omitted fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Body of `PUT /shop`. Omitted fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShopUpdate {
    /// New shop name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_number: Option<String>,
    /// Whether the storefront is listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Body of a successful `/login` or `/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for later calls.
    pub token: String,
    /// Profile of the account that logged in.
    pub user: User,
}

/// Body of `GET /public/shops`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShopList {
    /// Listed shops.
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub shops: Vec<Shop>,
}

/// Body of every product list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductList {
    /// Products, possibly none.
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub products: Vec<Product>,
}

/// Body of `GET /transactions`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionList {
    /// Ledger entries, possibly none.
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub transactions: Vec<Transaction>,
}

/// Body of `GET /users`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserList {
    /// Staff accounts.
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub users: Vec<User>,
}

/// Body of `GET /reports/dashboard`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardEnvelope {
    /// Aggregates.
    pub dashboard: DashboardStats,
}

/// Body of `GET /products/{id}` and its public counterpart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductEnvelope {
    /// The product.
    pub product: Product,
}

/// Body of `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileEnvelope {
    /// The logged-in user.
    pub user: User,
}

/// Body of `GET /shop`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShopEnvelope {
    /// Shop settings.
    pub shop: ShopSettings,
}
