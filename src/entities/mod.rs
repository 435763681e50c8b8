//! Entity module - transport-level representations owned by the shop API.
//! The client only ever holds transient copies of these.

pub mod dashboard;
pub mod product;
pub mod requests;
pub mod shop;
pub mod transaction;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use dashboard::{DashboardStats, TopProduct, TransactionCounts};
pub use product::{LOW_STOCK_THRESHOLD, Product};
pub use requests::{
    AuthResponse, DashboardEnvelope, LoginRequest, NewProduct, NewTransaction, NewUser,
    ProductEnvelope, ProductList, ProductUpdate, ProfileEnvelope, RegisterRequest, ShopEnvelope,
    ShopList, ShopUpdate, TransactionList, UserList, UserUpdate,
};
pub use shop::{Shop, ShopSettings};
pub use transaction::{ProductRef, Transaction, TransactionType};
pub use user::{Role, User};

/// Deserializes a list that the server may send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
