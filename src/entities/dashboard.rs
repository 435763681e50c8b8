//! Dashboard aggregates, `SuperAdmin` only.

use serde::{Deserialize, Serialize};

/// Ledger entry counts by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCounts {
    /// All entries.
    pub total: i64,
    /// Sales.
    #[serde(default)]
    pub sales: Option<i64>,
    /// Expenses.
    #[serde(default)]
    pub expenses: Option<i64>,
    /// Withdrawals.
    #[serde(default)]
    pub withdrawals: Option<i64>,
}

/// Best seller line of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    /// Product id.
    pub product_id: i64,
    /// Product name.
    pub product_name: String,
    /// Units sold.
    pub total_sold: i64,
    /// Revenue from those units.
    pub total_amount: f64,
}

/// Shop aggregates. Fields newer servers add are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Revenue from sales.
    pub total_sales: f64,
    /// Money spent.
    pub total_expenses: f64,
    /// Sales minus expenses.
    pub net_profit: f64,
    /// Products in the catalogue.
    pub total_products: i64,
    /// Products below the low-stock threshold.
    pub low_stock_products: i64,
    /// Ledger size.
    #[serde(default)]
    pub transactions: TransactionCounts,
    /// Money taken out by the owner.
    #[serde(default)]
    pub total_withdrawals: Option<f64>,
    /// Purchase cost of the units sold.
    #[serde(default)]
    pub cost_of_goods_sold: Option<f64>,
    /// Sales minus cost of goods sold.
    #[serde(default)]
    pub gross_margin: Option<f64>,
    /// Stock valued at purchase price.
    #[serde(default)]
    pub stock_value: Option<f64>,
    /// Best sellers, possibly none.
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub top_products: Vec<TopProduct>,
}
