//! Transaction entity - sales, expenses and withdrawals.
//!
//! A `Sale` always references a product and a quantity and decrements that product's stock
//! on the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Ledger entry type; the wire names are the variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Goods sold; decrements stock.
    Sale,
    /// Money spent by the shop.
    Expense,
    /// Money taken out by the owner.
    Withdrawal,
}

impl TransactionType {
    /// Wire and display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "Sale",
            Self::Expense => "Expense",
            Self::Withdrawal => "Withdrawal",
        }
    }

    /// Only sales carry a product and a quantity.
    #[must_use]
    pub const fn requires_product(self) -> bool {
        matches!(self, Self::Sale)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Sale" => Ok(Self::Sale),
            "Expense" => Ok(Self::Expense),
            "Withdrawal" => Ok(Self::Withdrawal),
            other => Err(format!("unknown transaction type '{other}'")),
        }
    }
}

/// Product summary nested in a transaction listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product name at the time of listing.
    pub name: String,
}

/// Ledger entry as returned by `/transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Server id.
    pub id: i64,
    /// Entry type, `type` on the wire.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Total amount.
    pub amount: f64,
    /// Product sold, sales only.
    #[serde(default)]
    pub product_id: Option<i64>,
    /// Units sold; `0` or absent for non-sales.
    #[serde(default)]
    pub quantity: Option<i64>,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
    /// Product summary, sales only.
    #[serde(default)]
    pub product: Option<ProductRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_decodes_nested_product() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":4,"type":"Sale","amount":30,"product_id":2,"quantity":2,
                "created_at":"2024-03-01T10:00:00Z","product":{"id":2,"name":"Widget"}}"#,
        )
        .unwrap();
        assert_eq!(tx.kind, TransactionType::Sale);
        assert_eq!(tx.product.map(|p| p.name).as_deref(), Some("Widget"));
    }

    #[test]
    fn test_expense_without_product() {
        let tx: Transaction = serde_json::from_str(
            r#"{"id":5,"type":"Expense","amount":12.5,"quantity":0,"created_at":"2024-03-02T08:30:00Z"}"#,
        )
        .unwrap();
        assert!(!tx.kind.requires_product());
        assert_eq!(tx.product_id, None);
    }
}
