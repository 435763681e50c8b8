//! Form state and payload shaping.
//!
//! A form is a map from field id to the raw string the user typed. The builders here turn
//! those strings into typed request payloads, applying the numeric coercions (prices and
//! amounts to `f64`, stock, quantities and ids to `i64`). Coercion failures are reported as
//! [`Error::InvalidField`] instead of sending a malformed value to the server.

use crate::{
    entities::{
        LoginRequest, NewProduct, NewTransaction, NewUser, ProductUpdate, RegisterRequest, Role,
        ShopUpdate, TransactionType, UserUpdate,
    },
    errors::{Error, Result},
};
use std::{collections::BTreeMap, str::FromStr};

/// Field ids of every form, shared by the controllers and the command line.
pub mod field {
    /// Login email.
    pub const LOGIN_EMAIL: &str = "login-email";
    /// Login password.
    pub const LOGIN_PASSWORD: &str = "login-password";

    /// Owner name.
    pub const REG_NAME: &str = "reg-name";
    /// Owner email.
    pub const REG_EMAIL: &str = "reg-email";
    /// Owner password.
    pub const REG_PASSWORD: &str = "reg-password";
    /// Role of the new account.
    pub const REG_ROLE: &str = "reg-role";
    /// Name of the shop to create.
    pub const REG_SHOP: &str = "reg-shop";
    /// Order number of the new shop.
    pub const REG_WHATSAPP: &str = "reg-whatsapp";

    /// Product name.
    pub const PROD_NAME: &str = "prod-name";
    /// Product description.
    pub const PROD_DESC: &str = "prod-desc";
    /// Product category.
    pub const PROD_CATEGORY: &str = "prod-category";
    /// Cost price, a number.
    pub const PROD_PURCHASE: &str = "prod-purchase";
    /// Selling price, a number.
    pub const PROD_SELLING: &str = "prod-selling";
    /// Units on hand, a whole number.
    pub const PROD_STOCK: &str = "prod-stock";
    /// Picture URL.
    pub const PROD_IMAGE: &str = "prod-image";

    /// `Sale`, `Expense` or `Withdrawal`.
    pub const TRANS_TYPE: &str = "trans-type";
    /// Total amount, a number.
    pub const TRANS_AMOUNT: &str = "trans-amount";
    /// Product id, sales only.
    pub const TRANS_PRODUCT: &str = "trans-product";
    /// Units sold, sales only.
    pub const TRANS_QUANTITY: &str = "trans-quantity";

    /// Staff name.
    pub const USER_NAME: &str = "user-name";
    /// Staff email.
    pub const USER_EMAIL: &str = "user-email";
    /// Staff password.
    pub const USER_PASSWORD: &str = "user-password";
    /// Staff role.
    pub const USER_ROLE: &str = "user-role";

    /// Shop name.
    pub const SHOP_NAME: &str = "shop-name";
    /// Shop order number.
    pub const SHOP_WHATSAPP: &str = "shop-whatsapp";
    /// `true` or `false`.
    pub const SHOP_ACTIVE: &str = "shop-active";
}

/// Raw values of one form's inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    values: BTreeMap<String, String>,
}

impl FormFields {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets one field, replacing what was typed before.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// Current value, empty when the field was never filled.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map_or("", String::as_str)
    }

    /// Trimmed value, `None` when blank.
    #[must_use]
    pub fn optional(&self, field: &str) -> Option<String> {
        let value = self.value(field).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Empties every field.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    /// True when every field is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }

    fn required(&self, field: &str) -> Result<String> {
        self.optional(field).ok_or_else(|| Error::MissingField {
            field: field.to_string(),
        })
    }

    fn parsed<T: FromStr>(&self, field: &str) -> Result<T> {
        let raw = self.required(field)?;
        raw.parse().map_err(|_| Error::InvalidField {
            field: field.to_string(),
            value: raw,
        })
    }

    fn parsed_optional<T: FromStr>(&self, field: &str) -> Result<Option<T>> {
        self.optional(field)
            .map(|raw| {
                raw.parse().map_err(|_| Error::InvalidField {
                    field: field.to_string(),
                    value: raw,
                })
            })
            .transpose()
    }

    /// Parses a currency field; non-finite values are rejected.
    fn price(&self, field: &str) -> Result<f64> {
        let value: f64 = self.parsed(field)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::InvalidField {
                field: field.to_string(),
                value: self.value(field).to_string(),
            })
        }
    }

    fn optional_price(&self, field: &str) -> Result<Option<f64>> {
        match self.parsed_optional::<f64>(field)? {
            Some(value) if !value.is_finite() => Err(Error::InvalidField {
                field: field.to_string(),
                value: self.value(field).to_string(),
            }),
            other => Ok(other),
        }
    }
}

/// Login credentials. Values are sent as typed; the server validates them.
#[must_use]
pub fn login_request(fields: &FormFields) -> LoginRequest {
    LoginRequest {
        email: fields.value(field::LOGIN_EMAIL).trim().to_string(),
        password: fields.value(field::LOGIN_PASSWORD).to_string(),
    }
}

/// # Errors
/// Returns an error if the role is missing or unknown.
pub fn register_request(fields: &FormFields) -> Result<RegisterRequest> {
    Ok(RegisterRequest {
        name: fields.value(field::REG_NAME).trim().to_string(),
        email: fields.value(field::REG_EMAIL).trim().to_string(),
        password: fields.value(field::REG_PASSWORD).to_string(),
        role: parse_role(fields, field::REG_ROLE)?,
        shop_name: fields.value(field::REG_SHOP).trim().to_string(),
        whatsapp_number: fields.value(field::REG_WHATSAPP).trim().to_string(),
    })
}

/// # Errors
/// Returns an error if a price or the stock is missing or not a number.
pub fn new_product(fields: &FormFields) -> Result<NewProduct> {
    Ok(NewProduct {
        name: fields.value(field::PROD_NAME).trim().to_string(),
        description: fields.value(field::PROD_DESC).trim().to_string(),
        category: fields.value(field::PROD_CATEGORY).trim().to_string(),
        purchase_price: fields.price(field::PROD_PURCHASE)?,
        selling_price: fields.price(field::PROD_SELLING)?,
        stock: fields.parsed(field::PROD_STOCK)?,
        image_url: fields.value(field::PROD_IMAGE).trim().to_string(),
    })
}

/// Partial update from the same fields as [`new_product`]; blank fields are left out.
///
/// # Errors
/// Returns an error if a filled numeric field is not a number.
pub fn product_update(fields: &FormFields) -> Result<ProductUpdate> {
    Ok(ProductUpdate {
        name: fields.optional(field::PROD_NAME),
        description: fields.optional(field::PROD_DESC),
        category: fields.optional(field::PROD_CATEGORY),
        purchase_price: fields.optional_price(field::PROD_PURCHASE)?,
        selling_price: fields.optional_price(field::PROD_SELLING)?,
        stock: fields.parsed_optional(field::PROD_STOCK)?,
        image_url: fields.optional(field::PROD_IMAGE),
    })
}

/// Builds a transaction. Product and quantity are read only for a sale and are left out
/// entirely for every other type.
///
/// # Errors
/// Returns an error if the type or amount is invalid, or a sale lacks product or quantity.
pub fn new_transaction(fields: &FormFields) -> Result<NewTransaction> {
    let kind: TransactionType = fields.parsed(field::TRANS_TYPE)?;
    let amount = fields.price(field::TRANS_AMOUNT)?;

    let (product_id, quantity) = if kind.requires_product() {
        (
            Some(fields.parsed(field::TRANS_PRODUCT)?),
            Some(fields.parsed(field::TRANS_QUANTITY)?),
        )
    } else {
        (None, None)
    };

    Ok(NewTransaction {
        kind,
        amount,
        product_id,
        quantity,
    })
}

/// # Errors
/// Returns an error if the role is missing or unknown.
pub fn new_user(fields: &FormFields) -> Result<NewUser> {
    Ok(NewUser {
        name: fields.value(field::USER_NAME).trim().to_string(),
        email: fields.value(field::USER_EMAIL).trim().to_string(),
        password: fields.value(field::USER_PASSWORD).to_string(),
        role: parse_role(fields, field::USER_ROLE)?,
    })
}

/// # Errors
/// Returns an error if a filled role is unknown.
pub fn user_update(fields: &FormFields) -> Result<UserUpdate> {
    Ok(UserUpdate {
        name: fields.optional(field::USER_NAME),
        email: fields.optional(field::USER_EMAIL),
        password: fields.optional(field::USER_PASSWORD),
        role: fields.parsed_optional(field::USER_ROLE)?,
    })
}

/// # Errors
/// Returns an error if the active flag is not `true` or `false`.
pub fn shop_update(fields: &FormFields) -> Result<ShopUpdate> {
    Ok(ShopUpdate {
        name: fields.optional(field::SHOP_NAME),
        whatsapp_number: fields.optional(field::SHOP_WHATSAPP),
        active: fields.parsed_optional(field::SHOP_ACTIVE)?,
    })
}

fn parse_role(fields: &FormFields, id: &str) -> Result<Role> {
    fields.parsed(id)
}
