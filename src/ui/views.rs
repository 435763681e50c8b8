//! Fragment builders - turn API records into screen fragments.
//!
//! Every builder substitutes its placeholder when the list is empty, so an empty response never
//! produces a header-only table.

use super::screen::{Card, Cell, Fragment, ProductOption, Row, RowAction, StatCard, Table, Tone};
use crate::entities::{DashboardStats, Product, Role, Shop, ShopSettings, Transaction, User};

/// Placeholder of the shop list.
pub const NO_SHOPS: &str = "No shops available";
/// Placeholder of an empty storefront.
pub const NO_STOREFRONT_PRODUCTS: &str = "No products available";
/// Placeholder of the products tab.
pub const NO_PRODUCTS: &str = "No products";
/// Placeholder of the transactions tab.
pub const NO_TRANSACTIONS: &str = "No transactions";
/// Placeholder of the users tab.
pub const NO_USERS: &str = "No users";
/// Placeholder of the low-stock report.
pub const NO_LOW_STOCK: &str = "No low-stock products";

/// Title of the `SuperAdmin`-only cost column.
pub const PURCHASE_PRICE_HEADER: &str = "Purchase price";
const CURRENCY: &str = "DH";
const IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/300x200?text=";

/// Formats a number with thousands separators and at most two decimals, dropping trailing
/// zeros (`1234.5` becomes `1,234.5`, `10.0` becomes `10`).
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Amount in the shop currency, e.g. `1,234.5 DH`.
#[must_use]
pub fn money(value: f64) -> String {
    format!("{} {CURRENCY}", format_number(value))
}

fn or_dash(text: &str) -> String {
    if text.trim().is_empty() {
        "-".to_string()
    } else {
        text.to_string()
    }
}

/// Shop tiles; each opens its storefront.
#[must_use]
pub fn shop_cards(shops: &[Shop]) -> Fragment {
    if shops.is_empty() {
        return Fragment::empty(NO_SHOPS);
    }
    Fragment::Cards(
        shops
            .iter()
            .map(|shop| Card {
                title: shop.name.clone(),
                body: Some("Open to browse products".to_string()),
                opens: Some(shop.id),
                ..Card::default()
            })
            .collect(),
    )
}

/// Public product tiles. The order link is offered only while the product is in stock.
#[must_use]
pub fn storefront_cards(products: &[Product]) -> Fragment {
    if products.is_empty() {
        return Fragment::empty(NO_STOREFRONT_PRODUCTS);
    }
    Fragment::Cards(
        products
            .iter()
            .map(|product| {
                let in_stock = product.in_stock();
                let category = product.category.trim();
                Card {
                    title: product.name.clone(),
                    tag: Some(if category.is_empty() {
                        "Uncategorized".to_string()
                    } else {
                        category.to_string()
                    }),
                    body: Some(product.description.trim().to_string()).filter(|d| !d.is_empty()),
                    price: Some(money(product.selling_price)),
                    status: Some(if in_stock {
                        format!("In stock ({})", product.stock)
                    } else {
                        "Out of stock".to_string()
                    }),
                    link: if in_stock {
                        product.whatsapp_link.clone()
                    } else {
                        None
                    },
                    image: Some(product.image().map_or_else(
                        || format!("{IMAGE_PLACEHOLDER}{}", product.name.replace(' ', "+")),
                        str::to_string,
                    )),
                    opens: None,
                }
            })
            .collect(),
    )
}

/// Private product table. The purchase-price column exists only for a `SuperAdmin`.
#[must_use]
pub fn products_table(products: &[Product], role: Option<Role>) -> Fragment {
    if products.is_empty() {
        return Fragment::empty(NO_PRODUCTS);
    }
    let show_purchase_price = role.is_some_and(Role::is_super_admin);

    let mut headers = vec!["Name".to_string(), "Category".to_string()];
    if show_purchase_price {
        headers.push(PURCHASE_PRICE_HEADER.to_string());
    }
    headers.extend(["Selling price".to_string(), "Stock".to_string()]);

    let rows = products
        .iter()
        .map(|product| {
            let mut cells = vec![Cell::plain(&product.name), Cell::plain(or_dash(&product.category))];
            if show_purchase_price {
                cells.push(Cell::plain(
                    product.purchase_price.map_or_else(|| "-".to_string(), money),
                ));
            }
            cells.push(Cell::plain(money(product.selling_price)));
            cells.push(Cell::flagged(product.stock.to_string(), product.is_low_stock()));
            Row {
                cells,
                action: Some(RowAction::DeleteProduct(product.id)),
            }
        })
        .collect();

    Fragment::Table(Table { headers, rows })
}

/// Ledger table with a delete action per row.
#[must_use]
pub fn transactions_table(transactions: &[Transaction]) -> Fragment {
    if transactions.is_empty() {
        return Fragment::empty(NO_TRANSACTIONS);
    }
    let headers = ["Type", "Product", "Quantity", "Amount", "Date"]
        .map(str::to_string)
        .to_vec();
    let rows = transactions
        .iter()
        .map(|tx| Row {
            cells: vec![
                Cell::plain(tx.kind.as_str()),
                Cell::plain(
                    tx.product
                        .as_ref()
                        .map_or_else(|| "-".to_string(), |p| or_dash(&p.name)),
                ),
                Cell::plain(
                    tx.quantity
                        .filter(|q| *q > 0)
                        .map_or_else(|| "-".to_string(), |q| q.to_string()),
                ),
                Cell::plain(money(tx.amount)),
                Cell::plain(tx.created_at.format("%Y-%m-%d").to_string()),
            ],
            action: Some(RowAction::DeleteTransaction(tx.id)),
        })
        .collect();
    Fragment::Table(Table { headers, rows })
}

/// User table. The viewer's own row gets a marker instead of a delete action.
#[must_use]
pub fn users_table(users: &[User], current_user_id: Option<i64>) -> Fragment {
    if users.is_empty() {
        return Fragment::empty(NO_USERS);
    }
    let headers = ["Name", "Email", "Role"].map(str::to_string).to_vec();
    let rows = users
        .iter()
        .map(|user| Row {
            cells: vec![
                Cell::plain(&user.name),
                Cell::plain(&user.email),
                Cell::plain(user.role.as_str()),
            ],
            action: Some(if Some(user.id) == current_user_id {
                RowAction::SelfMarker
            } else {
                RowAction::DeleteUser(user.id)
            }),
        })
        .collect();
    Fragment::Table(Table { headers, rows })
}

/// Aggregate cards. Withdrawals and stock value appear only when the server sends them.
///
/// # Arguments
/// * `stats` - Body of the dashboard report
#[must_use]
pub fn stats_cards(stats: &DashboardStats) -> Fragment {
    let card = |label: &str, value: String, tone: Tone| StatCard {
        label: label.to_string(),
        value,
        tone,
    };
    let mut cards = vec![
        card("Total sales", money(stats.total_sales), Tone::Normal),
        card("Expenses", money(stats.total_expenses), Tone::Normal),
        card("Net profit", money(stats.net_profit), Tone::Profit),
        card("Products", stats.total_products.to_string(), Tone::Normal),
        card("Low stock", stats.low_stock_products.to_string(), Tone::Warning),
        card("Transactions", stats.transactions.total.to_string(), Tone::Normal),
    ];
    if let Some(withdrawals) = stats.total_withdrawals {
        cards.push(card("Withdrawals", money(withdrawals), Tone::Normal));
    }
    if let Some(stock_value) = stats.stock_value {
        cards.push(card("Stock value", money(stock_value), Tone::Normal));
    }
    Fragment::Stats(cards)
}

/// Stats shown to roles without access to the aggregates.
#[must_use]
pub fn role_card(role: Role) -> Fragment {
    Fragment::Stats(vec![StatCard {
        label: "Role".to_string(),
        value: role.to_string(),
        tone: Tone::Normal,
    }])
}

/// Low-stock report; every stock cell is flagged.
#[must_use]
pub fn low_stock_table(products: &[Product]) -> Fragment {
    if products.is_empty() {
        return Fragment::empty(NO_LOW_STOCK);
    }
    let headers = ["Name", "Stock"].map(str::to_string).to_vec();
    let rows = products
        .iter()
        .map(|product| Row {
            cells: vec![
                Cell::plain(&product.name),
                Cell::flagged(product.stock.to_string(), true),
            ],
            action: None,
        })
        .collect();
    Fragment::Table(Table { headers, rows })
}

/// Shop settings as label/value pairs.
#[must_use]
pub fn shop_details(shop: &ShopSettings) -> Fragment {
    Fragment::Details(vec![
        ("Name".to_string(), shop.name.clone()),
        ("WhatsApp".to_string(), or_dash(&shop.whatsapp_number)),
        (
            "Status".to_string(),
            if shop.active { "Active" } else { "Inactive" }.to_string(),
        ),
    ])
}

/// Detail view of one product. Purchase price and stock are shown when the response carries
/// them, which the public endpoint never does for purchase price.
///
/// # Arguments
/// * `product` - Record returned by the private or the public product endpoint
/// * `role` - Role of the viewer; the purchase price needs a `SuperAdmin`
#[must_use]
pub fn product_details(product: &Product, role: Option<Role>) -> Fragment {
    let mut pairs = vec![
        ("Name".to_string(), product.name.clone()),
        ("Category".to_string(), or_dash(&product.category)),
        ("Description".to_string(), or_dash(&product.description)),
    ];
    if role.is_some_and(Role::is_super_admin) {
        if let Some(purchase_price) = product.purchase_price {
            pairs.push((PURCHASE_PRICE_HEADER.to_string(), money(purchase_price)));
        }
    }
    pairs.push(("Selling price".to_string(), money(product.selling_price)));
    let stock = if product.is_low_stock() {
        format!("{} (low)", product.stock)
    } else {
        product.stock.to_string()
    };
    pairs.push(("Stock".to_string(), stock));
    pairs.push((
        "Status".to_string(),
        if product.in_stock() { "In stock" } else { "Out of stock" }.to_string(),
    ));
    if product.in_stock() {
        if let Some(link) = &product.whatsapp_link {
            pairs.push(("Order".to_string(), link.clone()));
        }
    }
    Fragment::Details(pairs)
}

/// Choices of the transaction form's product selector.
#[must_use]
pub fn product_options(products: &[Product]) -> Vec<ProductOption> {
    products
        .iter()
        .map(|product| ProductOption {
            id: product.id,
            label: format!("{} (Stock: {})", product.name, product.stock),
        })
        .collect()
}
