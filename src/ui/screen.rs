//! Screen model - the projection of application state that replaces a browser DOM.
//!
//! Loaders and controllers write fragments here; the renderer only reads it.

use std::collections::BTreeSet;

/// A cell of a table row. `warning` marks values that need attention (low stock).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Text shown.
    pub text: String,
    /// Rendered with a warning mark.
    pub warning: bool,
}

impl Cell {
    /// Cell without a warning.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            warning: false,
        }
    }

    /// Cell with a warning when `warning` is set.
    pub fn flagged(text: impl Into<String>, warning: bool) -> Self {
        Self {
            text: text.into(),
            warning,
        }
    }
}

/// Per-row affordance. `SelfMarker` replaces the delete action on the viewer's own user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Delete button for the product id.
    DeleteProduct(i64),
    /// Delete button for the user id.
    DeleteUser(i64),
    /// Delete button for the transaction id.
    DeleteTransaction(i64),
    /// "(you)" marker.
    SelfMarker,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Cells, one per header.
    pub cells: Vec<Cell>,
    /// Row affordance, if any.
    pub action: Option<RowAction>,
}

/// Headed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column titles.
    pub headers: Vec<String>,
    /// Never empty; an empty list becomes a placeholder instead.
    pub rows: Vec<Row>,
}

impl Table {
    /// Whether a column with this title exists.
    #[must_use]
    pub fn has_column(&self, header: &str) -> bool {
        self.headers.iter().any(|h| h == header)
    }

    /// Cell texts of one column, top to bottom.
    #[must_use]
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let index = self.headers.iter().position(|h| h == header)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.cells.get(index).map(|cell| cell.text.as_str()))
                .collect(),
        )
    }
}

/// Shop tile or storefront product tile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    /// Heading.
    pub title: String,
    /// Category badge.
    pub tag: Option<String>,
    /// Description.
    pub body: Option<String>,
    /// Formatted price.
    pub price: Option<String>,
    /// Stock status.
    pub status: Option<String>,
    /// External link, only offered for orderable products.
    pub link: Option<String>,
    /// Picture URL or placeholder image.
    pub image: Option<String>,
    /// Shop id a shop tile opens.
    pub opens: Option<i64>,
}

/// Emphasis of a stat card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Plain.
    Normal,
    /// Profit figure.
    Profit,
    /// Needs attention.
    Warning,
}

/// One aggregate figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    /// What the figure is.
    pub label: String,
    /// Formatted figure.
    pub value: String,
    /// Emphasis.
    pub tone: Tone,
}

/// Content of one container on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fragment {
    /// Never loaded.
    #[default]
    Unloaded,
    /// Loaded, nothing to show; carries the placeholder text.
    Empty(String),
    /// Rows with headers.
    Table(Table),
    /// Tiles.
    Cards(Vec<Card>),
    /// Aggregate figures.
    Stats(Vec<StatCard>),
    /// Label/value pairs.
    Details(Vec<(String, String)>),
}

impl Fragment {
    /// Loaded but empty, showing `placeholder`.
    pub fn empty(placeholder: impl Into<String>) -> Self {
        Self::Empty(placeholder.into())
    }

    /// The table, if this is one.
    #[must_use]
    pub const fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// The tiles, if these are tiles.
    #[must_use]
    pub fn as_cards(&self) -> Option<&[Card]> {
        match self {
            Self::Cards(cards) => Some(cards),
            _ => None,
        }
    }

    /// Placeholder text of an empty fragment.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Empty(text) => Some(text),
            _ => None,
        }
    }
}

/// Visibility of the navigation links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavBar {
    /// Login and register links.
    pub login: bool,
    /// Dashboard link.
    pub dashboard: bool,
    /// Logout link.
    pub logout: bool,
}

impl NavBar {
    /// Links offered with or without a session.
    #[must_use]
    pub const fn for_logged_in(logged_in: bool) -> Self {
        Self {
            login: !logged_in,
            dashboard: logged_in,
            logout: logged_in,
        }
    }
}

impl Default for NavBar {
    fn default() -> Self {
        Self::for_logged_in(false)
    }
}

/// Form overlays of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modal {
    /// Add or update a product.
    Product,
    /// Record a transaction.
    Transaction,
    /// Add or update a staff account.
    User,
}

/// Entry of the transaction form's product selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOption {
    /// Product id submitted on selection.
    pub id: i64,
    /// "name (Stock: n)" text.
    pub label: String,
}

/// Everything the terminal shows for one page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screen {
    /// Navigation links.
    pub nav: NavBar,
    /// "name (role)" banner of the dashboard.
    pub user_info: Option<String>,
    /// Users tab, `SuperAdmin` only.
    pub users_tab_visible: bool,
    /// Shop settings tab, `SuperAdmin` only.
    pub shop_tab_visible: bool,

    /// Public shop tiles.
    pub shops: Fragment,
    /// Name of the storefront being browsed.
    pub storefront_title: Option<String>,
    /// Product tiles of the storefront being browsed.
    pub storefront: Fragment,
    /// One product opened from the storefront or the products tab.
    pub product_detail: Fragment,

    /// Aggregate cards, or a role card for roles without access to them.
    pub stats: Fragment,
    /// Products tab.
    pub products: Fragment,
    /// Transactions tab.
    pub transactions: Fragment,
    /// Users tab.
    pub users: Fragment,
    /// Low-stock report under the products tab.
    pub low_stock: Fragment,
    /// Shop tab.
    pub shop_settings: Fragment,

    /// Modals currently open.
    pub modals: BTreeSet<Modal>,
    /// Product and quantity inputs of the transaction form, shown only for sales.
    pub sale_fields_visible: bool,
    /// Choices of the transaction form's product selector.
    pub product_options: Vec<ProductOption>,
}

impl Screen {
    /// Whether `modal` is open.
    #[must_use]
    pub fn is_open(&self, modal: Modal) -> bool {
        self.modals.contains(&modal)
    }
}
