//! View router - explicit navigation state.
//!
//! [`ViewState`] is the only record of which section, tab and storefront view are active; the
//! screen is a projection of it. Switching sections reports which loaders must run, switching
//! tabs never does.

use crate::entities::Role;
use std::{fmt, str::FromStr};

/// Mutually exclusive top-level sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    /// Landing page.
    #[default]
    Home,
    /// Shop list and storefronts.
    Public,
    /// Login form.
    Login,
    /// Registration form.
    Register,
    /// Staff dashboard; needs a session.
    Dashboard,
}

impl Section {
    /// Lower-case name, also used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Public => "public",
            Self::Login => "login",
            Self::Register => "register",
            Self::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tabs nested inside the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Product table and low-stock report.
    #[default]
    Products,
    /// Ledger.
    Transactions,
    /// Staff accounts, `SuperAdmin` only.
    Users,
    /// Shop settings, `SuperAdmin` only.
    Shop,
}

impl Tab {
    /// Lower-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Transactions => "transactions",
            Self::Users => "users",
            Self::Shop => "shop",
        }
    }

    /// Tabs whose affordance is only offered to a `SuperAdmin`.
    #[must_use]
    pub const fn requires_super_admin(self) -> bool {
        matches!(self, Self::Users | Self::Shop)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" => Ok(Self::Products),
            "transactions" => Ok(Self::Transactions),
            "users" => Ok(Self::Users),
            "shop" => Ok(Self::Shop),
            other => Err(format!("unknown tab '{other}'")),
        }
    }
}

/// What the public section currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PublicView {
    /// All shops.
    #[default]
    ShopList,
    /// One storefront.
    ShopProducts {
        /// Shop being browsed.
        shop_id: i64,
        /// Title shown above the products.
        shop_name: String,
    },
}

/// Data loads a navigation step asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loader {
    /// Public shop list.
    PublicShops,
    /// Aggregates or role card.
    DashboardStats,
    /// Product table.
    Products,
    /// Ledger.
    Transactions,
    /// Staff accounts.
    Users,
}

/// Token captured when a load starts; stale tokens mark superseded results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Active section, tab and storefront, plus the load generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    section: Section,
    tab: Tab,
    public_view: PublicView,
    generation: u64,
}

impl ViewState {
    /// Starts on the home section.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Active section.
    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }

    /// Active dashboard tab, kept while other sections are shown.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    /// What the public section shows.
    #[must_use]
    pub const fn public_view(&self) -> &PublicView {
        &self.public_view
    }

    /// Activates `section` and returns the loaders to run once for it.
    ///
    /// `role` is the logged-in user's role, `None` when logged out. The dashboard loads nothing
    /// while logged out, and loads users only for a `SuperAdmin`.
    pub fn show_section(&mut self, section: Section, role: Option<Role>) -> Vec<Loader> {
        self.section = section;
        self.generation += 1;
        match (section, role) {
            (Section::Dashboard, Some(role)) => {
                let mut loaders = vec![Loader::DashboardStats, Loader::Products, Loader::Transactions];
                if role.is_super_admin() {
                    loaders.push(Loader::Users);
                }
                loaders
            }
            (Section::Public, _) => {
                self.public_view = PublicView::ShopList;
                vec![Loader::PublicShops]
            }
            _ => Vec::new(),
        }
    }

    /// Selects a dashboard tab. Returns `false`, leaving the tab unchanged, when the tab is not
    /// offered to `role`.
    pub fn show_tab(&mut self, tab: Tab, role: Option<Role>) -> bool {
        if tab.requires_super_admin() && !role.is_some_and(Role::is_super_admin) {
            return false;
        }
        self.tab = tab;
        true
    }

    /// Drills into one shop's storefront inside the public section.
    pub fn open_storefront(&mut self, shop_id: i64, shop_name: impl Into<String>) {
        self.section = Section::Public;
        self.public_view = PublicView::ShopProducts {
            shop_id,
            shop_name: shop_name.into(),
        };
        self.generation += 1;
    }

    /// Returns from a storefront to the shop list, which is reloaded.
    pub fn back_to_shops(&mut self) -> Vec<Loader> {
        self.show_section(Section::Public, None)
    }

    /// Starts a load bound to the current navigation generation.
    #[must_use]
    pub const fn begin_load(&self) -> LoadTicket {
        LoadTicket(self.generation)
    }

    /// Whether a load started with `ticket` still belongs to the visible view.
    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}
