//! Application shell - wires the session, API client, router, screen and notifier together.
//!
//! [`App`] holds all in-memory state of one "page load". Loaders live in [`loaders`], form
//! submissions and delete actions in [`controllers`].

pub mod controllers;
pub mod loaders;

use crate::{
    config::Settings,
    core::{
        ApiClient, FormFields, Kind, Loader, Notifier, Section, SessionStore, Storage, Tab,
        Transport, ViewState, forms::field,
    },
    entities::{TransactionType, User},
    errors::{Error, Result},
    ui::{Fragment, Modal, NavBar, Screen},
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, warn};

/// Inline message target of the login form.
pub const LOGIN_MESSAGE: &str = "login-message";
/// Inline message target of the registration form.
pub const REGISTER_MESSAGE: &str = "register-message";

/// Input state of every form on screen.
#[derive(Debug, Clone, Default)]
pub struct Forms {
    /// Login section.
    pub login: FormFields,
    /// Registration section.
    pub register: FormFields,
    /// Product modal, shared by add and update.
    pub product: FormFields,
    /// Transaction modal.
    pub transaction: FormFields,
    /// User modal, shared by add and update.
    pub user: FormFields,
    /// Shop tab.
    pub shop: FormFields,
}

/// The console application over a transport `T`.
pub struct App<T> {
    settings: Settings,
    session: SessionStore,
    api: ApiClient<T>,
    view: ViewState,
    screen: Screen,
    notifier: Notifier,
    /// Form inputs, written by the interface layer before a submit.
    pub forms: Forms,
}

impl<T: Transport> App<T> {
    /// Builds a logged-out looking app; call [`App::check_auth`] or [`App::boot`] to pick up a
    /// stored session.
    ///
    /// # Arguments
    /// * `settings` - API URL and notification timeouts
    /// * `transport` - Carries the HTTP requests
    /// * `storage` - Where the session is persisted between runs
    pub fn new(settings: Settings, transport: T, storage: Arc<dyn Storage>) -> Self {
        let session = SessionStore::new(storage);
        let api = ApiClient::new(settings.api_url.clone(), transport, session.clone());
        let notifier = Notifier::new(settings.toast_timeout(), settings.message_timeout());
        Self {
            settings,
            session,
            api,
            view: ViewState::new(),
            screen: Screen::default(),
            notifier,
            forms: Forms::default(),
        }
    }

    /// Startup: derive the navigation from the stored session and load the public shop list.
    pub async fn boot(&mut self) {
        let logged_in = self.check_auth();
        debug!(logged_in, api_url = %self.settings.api_url, "Booting console");
        self.load_public_shops().await;
    }

    /// Refreshes the navigation affordances from the session. Returns whether a user is
    /// logged in.
    pub fn check_auth(&mut self) -> bool {
        let user = self.session.user();
        self.screen.nav = NavBar::for_logged_in(user.is_some());
        self.refresh_user_header(user.as_ref());
        user.is_some()
    }

    fn refresh_user_header(&mut self, user: Option<&User>) {
        self.screen.user_info = user.map(|u| format!("{} ({})", u.name, u.role));
        let super_admin = user.is_some_and(|u| u.role.is_super_admin());
        self.screen.users_tab_visible = super_admin;
        self.screen.shop_tab_visible = super_admin;
    }

    /// Drops toasts and inline messages whose display time is over.
    fn expire_notifications(&mut self) {
        self.notifier.sweep(Instant::now());
    }

    /// Activates a section and runs the loads it asks for.
    pub async fn show_section(&mut self, section: Section) {
        self.expire_notifications();
        let loaders = self.view.show_section(section, self.session.role());
        debug!(%section, ?loaders, "Section shown");
        if section == Section::Dashboard && !loaders.is_empty() {
            self.load_dashboard().await;
            return;
        }
        for loader in loaders {
            self.run_loader(loader).await;
        }
    }

    /// Selects a dashboard tab. Returns `false` when the tab is not offered to the current role.
    pub fn show_tab(&mut self, tab: Tab) -> bool {
        self.expire_notifications();
        let shown = self.view.show_tab(tab, self.session.role());
        if !shown {
            debug!(%tab, "Tab not available for the current role");
        }
        shown
    }

    /// Like [`App::show_tab`], but a refused tab is an error toast.
    ///
    /// # Errors
    /// Returns [`Error::Forbidden`] when the tab is not offered to the current role.
    pub fn open_tab(&mut self, tab: Tab) -> Result<()> {
        if self.show_tab(tab) {
            return Ok(());
        }
        let err = Error::Forbidden {
            what: format!("The {tab} tab"),
        };
        warn!("{}", err);
        self.notifier.notify(err.to_string(), Kind::Error);
        Err(err)
    }

    /// Opens a shop's storefront. Without a name the title is taken from the loaded shop list.
    pub async fn open_storefront(&mut self, shop_id: i64, shop_name: Option<&str>) {
        self.expire_notifications();
        let name = shop_name.map_or_else(|| self.known_shop_name(shop_id), str::to_string);
        self.view.open_storefront(shop_id, name.clone());
        self.load_shop_products(shop_id, &name).await;
    }

    fn known_shop_name(&self, shop_id: i64) -> String {
        self.screen
            .shops
            .as_cards()
            .and_then(|cards| cards.iter().find(|card| card.opens == Some(shop_id)))
            .map_or_else(|| format!("Shop #{shop_id}"), |card| card.title.clone())
    }

    /// Leaves a storefront for the shop list, reloading it.
    pub async fn back_to_shops(&mut self) {
        self.expire_notifications();
        self.screen.storefront_title = None;
        self.screen.product_detail = Fragment::Unloaded;
        for loader in self.view.back_to_shops() {
            self.run_loader(loader).await;
        }
    }

    /// Clears the session and returns to the home section.
    pub fn logout(&mut self) {
        self.session.clear();
        self.check_auth();
        self.view.show_section(Section::Home, None);
        info!("Logged out");
    }

    /// The logged-in user, or [`Error::NotLoggedIn`] surfaced as an error toast.
    ///
    /// # Errors
    /// Returns [`Error::NotLoggedIn`] when the session is empty.
    pub fn require_login(&mut self) -> Result<User> {
        match self.session.user() {
            Some(user) => Ok(user),
            None => {
                let err = Error::NotLoggedIn;
                warn!("{}", err);
                self.notifier.notify(err.to_string(), Kind::Error);
                Err(err)
            }
        }
    }

    /// Opens a modal with an empty form.
    pub fn open_modal(&mut self, modal: Modal) {
        self.expire_notifications();
        match modal {
            Modal::Product => self.forms.product.reset(),
            Modal::Transaction => self.forms.transaction.reset(),
            Modal::User => self.forms.user.reset(),
        }
        self.screen.modals.insert(modal);
    }

    /// Closes a modal. Its form keeps its values.
    pub fn close_modal(&mut self, modal: Modal) {
        self.screen.modals.remove(&modal);
    }

    /// Opens an empty transaction form set to a sale, with a fresh product selector.
    pub async fn open_transaction_modal(&mut self) {
        self.open_modal(Modal::Transaction);
        self.set_transaction_type(TransactionType::Sale);
        self.load_transaction_product_options().await;
    }

    /// Selects the transaction type; product and quantity inputs exist only for a sale.
    pub fn set_transaction_type(&mut self, kind: TransactionType) {
        self.forms.transaction.set(field::TRANS_TYPE, kind.as_str());
        self.screen.sale_fields_visible = kind.requires_product();
    }

    pub(crate) async fn run_loader(&mut self, loader: Loader) {
        match loader {
            Loader::PublicShops => self.load_public_shops().await,
            Loader::DashboardStats => self.load_dashboard_stats().await,
            Loader::Products => self.load_products().await,
            Loader::Transactions => self.load_transactions().await,
            Loader::Users => self.load_users().await,
        }
    }

    /// What the renderer shows.
    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Navigation state.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// Toasts and inline messages.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// For interface layers raising their own toasts.
    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Persisted token and user.
    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The API client, for calls no loader covers.
    #[must_use]
    pub const fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Settings the app was built with.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{MemoryStorage, Method, PublicView},
        test_utils::{FakeTransport, admin, logged_in_app, super_admin, test_app},
    };
    use serde_json::json;

    #[test]
    fn test_check_auth_reflects_session() {
        let fake = FakeTransport::new();
        let (mut app, _) = test_app(&fake);
        assert!(!app.check_auth());
        assert_eq!(app.screen().nav, NavBar::for_logged_in(false));

        app.session().set("tok", &super_admin());
        assert!(app.check_auth());
        let nav = app.screen().nav;
        assert!(nav.dashboard && nav.logout && !nav.login);
        assert_eq!(app.screen().user_info.as_deref(), Some("Sam Owner (SuperAdmin)"));
    }

    #[tokio::test]
    async fn test_admin_has_no_users_or_shop_affordance() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/products", 200, json!({"products": []}));
        fake.on(Method::Get, "/transactions", 200, json!({"transactions": []}));
        let mut app = logged_in_app(&fake, &admin());

        app.show_section(Section::Dashboard).await;

        assert!(!app.screen().users_tab_visible);
        assert!(!app.screen().shop_tab_visible);
        assert!(!app.show_tab(Tab::Users));
        assert_eq!(app.view().tab(), Tab::Products);
        // Neither the users list nor the aggregates were requested.
        let paths: Vec<_> = fake.requests().into_iter().map(|r| r.url).collect();
        assert!(paths.iter().all(|url| !url.ends_with("/users")));
        assert!(paths.iter().all(|url| !url.ends_with("/reports/dashboard")));
    }

    #[tokio::test]
    async fn test_boot_loads_public_shops() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/public/shops",
            200,
            json!({"shops": [{"id": 3, "name": "Corner Shop"}]}),
        );
        let (mut app, _) = test_app(&fake);

        app.boot().await;

        let cards = app.screen().shops.as_cards().unwrap();
        assert_eq!(cards[0].title, "Corner Shop");
        assert_eq!(cards[0].opens, Some(3));
    }

    #[tokio::test]
    async fn test_open_storefront_uses_loaded_shop_name() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/public/shops",
            200,
            json!({"shops": [{"id": 3, "name": "Corner Shop"}]}),
        );
        fake.on(Method::Get, "/public/3/products", 200, json!({"products": []}));
        let (mut app, _) = test_app(&fake);
        app.boot().await;

        app.open_storefront(3, None).await;

        assert_eq!(
            app.view().public_view(),
            &PublicView::ShopProducts {
                shop_id: 3,
                shop_name: "Corner Shop".to_string()
            }
        );
        assert_eq!(app.screen().storefront_title.as_deref(), Some("Corner Shop"));
        assert_eq!(
            app.screen().storefront.placeholder(),
            Some(crate::ui::views::NO_STOREFRONT_PRODUCTS)
        );
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_goes_home() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &admin());

        app.logout();

        assert!(!app.session().is_logged_in());
        assert_eq!(app.view().section(), Section::Home);
        assert!(app.screen().nav.login);
        assert_eq!(app.screen().user_info, None);
    }

    #[tokio::test]
    async fn test_transaction_modal_toggles_sale_fields() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/products",
            200,
            json!({"products": [{"id": 4, "name": "Widget", "selling_price": 15, "stock": 3}]}),
        );
        let mut app = logged_in_app(&fake, &admin());

        app.open_transaction_modal().await;
        assert!(app.screen().is_open(Modal::Transaction));
        assert!(app.screen().sale_fields_visible);
        assert_eq!(app.screen().product_options[0].label, "Widget (Stock: 3)");

        app.set_transaction_type(TransactionType::Expense);
        assert!(!app.screen().sale_fields_visible);
    }

    #[test]
    fn test_open_tab_refused_for_admin() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &admin());
        assert!(matches!(app.open_tab(Tab::Shop), Err(Error::Forbidden { .. })));
        assert_eq!(
            app.notifier().last_error(),
            Some("The shop tab is not available for your role")
        );
        assert!(app.open_tab(Tab::Transactions).is_ok());
    }

    #[test]
    fn test_require_login_raises_toast() {
        let fake = FakeTransport::new();
        let (mut app, _) = test_app(&fake);
        assert!(matches!(app.require_login(), Err(Error::NotLoggedIn)));
        assert_eq!(app.notifier().last_error(), Some("You must be logged in to do this"));
    }

    #[tokio::test]
    async fn test_opening_modal_clears_stale_values() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/products", 200, json!({"products": []}));
        let mut app = logged_in_app(&fake, &super_admin());
        app.forms.product.set(field::PROD_NAME, "Left over");
        app.forms.user.set(field::USER_EMAIL, "old@shop.test");
        app.forms.transaction = FormFields::new()
            .with(field::TRANS_TYPE, "Expense")
            .with(field::TRANS_AMOUNT, "99");

        app.open_modal(Modal::Product);
        app.open_modal(Modal::User);
        app.open_transaction_modal().await;

        assert!(app.forms.product.is_empty());
        assert!(app.forms.user.is_empty());
        assert_eq!(app.forms.transaction.value(field::TRANS_TYPE), "Sale");
        assert_eq!(app.forms.transaction.value(field::TRANS_AMOUNT), "");
        assert!(app.screen().sale_fields_visible);
    }

    #[tokio::test]
    async fn test_navigation_expires_old_toasts() {
        let fake = FakeTransport::new();
        let settings = Settings {
            toast_timeout_secs: 0,
            message_timeout_secs: 0,
            ..crate::test_utils::test_settings()
        };
        let mut app = App::new(settings, fake.clone(), Arc::new(MemoryStorage::new()));
        assert!(app.require_login().is_err());
        app.notifier_mut()
            .set_field_message(LOGIN_MESSAGE, "Wrong password", Kind::Error);
        assert_eq!(app.notifier().toasts().len(), 1);

        app.show_section(Section::Login).await;

        assert!(app.notifier().toasts().is_empty());
        assert!(app.notifier().field_message(LOGIN_MESSAGE).is_none());
    }

    #[tokio::test]
    async fn test_live_toasts_survive_navigation() {
        let fake = FakeTransport::new();
        let (mut app, _) = test_app(&fake);
        assert!(app.require_login().is_err());

        app.show_section(Section::Login).await;

        assert_eq!(app.notifier().last_error(), Some("You must be logged in to do this"));
    }
}
