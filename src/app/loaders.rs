//! Data loaders - one API call each, rendered into the matching screen fragment.
//!
//! A load captures a [`LoadTicket`] before its request and its result is applied only while
//! that ticket is current, so a late response never overwrites a newer view. A failed load
//! keeps whatever the fragment showed before and raises an error toast.

use super::App;
use crate::{
    core::{Kind, Transport, router::LoadTicket},
    entities::{
        DashboardStats, Product, ProductList, ShopList, ShopSettings, TransactionList, UserList,
    },
    errors::Result,
    ui::views,
};
use tracing::{debug, warn};

impl<T: Transport> App<T> {
    /// Passes a load result through the generation guard and the failure policy.
    fn accept<R>(&mut self, ticket: LoadTicket, what: &str, result: Result<R>) -> Option<R> {
        if !self.view.is_current(ticket) {
            debug!(what, "Discarding result of a superseded load");
            return None;
        }
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to load {}: {}", what, e);
                self.notifier.notify(e.to_string(), Kind::Error);
                None
            }
        }
    }

    /// Fills the public shop list.
    pub async fn load_public_shops(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.public_shops().await;
        if let Some(list) = self.accept::<ShopList>(ticket, "shops", result) {
            self.screen.shops = views::shop_cards(&list.shops);
        }
    }

    /// Fills a storefront.
    ///
    /// # Arguments
    /// * `shop_id` - Shop to browse
    /// * `shop_name` - Title shown above the products
    pub async fn load_shop_products(&mut self, shop_id: i64, shop_name: &str) {
        let ticket = self.view.begin_load();
        let result = self.api.public_products(shop_id).await;
        if let Some(list) = self.accept::<ProductList>(ticket, "storefront products", result) {
            self.screen.storefront_title = Some(shop_name.to_string());
            self.screen.storefront = views::storefront_cards(&list.products);
        }
    }

    /// Loads everything the dashboard shows. Requests run concurrently and are applied in a
    /// fixed order.
    pub async fn load_dashboard(&mut self) {
        let Some(user) = self.session.user() else {
            debug!("Dashboard requested while logged out");
            return;
        };
        self.refresh_user_header(Some(&user));
        let super_admin = user.role.is_super_admin();
        let ticket = self.view.begin_load();

        let api = &self.api;
        let (stats, products, transactions, users) = tokio::join!(
            async {
                if super_admin {
                    Some(api.dashboard().await)
                } else {
                    None
                }
            },
            api.products(),
            api.transactions(),
            async {
                if super_admin {
                    Some(api.users().await)
                } else {
                    None
                }
            },
        );

        match stats {
            Some(result) => self.apply_stats(ticket, result),
            None => self.screen.stats = views::role_card(user.role),
        }
        self.apply_products(ticket, products);
        self.apply_transactions(ticket, transactions);
        if let Some(result) = users {
            self.apply_users(ticket, result);
        }
    }

    /// Opens one storefront product. Public: no token is sent.
    ///
    /// # Arguments
    /// * `shop_id` - Shop whose storefront lists the product
    /// * `product_id` - Product to open
    pub async fn load_storefront_product(&mut self, shop_id: i64, product_id: i64) {
        let ticket = self.view.begin_load();
        let result = self.api.public_product(shop_id, product_id).await;
        if let Some(product) = self.accept::<Product>(ticket, "storefront product", result) {
            self.screen.product_detail = views::product_details(&product, None);
        }
    }

    /// Opens one product of the logged-in user's shop.
    pub async fn load_product_detail(&mut self, id: i64) {
        let role = self.session.role();
        let ticket = self.view.begin_load();
        let result = self.api.product(id).await;
        if let Some(product) = self.accept::<Product>(ticket, "product", result) {
            self.screen.product_detail = views::product_details(&product, role);
        }
    }

    /// Aggregates are shown only to a `SuperAdmin`; any other role gets a role card and no
    /// request is made.
    pub async fn load_dashboard_stats(&mut self) {
        match self.session.role() {
            None => {}
            Some(role) if !role.is_super_admin() => {
                self.screen.stats = views::role_card(role);
            }
            Some(_) => {
                let ticket = self.view.begin_load();
                let result = self.api.dashboard().await;
                self.apply_stats(ticket, result);
            }
        }
    }

    fn apply_stats(&mut self, ticket: LoadTicket, result: Result<DashboardStats>) {
        if let Some(stats) = self.accept(ticket, "dashboard stats", result) {
            self.screen.stats = views::stats_cards(&stats);
        }
    }

    /// Fills the products tab.
    pub async fn load_products(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.products().await;
        self.apply_products(ticket, result);
    }

    fn apply_products(&mut self, ticket: LoadTicket, result: Result<ProductList>) {
        let role = self.session.role();
        if let Some(list) = self.accept(ticket, "products", result) {
            self.screen.products = views::products_table(&list.products, role);
        }
    }

    /// Fills the transactions tab.
    pub async fn load_transactions(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.transactions().await;
        self.apply_transactions(ticket, result);
    }

    fn apply_transactions(&mut self, ticket: LoadTicket, result: Result<TransactionList>) {
        if let Some(list) = self.accept(ticket, "transactions", result) {
            self.screen.transactions = views::transactions_table(&list.transactions);
        }
    }

    /// Fills the users tab; the viewer's own row gets a marker.
    pub async fn load_users(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.users().await;
        self.apply_users(ticket, result);
    }

    fn apply_users(&mut self, ticket: LoadTicket, result: Result<UserList>) {
        let current_user_id = self.session.user().map(|user| user.id);
        if let Some(list) = self.accept(ticket, "users", result) {
            self.screen.users = views::users_table(&list.users, current_user_id);
        }
    }

    /// Fills the low-stock report.
    pub async fn load_low_stock(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.low_stock_products().await;
        if let Some(list) = self.accept::<ProductList>(ticket, "low-stock report", result) {
            self.screen.low_stock = views::low_stock_table(&list.products);
        }
    }

    /// Fills the shop tab.
    pub async fn load_shop_settings(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.shop().await;
        if let Some(shop) = self.accept::<ShopSettings>(ticket, "shop settings", result) {
            self.screen.shop_settings = views::shop_details(&shop);
        }
    }

    /// Fills the product selector of the transaction form.
    pub async fn load_transaction_product_options(&mut self) {
        let ticket = self.view.begin_load();
        let result = self.api.products().await;
        if let Some(list) = self.accept::<ProductList>(ticket, "product options", result) {
            self.screen.product_options = views::product_options(&list.products);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::{Method, Section},
        entities::ProductList,
        errors::CONNECTION_ERROR_MESSAGE,
        test_utils::{FakeTransport, admin, init_test_tracing, logged_in_app, product_json, super_admin, test_app},
        ui::{Fragment, Tone, views},
    };
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_products_render_placeholder() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/products", 200, json!({"products": []}));
        let mut app = logged_in_app(&fake, &super_admin());

        app.load_products().await;

        assert_eq!(app.screen().products.placeholder(), Some(views::NO_PRODUCTS));
        assert!(app.screen().products.as_table().is_none());
    }

    #[tokio::test]
    async fn test_null_list_renders_placeholder() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/transactions", 200, json!({"transactions": null}));
        let mut app = logged_in_app(&fake, &admin());

        app.load_transactions().await;

        assert_eq!(app.screen().transactions.placeholder(), Some(views::NO_TRANSACTIONS));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_prior_content_and_notifies() {
        init_test_tracing();
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/products",
            200,
            json!({"products": [product_json(1, "Widget", 10.0, 15.0, 3)]}),
        );
        fake.offline(Method::Get, "/products");
        let mut app = logged_in_app(&fake, &admin());

        app.load_products().await;
        let before = app.screen().products.clone();
        assert!(before.as_table().is_some());

        app.load_products().await;
        assert_eq!(app.screen().products, before);
        assert_eq!(app.notifier().last_error(), Some(CONNECTION_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_superseded_result_is_discarded() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &admin());
        let ticket = app.view.begin_load();

        app.view.show_section(Section::Public, None);
        let stale: ProductList =
            serde_json::from_value(json!({"products": [product_json(1, "Old", 1.0, 2.0, 9)]}))
                .unwrap();
        app.apply_products(ticket, Ok(stale));

        assert_eq!(app.screen().products, Fragment::Unloaded);
    }

    #[tokio::test]
    async fn test_admin_stats_show_role_without_request() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &admin());

        app.load_dashboard_stats().await;

        match &app.screen().stats {
            Fragment::Stats(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].value, "Admin");
            }
            other => panic!("expected stats, got {other:?}"),
        }
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_super_admin_dashboard_loads_everything() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/reports/dashboard",
            200,
            json!({"dashboard": {
                "total_sales": 1500, "total_expenses": 200, "net_profit": 1300,
                "total_products": 4, "low_stock_products": 1,
                "transactions": {"total": 12}
            }}),
        );
        fake.on(Method::Get, "/products", 200, json!({"products": []}));
        fake.on(Method::Get, "/transactions", 200, json!({"transactions": []}));
        fake.on(
            Method::Get,
            "/users",
            200,
            json!({"users": [{"id": 1, "name": "Sam Owner", "email": "sam@shop.test", "role": "SuperAdmin"}]}),
        );
        let mut app = logged_in_app(&fake, &super_admin());

        app.show_section(Section::Dashboard).await;

        match &app.screen().stats {
            Fragment::Stats(cards) => {
                assert_eq!(cards[0].value, "1,500 DH");
                assert!(cards.iter().any(|c| c.tone == Tone::Profit && c.value == "1,300 DH"));
            }
            other => panic!("expected stats, got {other:?}"),
        }
        assert!(app.screen().users.as_table().is_some());
        assert!(app.screen().users_tab_visible);
        assert_eq!(fake.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_public_shops_placeholder_when_none() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/public/shops", 200, json!({"shops": []}));
        let (mut app, _) = test_app(&fake);

        app.load_public_shops().await;

        assert_eq!(app.screen().shops.placeholder(), Some(views::NO_SHOPS));
    }

    #[tokio::test]
    async fn test_shop_settings_rendered_as_details() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/shop",
            200,
            json!({"shop": {"id": 2, "name": "Corner Shop", "whatsapp_number": "212600000000", "active": true}}),
        );
        let mut app = logged_in_app(&fake, &super_admin());

        app.load_shop_settings().await;

        assert_eq!(
            app.screen().shop_settings,
            Fragment::Details(vec![
                ("Name".to_string(), "Corner Shop".to_string()),
                ("WhatsApp".to_string(), "212600000000".to_string()),
                ("Status".to_string(), "Active".to_string()),
            ])
        );
    }

    #[tokio::test]
    async fn test_product_detail_uses_private_endpoint() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/products/4",
            200,
            json!({"product": product_json(4, "Widget", 10.0, 15.0, 12)}),
        );
        let mut app = logged_in_app(&fake, &super_admin());

        app.load_product_detail(4).await;

        match &app.screen().product_detail {
            Fragment::Details(pairs) => {
                assert_eq!(pairs[0], ("Name".to_string(), "Widget".to_string()));
                assert!(pairs.contains(&(views::PURCHASE_PRICE_HEADER.to_string(), "10 DH".to_string())));
                assert!(pairs.contains(&("Stock".to_string(), "12".to_string())));
            }
            other => panic!("expected details, got {other:?}"),
        }
        let sent = fake.last_request().unwrap();
        assert_eq!(sent.header("authorization"), Some("Bearer test-token"));
    }

    #[tokio::test]
    async fn test_storefront_product_is_public_and_offers_order_link() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/public/3/products/9",
            200,
            json!({"product": {
                "id": 9, "name": "Phone", "selling_price": 1200, "stock": 2,
                "in_stock": true, "whatsapp_link": "https://wa.me/2126?text=Phone"
            }}),
        );
        let (mut app, _) = test_app(&fake);

        app.load_storefront_product(3, 9).await;

        match &app.screen().product_detail {
            Fragment::Details(pairs) => {
                assert!(pairs.contains(&("Selling price".to_string(), "1,200 DH".to_string())));
                assert!(pairs.contains(&("Order".to_string(), "https://wa.me/2126?text=Phone".to_string())));
            }
            other => panic!("expected details, got {other:?}"),
        }
        assert_eq!(fake.last_request().unwrap().header("authorization"), None);
    }

    #[tokio::test]
    async fn test_missing_product_keeps_detail_and_shows_server_error() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/products/77", 404, json!({"error": "Product not found"}));
        let mut app = logged_in_app(&fake, &admin());

        app.load_product_detail(77).await;

        assert_eq!(app.screen().product_detail, Fragment::Unloaded);
        assert_eq!(app.notifier().last_error(), Some("Product not found"));
    }
}
