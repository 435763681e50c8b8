//! Command-line interface. One invocation is one page load: the session persists between
//! runs, everything else is rebuilt.

use crate::{
    app::App,
    core::{FormFields, Kind, Section, Tab, Transport, forms::field},
    entities::TransactionType,
    errors::Result,
    ui::Modal,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Staff and storefront console for the shop API
#[derive(Debug, Parser)]
#[command(name = "shop-console", version)]
#[command(about = "Browse shop storefronts and manage your shop from the terminal")]
pub struct Cli {
    /// Settings file (defaults to $SHOP_CONSOLE_CONFIG, then shop-console.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// What to do; without one the public shop list is shown
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One page load worth of work.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List public shops
    Shops,
    /// Browse one shop's products
    Shop {
        /// Shop id, as listed by `shops`
        id: i64,
        /// Title to show instead of the name from the shop list
        #[arg(long)]
        name: Option<String>,
    },
    /// Log in and open the dashboard
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
    },
    /// Create a shop owner account
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the logged-in user as the server knows it
    Whoami,
    /// Open the dashboard
    Dashboard {
        /// products, transactions, users or shop
        #[arg(long, default_value = "products")]
        tab: Tab,
    },
    /// Show one product, from your shop or from a storefront with --shop
    Product {
        /// Product id
        id: i64,
        /// Read the product from this shop's public storefront instead
        #[arg(long)]
        shop: Option<i64>,
    },
    /// Add a product to your shop
    AddProduct(ProductArgs),
    /// Change the given fields of a product
    UpdateProduct {
        /// Product id
        id: i64,
        #[command(flatten)]
        fields: ProductUpdateArgs,
    },
    /// Delete a product
    DeleteProduct {
        /// Product id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Record a sale, expense or withdrawal
    #[command(visible_alias = "sell")]
    AddTransaction(TransactionArgs),
    /// Delete a transaction
    DeleteTransaction {
        /// Transaction id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Add a staff account to your shop
    AddUser(UserArgs),
    /// Change the given fields of a staff account
    UpdateUser {
        /// User id
        id: i64,
        #[command(flatten)]
        fields: UserUpdateArgs,
    },
    /// Delete a staff account other than your own
    DeleteUser {
        /// User id
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Products below the low-stock threshold
    LowStock,
    /// Show shop settings, or change them when any option is given
    ShopSettings(ShopSettingsArgs),
}

/// Fields of the registration form.
#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Your name
    #[arg(long)]
    pub name: String,
    /// Login email
    #[arg(long)]
    pub email: String,
    /// Login password
    #[arg(long)]
    pub password: String,
    /// SuperAdmin or Admin
    #[arg(long, default_value = "SuperAdmin")]
    pub role: String,
    /// Name of the shop to create
    #[arg(long)]
    pub shop: String,
    /// Number customers order through
    #[arg(long, default_value = "")]
    pub whatsapp: String,
}

/// Fields of the add-product form.
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product name
    #[arg(long)]
    pub name: String,
    /// Free text shown on the storefront
    #[arg(long, default_value = "")]
    pub description: String,
    /// Category tag
    #[arg(long, default_value = "")]
    pub category: String,
    /// Cost price
    #[arg(long)]
    pub purchase_price: String,
    /// Price customers pay
    #[arg(long)]
    pub selling_price: String,
    /// Units on hand
    #[arg(long)]
    pub stock: String,
    /// Picture shown on the storefront
    #[arg(long, default_value = "")]
    pub image_url: String,
}

/// Product fields to change; the rest are left as they are.
#[derive(Debug, Args)]
pub struct ProductUpdateArgs {
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New category
    #[arg(long)]
    pub category: Option<String>,
    /// New cost price
    #[arg(long)]
    pub purchase_price: Option<String>,
    /// New selling price
    #[arg(long)]
    pub selling_price: Option<String>,
    /// New stock count
    #[arg(long)]
    pub stock: Option<String>,
    /// New picture URL
    #[arg(long)]
    pub image_url: Option<String>,
}

/// Fields of the transaction form.
#[derive(Debug, Args)]
pub struct TransactionArgs {
    /// Sale, Expense or Withdrawal
    #[arg(long = "type", default_value = "Sale")]
    pub kind: TransactionType,
    /// Total amount
    #[arg(long)]
    pub amount: String,
    /// Product id, sales only
    #[arg(long)]
    pub product: Option<String>,
    /// Units sold, sales only
    #[arg(long)]
    pub quantity: Option<String>,
}

/// Fields of the add-user form.
#[derive(Debug, Args)]
pub struct UserArgs {
    /// Display name
    #[arg(long)]
    pub name: String,
    /// Login email
    #[arg(long)]
    pub email: String,
    /// Initial password
    #[arg(long)]
    pub password: String,
    /// SuperAdmin or Admin
    #[arg(long, default_value = "Admin")]
    pub role: String,
}

/// Account fields to change; the rest are left as they are.
#[derive(Debug, Args)]
pub struct UserUpdateArgs {
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    /// New login email
    #[arg(long)]
    pub email: Option<String>,
    /// New password
    #[arg(long)]
    pub password: Option<String>,
    /// SuperAdmin or Admin
    #[arg(long)]
    pub role: Option<String>,
}

/// Shop settings to change. With none given the settings are only shown.
#[derive(Debug, Args)]
pub struct ShopSettingsArgs {
    /// New shop name
    #[arg(long)]
    pub name: Option<String>,
    /// New order number
    #[arg(long)]
    pub whatsapp: Option<String>,
    /// `true` or `false`
    #[arg(long)]
    pub active: Option<String>,
}

impl ShopSettingsArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.whatsapp.is_none() && self.active.is_none()
    }
}

fn set_some(fields: &mut FormFields, id: &str, value: Option<String>) {
    if let Some(value) = value {
        fields.set(id, value);
    }
}

/// Asks before a destructive action; `Ok(false)` cancels it.
pub type Confirm<'a> = &'a mut (dyn FnMut(&str) -> Result<bool> + Send);

impl Command {
    /// Runs the command against `app`. Failures have already been shown on screen when this
    /// returns an error.
    ///
    /// # Errors
    /// Returns the error of the operation the command performs.
    pub async fn execute<T: Transport>(self, app: &mut App<T>, confirm: Confirm<'_>) -> Result<()> {
        app.check_auth();
        match self {
            Self::Shops => app.show_section(Section::Public).await,
            Self::Shop { id, name } => {
                app.show_section(Section::Public).await;
                app.open_storefront(id, name.as_deref()).await;
            }
            Self::Login { email, password } => {
                app.show_section(Section::Login).await;
                app.forms.login = FormFields::new()
                    .with(field::LOGIN_EMAIL, email)
                    .with(field::LOGIN_PASSWORD, password);
                app.submit_login().await?;
            }
            Self::Register(args) => {
                app.show_section(Section::Register).await;
                app.forms.register = FormFields::new()
                    .with(field::REG_NAME, args.name)
                    .with(field::REG_EMAIL, args.email)
                    .with(field::REG_PASSWORD, args.password)
                    .with(field::REG_ROLE, args.role)
                    .with(field::REG_SHOP, args.shop)
                    .with(field::REG_WHATSAPP, args.whatsapp);
                app.submit_register().await?;
            }
            Self::Logout => {
                app.logout();
                app.notifier_mut().notify("Logged out", Kind::Success);
            }
            Self::Whoami => {
                app.require_login()?;
                app.refresh_profile().await?;
                let banner = app.screen().user_info.clone().unwrap_or_default();
                app.notifier_mut()
                    .notify(format!("Logged in as {banner}"), Kind::Success);
            }
            Self::Dashboard { tab } => {
                enter_dashboard(app).await?;
                app.open_tab(tab)?;
                if tab == Tab::Shop {
                    app.load_shop_settings().await;
                }
            }
            Self::Product { id, shop: Some(shop_id) } => {
                app.show_section(Section::Public).await;
                app.open_storefront(shop_id, None).await;
                app.load_storefront_product(shop_id, id).await;
            }
            Self::Product { id, shop: None } => {
                enter_dashboard(app).await?;
                app.load_product_detail(id).await;
            }
            Self::AddProduct(args) => {
                enter_dashboard(app).await?;
                app.open_modal(Modal::Product);
                app.forms.product = FormFields::new()
                    .with(field::PROD_NAME, args.name)
                    .with(field::PROD_DESC, args.description)
                    .with(field::PROD_CATEGORY, args.category)
                    .with(field::PROD_PURCHASE, args.purchase_price)
                    .with(field::PROD_SELLING, args.selling_price)
                    .with(field::PROD_STOCK, args.stock)
                    .with(field::PROD_IMAGE, args.image_url);
                app.submit_product().await?;
            }
            Self::UpdateProduct { id, fields } => {
                enter_dashboard(app).await?;
                app.open_modal(Modal::Product);
                let form = &mut app.forms.product;
                set_some(form, field::PROD_NAME, fields.name);
                set_some(form, field::PROD_DESC, fields.description);
                set_some(form, field::PROD_CATEGORY, fields.category);
                set_some(form, field::PROD_PURCHASE, fields.purchase_price);
                set_some(form, field::PROD_SELLING, fields.selling_price);
                set_some(form, field::PROD_STOCK, fields.stock);
                set_some(form, field::PROD_IMAGE, fields.image_url);
                app.submit_product_update(id).await?;
            }
            Self::DeleteProduct { id, yes } => {
                app.require_login()?;
                if yes || confirm(&format!("Delete product #{id}?"))? {
                    enter_dashboard(app).await?;
                    app.delete_product(id).await?;
                } else {
                    cancelled(app);
                }
            }
            Self::AddTransaction(args) => {
                enter_dashboard(app).await?;
                app.open_tab(Tab::Transactions)?;
                app.open_transaction_modal().await;
                app.set_transaction_type(args.kind);
                let form = &mut app.forms.transaction;
                form.set(field::TRANS_AMOUNT, args.amount);
                set_some(form, field::TRANS_PRODUCT, args.product);
                set_some(form, field::TRANS_QUANTITY, args.quantity);
                app.submit_transaction().await?;
            }
            Self::DeleteTransaction { id, yes } => {
                app.require_login()?;
                if yes || confirm(&format!("Delete transaction #{id}?"))? {
                    enter_dashboard(app).await?;
                    app.open_tab(Tab::Transactions)?;
                    app.delete_transaction(id).await?;
                } else {
                    cancelled(app);
                }
            }
            Self::AddUser(args) => {
                enter_dashboard(app).await?;
                app.open_tab(Tab::Users)?;
                app.open_modal(Modal::User);
                app.forms.user = FormFields::new()
                    .with(field::USER_NAME, args.name)
                    .with(field::USER_EMAIL, args.email)
                    .with(field::USER_PASSWORD, args.password)
                    .with(field::USER_ROLE, args.role);
                app.submit_user().await?;
            }
            Self::UpdateUser { id, fields } => {
                enter_dashboard(app).await?;
                app.open_tab(Tab::Users)?;
                app.open_modal(Modal::User);
                let form = &mut app.forms.user;
                set_some(form, field::USER_NAME, fields.name);
                set_some(form, field::USER_EMAIL, fields.email);
                set_some(form, field::USER_PASSWORD, fields.password);
                set_some(form, field::USER_ROLE, fields.role);
                app.submit_user_update(id).await?;
            }
            Self::DeleteUser { id, yes } => {
                app.require_login()?;
                if yes || confirm(&format!("Delete user #{id}?"))? {
                    enter_dashboard(app).await?;
                    app.open_tab(Tab::Users)?;
                    app.delete_user(id).await?;
                } else {
                    cancelled(app);
                }
            }
            Self::LowStock => {
                enter_dashboard(app).await?;
                app.load_low_stock().await;
            }
            Self::ShopSettings(args) => {
                enter_dashboard(app).await?;
                app.open_tab(Tab::Shop)?;
                if args.is_empty() {
                    app.load_shop_settings().await;
                } else {
                    let form = &mut app.forms.shop;
                    set_some(form, field::SHOP_NAME, args.name);
                    set_some(form, field::SHOP_WHATSAPP, args.whatsapp);
                    set_some(form, field::SHOP_ACTIVE, args.active);
                    app.submit_shop_settings().await?;
                }
            }
        }
        Ok(())
    }
}

async fn enter_dashboard<T: Transport>(app: &mut App<T>) -> Result<()> {
    app.require_login()?;
    app.show_section(Section::Dashboard).await;
    Ok(())
}

fn cancelled<T: Transport>(app: &mut App<T>) {
    info!("Deletion cancelled");
    app.notifier_mut().notify("Cancelled", Kind::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Method,
        errors::Error,
        test_utils::{FakeTransport, admin, logged_in_app, super_admin, test_app},
    };
    use serde_json::json;

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["shop-console"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command.unwrap()
    }

    fn always(answer: bool) -> impl FnMut(&str) -> Result<bool> + Send {
        move |_| Ok(answer)
    }

    #[test]
    fn test_parses_global_config_and_alias() {
        let cli = Cli::try_parse_from([
            "shop-console",
            "sell",
            "--amount",
            "30",
            "--product",
            "4",
            "--quantity",
            "2",
            "--config",
            "other.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        match cli.command {
            Some(Command::AddTransaction(args)) => {
                assert_eq!(args.kind, TransactionType::Sale);
                assert_eq!(args.product.as_deref(), Some("4"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_tab() {
        assert!(Cli::try_parse_from(["shop-console", "dashboard", "--tab", "reports"]).is_err());
    }

    #[tokio::test]
    async fn test_expense_command_posts_without_product_keys() {
        let fake = FakeTransport::new();
        fake.on(Method::Post, "/transactions", 201, json!({}));
        let mut app = logged_in_app(&fake, &admin());

        parse(&["add-transaction", "--type", "Expense", "--amount", "80", "--product", "4"])
            .execute(&mut app, &mut always(true))
            .await
            .unwrap();

        let posted = fake
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post)
            .and_then(|r| r.body)
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&posted).unwrap();
        assert_eq!(body, json!({"type": "Expense", "amount": 80.0}));
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &super_admin());

        parse(&["delete-product", "5"])
            .execute(&mut app, &mut always(false))
            .await
            .unwrap();

        assert!(fake.requests().is_empty());
        assert_eq!(app.notifier().toasts()[0].message, "Cancelled");
    }

    #[tokio::test]
    async fn test_dashboard_command_requires_login() {
        let fake = FakeTransport::new();
        let (mut app, _) = test_app(&fake);

        let result = parse(&["dashboard"]).execute(&mut app, &mut always(true)).await;

        assert!(matches!(result, Err(Error::NotLoggedIn)));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_admin_cannot_add_users() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &admin());

        let result = parse(&[
            "add-user", "--name", "Bo", "--email", "bo@shop.test", "--password", "pw",
        ])
        .execute(&mut app, &mut always(true))
        .await;

        assert!(matches!(result, Err(Error::Forbidden { .. })));
        assert!(fake.requests().iter().all(|r| r.method == Method::Get));
    }

    #[tokio::test]
    async fn test_update_user_command_puts_given_fields() {
        let fake = FakeTransport::new();
        fake.on(Method::Put, "/users/8", 200, json!({}));
        let mut app = logged_in_app(&fake, &super_admin());

        parse(&["update-user", "8", "--name", "Bo Clerk"])
            .execute(&mut app, &mut always(true))
            .await
            .unwrap();

        let put = fake.requests().into_iter().find(|r| r.method == Method::Put).unwrap();
        assert!(put.url.ends_with("/users/8"));
        let body: serde_json::Value = serde_json::from_str(&put.body.unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Bo Clerk"}));
        assert_eq!(app.view().tab(), Tab::Users);
    }

    #[tokio::test]
    async fn test_admin_cannot_update_users() {
        let fake = FakeTransport::new();
        let mut app = logged_in_app(&fake, &admin());

        let result = parse(&["update-user", "1", "--role", "Admin"])
            .execute(&mut app, &mut always(true))
            .await;

        assert!(matches!(result, Err(Error::Forbidden { .. })));
        assert!(fake.requests().iter().all(|r| r.method == Method::Get));
    }

    #[tokio::test]
    async fn test_product_command_reads_storefront_without_login() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Get,
            "/public/3/products/9",
            200,
            json!({"product": {"id": 9, "name": "Phone", "selling_price": 1200, "stock": 2}}),
        );
        let (mut app, _) = test_app(&fake);

        parse(&["product", "9", "--shop", "3"])
            .execute(&mut app, &mut always(true))
            .await
            .unwrap();

        assert!(matches!(&app.screen().product_detail, crate::ui::Fragment::Details(_)));
        assert!(fake.requests().iter().all(|r| r.header("authorization").is_none()));
    }

    #[tokio::test]
    async fn test_product_command_without_shop_needs_login() {
        let fake = FakeTransport::new();
        let (mut app, _) = test_app(&fake);

        let result = parse(&["product", "9"]).execute(&mut app, &mut always(true)).await;

        assert!(matches!(result, Err(Error::NotLoggedIn)));
        assert!(fake.requests().is_empty());
    }
}
