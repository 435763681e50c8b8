//! Form controllers and row actions.
//!
//! Every controller follows the same contract. On success it closes its modal, reloads the
//! affected fragments, raises a success toast and resets its form. On failure the error text
//! is shown as-is and the modal and field values are left untouched.

use super::{App, LOGIN_MESSAGE, REGISTER_MESSAGE};
use crate::{
    core::{Kind, Section, Transport, forms},
    entities::AuthResponse,
    errors::{Error, Result},
    ui::Modal,
};
use tracing::{info, warn};

impl<T: Transport> App<T> {
    /// Shows `err` as an error toast and hands it back.
    fn fail<R>(&mut self, action: &str, err: Error) -> Result<R> {
        warn!("{} failed: {}", action, err);
        self.expire_notifications();
        self.notifier.notify(err.to_string(), Kind::Error);
        Err(err)
    }

    fn succeed(&mut self, message: &str) {
        info!("{}", message);
        self.expire_notifications();
        self.notifier.notify(message, Kind::Success);
    }

    /// Stores the session of a successful login or registration and enters the dashboard.
    async fn start_session(&mut self, auth: AuthResponse, target: &str, message: &str) {
        self.session.set(&auth.token, &auth.user);
        self.check_auth();
        self.notifier.set_field_message(target, message, Kind::Success);
        info!(user_id = auth.user.id, role = %auth.user.role, "Session started");
        self.show_section(Section::Dashboard).await;
    }

    /// Logs in with the login form. On success the session is stored and the dashboard opens.
    ///
    /// # Errors
    /// Returns the server's rejection, shown inline under the login form.
    pub async fn submit_login(&mut self) -> Result<()> {
        let request = forms::login_request(&self.forms.login);
        match self.api.login(&request).await {
            Ok(auth) => {
                self.forms.login.reset();
                self.start_session(auth, LOGIN_MESSAGE, "Login successful").await;
                Ok(())
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                self.notifier
                    .set_field_message(LOGIN_MESSAGE, e.to_string(), Kind::Error);
                Err(e)
            }
        }
    }

    /// Creates a shop and its owner, then logs in as that owner.
    ///
    /// # Errors
    /// Returns a field or server error, shown inline under the registration form.
    pub async fn submit_register(&mut self) -> Result<()> {
        let result = match forms::register_request(&self.forms.register) {
            Ok(request) => self.api.register(&request).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(auth) => {
                self.forms.register.reset();
                self.start_session(auth, REGISTER_MESSAGE, "Registration successful")
                    .await;
                Ok(())
            }
            Err(e) => {
                warn!("Registration failed: {}", e);
                self.notifier
                    .set_field_message(REGISTER_MESSAGE, e.to_string(), Kind::Error);
                Err(e)
            }
        }
    }

    /// Adds the product in the product form.
    ///
    /// # Errors
    /// Returns an invalid-field or server error.
    pub async fn submit_product(&mut self) -> Result<()> {
        let product = match forms::new_product(&self.forms.product) {
            Ok(product) => product,
            Err(e) => return self.fail("Add product", e),
        };
        if let Err(e) = self.api.create_product(&product).await {
            return self.fail("Add product", e);
        }
        self.close_modal(Modal::Product);
        self.load_products().await;
        self.succeed("Product added successfully");
        self.forms.product.reset();
        Ok(())
    }

    /// Sends only the filled fields of the product form.
    ///
    /// # Errors
    /// Returns an invalid-field or server error.
    pub async fn submit_product_update(&mut self, id: i64) -> Result<()> {
        let update = match forms::product_update(&self.forms.product) {
            Ok(update) => update,
            Err(e) => return self.fail("Update product", e),
        };
        if let Err(e) = self.api.update_product(id, &update).await {
            return self.fail("Update product", e);
        }
        self.close_modal(Modal::Product);
        self.load_products().await;
        self.succeed("Product updated successfully");
        self.forms.product.reset();
        Ok(())
    }

    /// A transaction changes both the ledger and the aggregates, so both are reloaded.
    ///
    /// # Errors
    /// Returns an invalid-field or server error.
    pub async fn submit_transaction(&mut self) -> Result<()> {
        let transaction = match forms::new_transaction(&self.forms.transaction) {
            Ok(transaction) => transaction,
            Err(e) => return self.fail("Add transaction", e),
        };
        if let Err(e) = self.api.create_transaction(&transaction).await {
            return self.fail("Add transaction", e);
        }
        self.close_modal(Modal::Transaction);
        self.load_transactions().await;
        self.load_dashboard_stats().await;
        self.succeed("Transaction added successfully");
        self.forms.transaction.reset();
        Ok(())
    }

    /// Adds the staff account in the user form.
    ///
    /// # Errors
    /// Returns an invalid-field or server error.
    pub async fn submit_user(&mut self) -> Result<()> {
        let user = match forms::new_user(&self.forms.user) {
            Ok(user) => user,
            Err(e) => return self.fail("Add user", e),
        };
        if let Err(e) = self.api.create_user(&user).await {
            return self.fail("Add user", e);
        }
        self.close_modal(Modal::User);
        self.load_users().await;
        self.succeed("User added successfully");
        self.forms.user.reset();
        Ok(())
    }

    /// Sends only the filled fields of the user form.
    ///
    /// # Arguments
    /// * `id` - User to change; may be the logged-in user
    ///
    /// # Errors
    /// Returns an invalid-field or server error.
    pub async fn submit_user_update(&mut self, id: i64) -> Result<()> {
        let update = match forms::user_update(&self.forms.user) {
            Ok(update) => update,
            Err(e) => return self.fail("Update user", e),
        };
        if let Err(e) = self.api.update_user(id, &update).await {
            return self.fail("Update user", e);
        }
        self.close_modal(Modal::User);
        self.load_users().await;
        self.succeed("User updated successfully");
        self.forms.user.reset();
        Ok(())
    }

    /// Saves the filled fields of the shop form. The shop tab has no modal to close.
    ///
    /// # Errors
    /// Returns an invalid-field or server error.
    pub async fn submit_shop_settings(&mut self) -> Result<()> {
        let update = match forms::shop_update(&self.forms.shop) {
            Ok(update) => update,
            Err(e) => return self.fail("Save shop settings", e),
        };
        if let Err(e) = self.api.update_shop(&update).await {
            return self.fail("Save shop settings", e);
        }
        self.load_shop_settings().await;
        self.succeed("Shop settings saved");
        self.forms.shop.reset();
        Ok(())
    }

    /// Deletes a product. Confirmation is the caller's job.
    ///
    /// # Errors
    /// Returns the server's rejection.
    pub async fn delete_product(&mut self, id: i64) -> Result<()> {
        if let Err(e) = self.api.delete_product(id).await {
            return self.fail("Delete product", e);
        }
        self.load_products().await;
        self.succeed("Product deleted");
        Ok(())
    }

    /// Deletes a ledger entry and reloads the ledger and the aggregates.
    ///
    /// # Errors
    /// Returns the server's rejection.
    pub async fn delete_transaction(&mut self, id: i64) -> Result<()> {
        if let Err(e) = self.api.delete_transaction(id).await {
            return self.fail("Delete transaction", e);
        }
        self.load_transactions().await;
        self.load_dashboard_stats().await;
        self.succeed("Transaction deleted");
        Ok(())
    }

    /// Deletes a user. The logged-in user's own account is refused before any request.
    ///
    /// # Errors
    /// Returns [`Error::SelfDeletion`] or the server's rejection.
    pub async fn delete_user(&mut self, id: i64) -> Result<()> {
        if self.session.user().is_some_and(|user| user.id == id) {
            return self.fail("Delete user", Error::SelfDeletion);
        }
        if let Err(e) = self.api.delete_user(id).await {
            return self.fail("Delete user", e);
        }
        self.load_users().await;
        self.succeed("User deleted");
        Ok(())
    }

    /// Re-reads the logged-in user from the server and stores it with the current token.
    ///
    /// # Errors
    /// Returns [`Error::NotLoggedIn`] without a session, or the server's rejection.
    pub async fn refresh_profile(&mut self) -> Result<()> {
        let Some(token) = self.session.token() else {
            return self.fail("Refresh profile", Error::NotLoggedIn);
        };
        match self.api.me().await {
            Ok(user) => {
                self.session.set(&token, &user);
                self.check_auth();
                Ok(())
            }
            Err(e) => self.fail("Refresh profile", e),
        }
    }
}
