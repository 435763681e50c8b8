//! API client - the one uniform way every loader and form talks to the shop API.
//!
//! [`ApiClient::request`] never fails: both server-reported errors and transport failures come
//! back as an [`ApiResponse`] value with `ok == false`. The typed operations below it convert
//! that value into a crate [`Result`] so call sites can use `?` and `match` uniformly.

use super::{
    session::SessionStore,
    transport::{HttpRequest, Method, Transport},
};
use crate::{
    entities::{
        AuthResponse, DashboardEnvelope, DashboardStats, LoginRequest, NewProduct, NewTransaction,
        NewUser, Product, ProductEnvelope, ProductList, ProductUpdate, ProfileEnvelope,
        RegisterRequest, ShopEnvelope, ShopList, ShopSettings, ShopUpdate, TransactionList, User,
        UserList, UserUpdate,
    },
    errors::{CONNECTION_ERROR_MESSAGE, Error, Result},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

/// Why a request did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with a non-2xx status.
    Server,
    /// No response was received.
    Connection,
}

/// Normalized outcome of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Status was 2xx.
    pub ok: bool,
    /// HTTP status, `0` when no response was received.
    pub status: u16,
    /// Parsed JSON body, `Value::Null` when the body was empty or not JSON.
    pub data: Value,
    /// Set exactly when `ok` is false.
    pub failure: Option<FailureKind>,
}

impl ApiResponse {
    fn connection_failure() -> Self {
        Self {
            ok: false,
            status: 0,
            data: Value::Null,
            failure: Some(FailureKind::Connection),
        }
    }

    /// User-facing message for a failed call; `None` on success.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self.failure? {
            FailureKind::Connection => Some(CONNECTION_ERROR_MESSAGE.to_string()),
            FailureKind::Server => Some(
                self.data
                    .get("error")
                    .and_then(Value::as_str)
                    .map_or_else(
                        || format!("Request failed with status {}", self.status),
                        str::to_string,
                    ),
            ),
        }
    }

    /// Converts a failed outcome into the matching [`Error`].
    fn failure_error(&self) -> Option<Error> {
        match self.failure? {
            FailureKind::Connection => Some(Error::Connection),
            FailureKind::Server => Some(Error::Api {
                status: self.status,
                message: self.error_message().unwrap_or_default(),
            }),
        }
    }

    /// Succeeds when the call was 2xx, ignoring the body.
    ///
    /// # Errors
    /// Returns [`Error::Api`] or [`Error::Connection`] for failed calls.
    pub fn ensure_ok(&self) -> Result<()> {
        self.failure_error().map_or(Ok(()), Err)
    }

    /// Decodes the body of a successful call.
    ///
    /// # Errors
    /// Returns the failure of an unsuccessful call, or [`Error::Decode`] when a 2xx body does
    /// not have the expected shape.
    pub fn into_result<R: DeserializeOwned>(self) -> Result<R> {
        self.ensure_ok()?;
        serde_json::from_value(self.data).map_err(|e| Error::Decode {
            message: e.to_string(),
        })
    }
}

/// Client for the shop API, reading the bearer token from the session on every call.
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
    session: SessionStore,
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client. A trailing slash on `base_url` is dropped.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `http://localhost:8080`
    /// * `transport` - Carries the requests
    /// * `session` - Source of the bearer token
    pub fn new(base_url: impl Into<String>, transport: T, session: SessionStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            session,
        }
    }

    /// API root without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one JSON request.
    ///
    /// `Content-Type: application/json` is always sent. `Authorization: Bearer <token>` is added
    /// only when `authenticated` is set and the session holds a token.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authenticated: bool,
    ) -> ApiResponse {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if authenticated {
            if let Some(token) = self.session.token() {
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            }
        }

        let request = HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body: body.map(Value::to_string),
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} {} failed without a response: {}", method, path, e);
                return ApiResponse::connection_failure();
            }
        };

        let data = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).unwrap_or_else(|e| {
                debug!("{} {} returned a non-JSON body: {}", method, path, e);
                Value::Null
            })
        };
        let ok = (200..300).contains(&response.status);
        debug!(%method, path, status = response.status, ok, "API call finished");

        ApiResponse {
            ok,
            status: response.status,
            data,
            failure: (!ok).then_some(FailureKind::Server),
        }
    }

    async fn fetch<R: DeserializeOwned>(&self, path: &str, authenticated: bool) -> Result<R> {
        self.request(Method::Get, path, None, authenticated)
            .await
            .into_result()
    }

    async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        authenticated: bool,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(method, path, Some(&body), authenticated)
            .await
            .into_result()
    }

    async fn send_and_check<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.request(method, path, Some(&body), true)
            .await
            .ensure_ok()
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::Delete, path, None, true)
            .await
            .ensure_ok()
    }

    // --- Authentication (unauthenticated calls) ---

    /// `POST /login`. Sent without a token.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        self.send_json(Method::Post, "/login", request, false).await
    }

    /// `POST /register`. Creates a shop and its owner. Sent without a token.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.send_json(Method::Post, "/register", request, false)
            .await
    }

    /// `GET /me`: the logged-in user as the server currently knows it.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn me(&self) -> Result<User> {
        self.fetch::<ProfileEnvelope>("/me", true)
            .await
            .map(|envelope| envelope.user)
    }

    // --- Public storefront ---

    /// `GET /public/shops`.
    pub async fn public_shops(&self) -> Result<ShopList> {
        self.fetch("/public/shops", false).await
    }

    /// `GET /public/{shop_id}/products`: a storefront, without purchase prices.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn public_products(&self, shop_id: i64) -> Result<ProductList> {
        self.fetch(&format!("/public/{shop_id}/products"), false)
            .await
    }

    /// One storefront product.
    ///
    /// # Arguments
    /// * `shop_id` - Shop the storefront belongs to
    /// * `product_id` - Product within that shop
    ///
    /// # Errors
    /// Returns the server's rejection (404 for an unknown product) or a connection error.
    pub async fn public_product(&self, shop_id: i64, product_id: i64) -> Result<Product> {
        self.fetch::<ProductEnvelope>(&format!("/public/{shop_id}/products/{product_id}"), false)
            .await
            .map(|envelope| envelope.product)
    }

    // --- Products ---

    /// `GET /products` of the caller's shop. Purchase prices are present for a `SuperAdmin`.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn products(&self) -> Result<ProductList> {
        self.fetch("/products", true).await
    }

    /// `GET /products/{id}`.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn product(&self, id: i64) -> Result<Product> {
        self.fetch::<ProductEnvelope>(&format!("/products/{id}"), true)
            .await
            .map(|envelope| envelope.product)
    }

    /// Creates a product. The created record is not needed by callers, who reload the list.
    pub async fn create_product(&self, product: &NewProduct) -> Result<()> {
        self.send_and_check(Method::Post, "/products", product)
            .await
    }

    /// `PUT /products/{id}` with only the fields set in `update`.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn update_product(&self, id: i64, update: &ProductUpdate) -> Result<()> {
        self.send_and_check(Method::Put, &format!("/products/{id}"), update)
            .await
    }

    /// `DELETE /products/{id}`.
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.delete(&format!("/products/{id}")).await
    }

    /// `GET /reports/low-stock`.
    pub async fn low_stock_products(&self) -> Result<ProductList> {
        self.fetch("/reports/low-stock", true).await
    }

    // --- Transactions ---

    /// `GET /transactions`, newest first as the server orders them.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn transactions(&self) -> Result<TransactionList> {
        self.fetch("/transactions", true).await
    }

    /// `POST /transactions`. The server adjusts stock for a sale.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn create_transaction(&self, transaction: &NewTransaction) -> Result<()> {
        self.send_and_check(Method::Post, "/transactions", transaction)
            .await
    }

    /// `DELETE /transactions/{id}`.
    pub async fn delete_transaction(&self, id: i64) -> Result<()> {
        self.delete(&format!("/transactions/{id}")).await
    }

    // --- Users ---

    /// `GET /users` of the caller's shop. `SuperAdmin` only.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn users(&self) -> Result<UserList> {
        self.fetch("/users", true).await
    }

    /// `POST /users`.
    pub async fn create_user(&self, user: &NewUser) -> Result<()> {
        self.send_and_check(Method::Post, "/users", user).await
    }

    /// Changes a staff account.
    ///
    /// # Arguments
    /// * `id` - User to change
    /// * `update` - Fields to change; unset fields are not sent
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<()> {
        self.send_and_check(Method::Put, &format!("/users/{id}"), update)
            .await
    }

    /// `DELETE /users/{id}`.
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.delete(&format!("/users/{id}")).await
    }

    // --- Reports and shop settings ---

    /// `GET /reports/dashboard`: financial aggregates, `SuperAdmin` only.
    ///
    /// # Errors
    /// Returns the server's rejection, a connection error, or [`Error::Decode`] for an unexpected body.
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        self.fetch::<DashboardEnvelope>("/reports/dashboard", true)
            .await
            .map(|envelope| envelope.dashboard)
    }

    /// `GET /shop`: settings of the caller's shop.
    ///
    /// # Errors
    /// Returns the server's rejection or a connection error.
    pub async fn shop(&self) -> Result<ShopSettings> {
        self.fetch::<ShopEnvelope>("/shop", true)
            .await
            .map(|envelope| envelope.shop)
    }

    /// `PUT /shop`.
    pub async fn update_shop(&self, update: &ShopUpdate) -> Result<()> {
        self.send_and_check(Method::Put, "/shop", update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::session::MemoryStorage,
        entities::{Role, TransactionType},
        test_utils::{FakeTransport, TEST_API_URL, admin, init_test_tracing},
    };
    use serde_json::json;
    use std::sync::Arc;

    fn client(fake: &FakeTransport) -> (ApiClient<FakeTransport>, SessionStore) {
        let session = SessionStore::new(Arc::new(MemoryStorage::new()));
        let client = ApiClient::new(
            format!("{TEST_API_URL}/"),
            fake.clone(),
            session.clone(),
        );
        (client, session)
    }

    #[tokio::test]
    async fn test_content_type_always_sent_and_no_auth_when_logged_out() {
        init_test_tracing();
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/products", 200, json!({"products": []}));
        let (client, _) = client(&fake);

        let response = client.request(Method::Get, "/products", None, true).await;

        assert!(response.ok);
        let sent = fake.last_request().unwrap();
        assert_eq!(sent.url, format!("{TEST_API_URL}/products"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_bearer_header_only_when_authenticated() {
        init_test_tracing();
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/public/shops", 200, json!({"shops": []}));
        fake.on(Method::Get, "/products", 200, json!({"products": []}));
        let (client, session) = client(&fake);
        session.set("secret-token", &admin());

        client.public_shops().await.unwrap();
        let public = fake.last_request().unwrap();
        assert_eq!(public.header("authorization"), None);

        client.products().await.unwrap();
        let private = fake.last_request().unwrap();
        assert_eq!(private.header("Authorization"), Some("Bearer secret-token"));
    }

    #[tokio::test]
    async fn test_body_serialized_as_json() {
        let fake = FakeTransport::new();
        fake.on(Method::Post, "/transactions", 201, json!({"id": 9}));
        let (client, _) = client(&fake);

        client
            .create_transaction(&NewTransaction {
                kind: TransactionType::Withdrawal,
                amount: 25.0,
                product_id: None,
                quantity: None,
            })
            .await
            .unwrap();

        let body = fake.last_json_body().unwrap();
        assert_eq!(body, json!({"type": "Withdrawal", "amount": 25.0}));
    }

    #[tokio::test]
    async fn test_non_2xx_carries_server_error_verbatim() {
        let fake = FakeTransport::new();
        fake.on(Method::Post, "/login", 401, json!({"error": "Bad credentials"}));
        let (client, _) = client(&fake);

        let response = client
            .request(Method::Post, "/login", Some(&json!({})), false)
            .await;
        assert!(!response.ok);
        assert_eq!(response.status, 401);
        assert_eq!(response.failure, Some(FailureKind::Server));
        assert_eq!(response.error_message().as_deref(), Some("Bad credentials"));

        let typed = client
            .login(&LoginRequest {
                email: "a@b.c".to_string(),
                password: "x".to_string(),
            })
            .await;
        match typed {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_body_falls_back_to_status() {
        let fake = FakeTransport::new();
        fake.on_raw(Method::Delete, "/products/3", 500, "");
        let (client, _) = client(&fake);

        let err = client.delete_product(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[tokio::test]
    async fn test_transport_failure_is_connection_error_value() {
        init_test_tracing();
        let fake = FakeTransport::new();
        fake.offline(Method::Get, "/users");
        let (client, _) = client(&fake);

        let response = client.request(Method::Get, "/users", None, true).await;
        assert!(!response.ok);
        assert_eq!(response.status, 0);
        assert_eq!(response.failure, Some(FailureKind::Connection));
        assert_eq!(
            response.error_message().as_deref(),
            Some(CONNECTION_ERROR_MESSAGE)
        );

        let typed = client.users().await.unwrap_err();
        assert!(typed.is_connection());
        assert_eq!(typed.to_string(), CONNECTION_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_success_body() {
        let fake = FakeTransport::new();
        fake.on_raw(Method::Delete, "/users/4", 204, "");
        let (client, _) = client(&fake);

        client.delete_user(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_login_decodes_token_and_user() {
        let fake = FakeTransport::new();
        fake.on(
            Method::Post,
            "/login",
            200,
            json!({"token": "t", "user": {"id": 7, "name": "Sam", "email": "sam@shop.test", "role": "SuperAdmin", "shop_id": 2}}),
        );
        let (client, _) = client(&fake);

        let auth = client
            .login(&LoginRequest {
                email: "sam@shop.test".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(auth.token, "t");
        assert_eq!(auth.user.role, Role::SuperAdmin);
        assert_eq!(auth.user.shop_id, Some(2));
    }

    #[tokio::test]
    async fn test_unexpected_success_shape_is_decode_error() {
        let fake = FakeTransport::new();
        fake.on(Method::Get, "/reports/dashboard", 200, json!({"stats": {}}));
        let (client, _) = client(&fake);

        assert!(matches!(
            client.dashboard().await,
            Err(Error::Decode { .. })
        ));
    }
}
