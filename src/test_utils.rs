//! Shared test utilities for the console client.
//!
//! Provides a scripted [`FakeTransport`], user and product fixtures, and helpers that wire an
//! [`App`] to in-memory session storage.

use crate::{
    app::App,
    config::Settings,
    core::{HttpRequest, HttpResponse, MemoryStorage, Method, Transport, TransportError},
    entities::{Role, User},
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, VecDeque},
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};
use tracing_subscriber::EnvFilter;

/// Base URL every test client is configured with.
pub const TEST_API_URL: &str = "http://shop.test";

/// Routes tracing output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
enum Reply {
    Json(u16, Value),
    Raw(u16, String),
    Offline,
}

#[derive(Debug, Default)]
struct FakeState {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<HttpRequest>,
}

/// Scripted transport. Replies registered for a route are served in order and the last one
/// repeats; unknown routes answer `404 {"error": "not found"}`. Clones share the script and
/// the request log.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    /// Transport with no routes; every request gets a 404.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queues a JSON reply for `method` on `path` (relative to [`TEST_API_URL`]).
    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Reply::Json(status, body));
    }

    /// Queues a reply with a raw body, e.g. an empty one.
    pub fn on_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Reply::Raw(status, body.to_string()));
    }

    /// Simulates a network failure for the route.
    pub fn offline(&self, method: Method, path: &str) {
        self.push(method, path, Reply::Offline);
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .clone()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    /// Body of the most recent request, parsed.
    pub fn last_json_body(&self) -> Option<Value> {
        self.last_request()
            .and_then(|request| request.body)
            .and_then(|body| serde_json::from_str(&body).ok())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let path = request
            .url
            .strip_prefix(TEST_API_URL)
            .unwrap_or(&request.url)
            .to_string();
        let key = (request.method, path);
        state.requests.push(request);

        let reply = match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match reply {
            Some(Reply::Json(status, body)) => Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
            Some(Reply::Raw(status, body)) => Ok(HttpResponse { status, body }),
            Some(Reply::Offline) => Err(TransportError {
                message: "connection refused".to_string(),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: json!({"error": "not found"}).to_string(),
            }),
        }
    }
}

/// User of shop 2 with an email derived from `name`.
pub fn user_with(id: i64, name: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@shop.test", name.to_lowercase().replace(' ', ".")),
        role,
        shop_id: Some(2),
    }
}

/// Shop owner, id 1.
pub fn super_admin() -> User {
    user_with(1, "Sam Owner", Role::SuperAdmin)
}

/// Staff member of the same shop, id 2.
pub fn admin() -> User {
    user_with(2, "Lina Clerk", Role::Admin)
}

/// `user` as the API serializes it.
pub fn user_json(user: &User) -> Value {
    serde_json::to_value(user).unwrap_or(Value::Null)
}

/// Product as the private products endpoint returns it to a `SuperAdmin`.
pub fn product_json(id: i64, name: &str, purchase_price: f64, selling_price: f64, stock: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "category": "",
        "purchase_price": purchase_price,
        "selling_price": selling_price,
        "stock": stock,
    })
}

/// Settings pointing at [`TEST_API_URL`].
pub fn test_settings() -> Settings {
    Settings {
        api_url: TEST_API_URL.to_string(),
        session_path: PathBuf::from("unused-session.json"),
        ..Settings::default()
    }
}

/// Logged-out app over fresh in-memory storage. The storage handle is returned so a test can
/// build a second app over it, simulating a reload.
pub fn test_app(fake: &FakeTransport) -> (App<FakeTransport>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let app = App::new(test_settings(), fake.clone(), Arc::new(storage.clone()));
    (app, storage)
}

/// App whose session already holds `user`, as after a previous login.
pub fn logged_in_app(fake: &FakeTransport, user: &User) -> App<FakeTransport> {
    let (mut app, _) = test_app(fake);
    app.session().set("test-token", user);
    app.check_auth();
    app
}
