//! Core client logic - framework-agnostic session, API, navigation, notification and form
//! handling. Nothing here knows how the screen is drawn.

/// Uniform JSON request wrapper and typed API operations
pub mod api;
/// Form field state and request payload builders
pub mod forms;
/// Toasts and inline form messages
pub mod notify;
/// Section/tab navigation state and load generation guard
pub mod router;
/// Durable session persistence
pub mod session;
/// HTTP transport trait and the `reqwest` implementation
pub mod transport;

pub use api::{ApiClient, ApiResponse, FailureKind};
pub use forms::FormFields;
pub use notify::{Kind, Notifier};
pub use router::{Loader, PublicView, Section, Tab, ViewState};
pub use session::{FileStorage, MemoryStorage, Session, SessionStore, Storage};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
