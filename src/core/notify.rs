//! Notification surface: transient toasts and per-form inline messages.

use std::{
    collections::BTreeMap,
    fmt,
    time::{Duration, Instant},
};

/// Tone of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Confirmation.
    Success,
    /// Failure, shown as-is.
    Error,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Text shown.
    pub message: String,
    /// Tone.
    pub kind: Kind,
    /// When it was raised; expiry counts from here.
    pub raised_at: Instant,
}

/// A message under one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMessage {
    /// Text shown.
    pub message: String,
    /// Tone.
    pub kind: Kind,
    /// When it was set; expiry counts from here.
    pub set_at: Instant,
}

/// Toasts stack in the order they were raised; each expires after `toast_ttl`.
/// Inline messages are keyed by target and replaced by the next message for that target.
#[derive(Debug, Clone)]
pub struct Notifier {
    toast_ttl: Duration,
    message_ttl: Duration,
    toasts: Vec<Toast>,
    messages: BTreeMap<String, FieldMessage>,
}

impl Notifier {
    /// Creates an empty notifier.
    ///
    /// # Arguments
    /// * `toast_ttl` - How long a toast stays up
    /// * `message_ttl` - How long an inline message stays up
    #[must_use]
    pub const fn new(toast_ttl: Duration, message_ttl: Duration) -> Self {
        Self {
            toast_ttl,
            message_ttl,
            toasts: Vec::new(),
            messages: BTreeMap::new(),
        }
    }

    /// Raises a toast on top of the stack.
    pub fn notify(&mut self, message: impl Into<String>, kind: Kind) {
        self.toasts.push(Toast {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        });
    }

    /// Sets the inline message of `target`, replacing the previous one.
    pub fn set_field_message(&mut self, target: &str, message: impl Into<String>, kind: Kind) {
        self.messages.insert(
            target.to_string(),
            FieldMessage {
                message: message.into(),
                kind,
                set_at: Instant::now(),
            },
        );
    }

    /// Live toasts, oldest first.
    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Inline message of `target`, if one is live.
    #[must_use]
    pub fn field_message(&self, target: &str) -> Option<&FieldMessage> {
        self.messages.get(target)
    }

    /// Live inline messages ordered by target.
    pub fn field_messages(&self) -> impl Iterator<Item = (&str, &FieldMessage)> {
        self.messages.iter().map(|(target, msg)| (target.as_str(), msg))
    }

    /// Most recent error toast, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.toasts
            .iter()
            .rev()
            .find(|toast| toast.kind == Kind::Error)
            .map(|toast| toast.message.as_str())
    }

    /// Drops every toast and message whose lifetime ended before `now`.
    pub fn sweep(&mut self, now: Instant) {
        let toast_ttl = self.toast_ttl;
        let message_ttl = self.message_ttl;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.raised_at) < toast_ttl);
        self.messages
            .retain(|_, msg| now.saturating_duration_since(msg.set_at) < message_ttl);
    }
}
