//! Embeddable chat widget: a local transcript with one in-flight send.
//!
//! The round-trip to a backend is behind [`Replier`]. Only [`StubReplier`]
//! exists today; it waits a fixed delay and returns a canned acknowledgement.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

pub const APOLOGY: &str = "Sorry, something went wrong. Please try again.";

/// Embedding attributes, as set on the host page element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetAttributes {
    pub bot_id: String,
    pub api_url: String,
    pub primary_color: String,
    pub bot_name: String,
    pub welcome_message: String,
}

impl Default for WidgetAttributes {
    fn default() -> Self {
        Self {
            bot_id: String::new(),
            api_url: "http://localhost:5000/api/public".to_string(),
            primary_color: "#6366f1".to_string(),
            bot_name: "Assistant".to_string(),
            welcome_message: "Hello! How can I help you today?".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReplyError {
    #[error("Reply backend unavailable: {0}")]
    Unavailable(String),

    #[error("Reply failed: {0}")]
    Failed(String),
}

/// Produces the assistant reply for one visitor message.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, attributes: &WidgetAttributes, message: &str) -> Result<String, ReplyError>;
}

/// Placeholder until a backend protocol exists.
#[derive(Debug, Clone)]
pub struct StubReplier {
    pub delay: Duration,
}

impl Default for StubReplier {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
        }
    }
}

#[async_trait]
impl Replier for StubReplier {
    async fn reply(&self, _attributes: &WidgetAttributes, message: &str) -> Result<String, ReplyError> {
        tokio::time::sleep(self.delay).await;
        Ok(format!(
            "Thanks for your message: \"{}\". Live answers are coming soon!",
            message
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing but whitespace was entered.
    Empty,
    /// A previous send has not finished.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    /// The replier failed and the apology entry was appended instead.
    Failed,
    Ignored(IgnoreReason),
}

/// Clears the busy flag however the send ends, including cancellation.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatWidget {
    attributes: WidgetAttributes,
    replier: Arc<dyn Replier>,
    transcript: Mutex<Vec<TranscriptEntry>>,
    draft: Mutex<String>,
    open: AtomicBool,
    busy: AtomicBool,
}

impl ChatWidget {
    /// Creates a closed widget whose transcript starts with the welcome message.
    pub fn new(attributes: WidgetAttributes, replier: Arc<dyn Replier>) -> Self {
        tracing::info!("Chat widget initialized for bot '{}'", attributes.bot_id);
        let welcome = TranscriptEntry::now(Role::Assistant, attributes.welcome_message.clone());
        Self {
            attributes,
            replier,
            transcript: Mutex::new(vec![welcome]),
            draft: Mutex::new(String::new()),
            open: AtomicBool::new(false),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_stub(attributes: WidgetAttributes) -> Self {
        Self::new(attributes, Arc::new(StubReplier::default()))
    }

    pub fn attributes(&self) -> &WidgetAttributes {
        &self.attributes
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Returns the new open state.
    pub fn toggle(&self) -> bool {
        !self.open.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }

    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().await.clone()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        *self.draft.lock().await = text.into();
    }

    pub async fn draft(&self) -> String {
        self.draft.lock().await.clone()
    }

    /// Sends the trimmed message and appends the reply to the transcript.
    pub async fn send(&self, text: &str) -> SendOutcome {
        match self.accept(text).await {
            Ok((message, guard)) => self.complete(&message, guard).await,
            Err(reason) => SendOutcome::Ignored(reason),
        }
    }

    /// Takes the busy flag and appends the user entry.
    async fn accept(&self, text: &str) -> Result<(String, BusyGuard<'_>), IgnoreReason> {
        let message = text.trim();
        if message.is_empty() {
            return Err(IgnoreReason::Empty);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Send ignored: a reply is still pending");
            return Err(IgnoreReason::Busy);
        }
        let guard = BusyGuard(&self.busy);

        self.transcript
            .lock()
            .await
            .push(TranscriptEntry::now(Role::User, message));
        Ok((message.to_string(), guard))
    }

    async fn complete(&self, message: &str, _guard: BusyGuard<'_>) -> SendOutcome {
        let (entry, outcome) = match self.replier.reply(&self.attributes, message).await {
            Ok(reply) => (TranscriptEntry::now(Role::Assistant, reply), SendOutcome::Replied),
            Err(e) => {
                tracing::warn!("Reply failed: {}", e);
                (TranscriptEntry::now(Role::Assistant, APOLOGY), SendOutcome::Failed)
            }
        };
        self.transcript.lock().await.push(entry);
        outcome
    }

    /// Enter without Shift sends the draft; any other key does nothing.
    /// An accepted draft is cleared before the reply is awaited, so text
    /// typed meanwhile survives.
    pub async fn on_key(&self, key: &str, shift: bool) -> Option<SendOutcome> {
        if key != "Enter" || shift {
            return None;
        }
        let draft = self.draft().await;
        let outcome = match self.accept(&draft).await {
            Ok((message, guard)) => {
                self.draft.lock().await.clear();
                self.complete(&message, guard).await
            }
            Err(reason) => SendOutcome::Ignored(reason),
        };
        Some(outcome)
    }
}

/// Parses `#rgb` or `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut it = hex.chars().filter_map(|c| c.to_digit(16)).map(|d| (d * 17) as u8);
            Some((it.next()?, it.next()?, it.next()?))
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

/// 24-bit ANSI foreground escape for a hex colour, or empty if unparsable.
pub fn ansi_foreground(value: &str) -> String {
    match parse_hex_color(value) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m", r, g, b),
        None => String::new(),
    }
}

pub const ANSI_RESET: &str = "\x1b[0m";
