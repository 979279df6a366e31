//! Platform capabilities consumed by the export actions.
//!
//! The clipboard and the alert are always present. Native sharing is
//! optional and feature-detected: a [`Platform`] without a [`ShareTarget`]
//! makes the share action fall back to copying text.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

/// Errors reported by a platform capability.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("share rejected: {0}")]
    Share(String),
}

// ============================================================================
// Capabilities
// ============================================================================

/// Write-only text clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError>;
}

/// A file handed to a share target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Payload of a native share invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub files: Vec<ShareFile>,
    pub title: String,
    pub text: String,
}

/// Native share sheet.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    async fn share(&self, request: ShareRequest) -> Result<(), PlatformError>;
}

/// Blocking user notification.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// The capabilities available to the export actions.
#[derive(Clone)]
pub struct Platform {
    pub clipboard: Arc<dyn Clipboard>,
    pub share: Option<Arc<dyn ShareTarget>>,
    pub notifier: Arc<dyn Notifier>,
}

impl Platform {
    /// Creates a platform without native sharing.
    pub fn new(clipboard: Arc<dyn Clipboard>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clipboard,
            share: None,
            notifier,
        }
    }

    pub fn with_share(mut self, share: Arc<dyn ShareTarget>) -> Self {
        self.share = Some(share);
        self
    }

    pub fn has_share(&self) -> bool {
        self.share.is_some()
    }
}

// ============================================================================
// Implementations
// ============================================================================

/// Reports alerts through the log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::info!("{message}");
    }
}

/// In-process clipboard, for embedding hosts without a system clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}

/// The desktop clipboard, via arboard.
///
/// A fresh handle is opened per write; arboard handles are not shareable
/// across threads on every platform.
#[cfg(feature = "clipboard")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PlatformError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| PlatformError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| PlatformError::Clipboard(e.to_string()))
    }
}
