//! stylish-qr: QR codes composited over themed background images
//!
//! This crate holds the state of a QR generator (draft text, committed
//! value, theme and background) and exports the result as a PNG where the
//! QR graphic sits centered over the chosen background.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stylish_qr::{Actions, LogNotifier, MemoryClipboard, Platform, QrSession, SourceLoader, Theme};
//!
//! # async fn run() -> Result<(), stylish_qr::ActionError> {
//! let mut session = QrSession::new();
//! session.select_theme(Theme::Cartoon);
//! session.input.set_draft("https://example.com");
//! session.input.commit();
//!
//! let platform = Platform::new(Arc::new(MemoryClipboard::new()), Arc::new(LogNotifier));
//! let actions = Actions::new(Arc::new(SourceLoader::new()), platform);
//!
//! let artifact = actions.download(&session).await?;
//! artifact.save_in(".")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Settings
//!
//! A session can be configured from serializable [`Settings`] with the
//! [`Configurable`] trait:
//!
//! ```
//! use stylish_qr::{Configurable, QrSession, Settings, Theme};
//!
//! let settings = Settings::new().with_theme(Theme::Cartoon).with_display_size(512);
//! let mut session = QrSession::new();
//! session.apply_settings(&settings).unwrap();
//!
//! let json = session.export_settings().to_json().unwrap();
//! assert!(json.contains("cartoon"));
//! ```

mod actions;
mod compose;
mod glow;
mod input;
mod platform;
mod qr;
mod session;
mod settings;
mod style;
mod theme;

pub use actions::{ActionError, Actions, COPIED_MESSAGE, DownloadArtifact, SHARE_TITLE, ShareOutcome};
#[cfg(feature = "http")]
pub use compose::HttpLoader;
pub use compose::{
    ComposeError, Compositor, DataUrl, DataUrlLoader, FileLoader, ImageLoader, Layout, LoadError,
    MAX_DIMENSION, SourceLoader, SvgError, composite_over, encode_png, render_svg,
};
pub use glow::{GlowOverlay, PointerHub, PointerPosition, PointerSubscription};
pub use input::{COMMIT_KEY, InputController};
#[cfg(feature = "clipboard")]
pub use platform::SystemClipboard;
pub use platform::{
    Clipboard, LogNotifier, MemoryClipboard, Notifier, Platform, PlatformError, ShareFile,
    ShareRequest, ShareTarget,
};
pub use qr::{ErrorCorrection, QUIET_ZONE_MODULES, QrColors, QrError, QrGraphic, QrOptions, QrRenderer};
pub use session::{Configurable, QrSession};
pub use settings::{DOWNLOAD_FILE_NAME, QrSettings, SHARE_FILE_NAME, Settings, SettingsError};
pub use style::{BackgroundChoice, StyleError, StyleSelector};
pub use theme::{Theme, UnknownTheme};
