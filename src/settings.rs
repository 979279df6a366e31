//! Serializable generator settings.
//!
//! [`Settings`] captures everything that shapes the exported image in a
//! JSON-friendly form, so a front end can persist or transmit it and a
//! [`QrSession`](crate::QrSession) can be rebuilt from it.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "theme": "cartoon",
//!   "background": "https://images.unsplash.com/...",
//!   "displaySize": 400,
//!   "qr": {
//!     "size": 200,
//!     "errorCorrection": "high",
//!     "foreground": "#000000",
//!     "background": "#ffffff00",
//!     "margin": true
//!   },
//!   "downloadFileName": "styled-qrcode.png",
//!   "shareFileName": "qr-code.png"
//! }
//! ```
//!
//! Every field is optional when deserializing; missing fields take their
//! defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compose::{Layout, MAX_DIMENSION};
use crate::qr::{ErrorCorrection, QrColors, QrError, QrOptions, format_color};
use crate::style::StyleError;
use crate::theme::Theme;

/// File name of downloaded images.
pub const DOWNLOAD_FILE_NAME: &str = "styled-qrcode.png";

/// File name of shared images.
pub const SHARE_FILE_NAME: &str = "qr-code.png";

/// Errors produced while loading or applying settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read settings from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("display size {0}px must be between 1 and {max}", max = MAX_DIMENSION)]
    DisplaySize(u32),

    #[error(transparent)]
    Qr(#[from] QrError),

    #[error(transparent)]
    Style(#[from] StyleError),
}

// ============================================================================
// QrSettings
// ============================================================================

/// Serializable form of [`QrOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrSettings {
    /// Rendered QR footprint in pixels.
    pub size: u32,
    pub error_correction: ErrorCorrection,
    /// Module color as `#rrggbb` or `#rrggbbaa`.
    pub foreground: String,
    /// Background color as `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub background: String,
    pub margin: bool,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self::from(&QrOptions::default())
    }
}

impl From<&QrOptions> for QrSettings {
    fn from(options: &QrOptions) -> Self {
        Self {
            size: options.size,
            error_correction: options.error_correction,
            foreground: format_color(options.colors.foreground),
            background: format_color(options.colors.background),
            margin: options.margin,
        }
    }
}

impl TryFrom<&QrSettings> for QrOptions {
    type Error = QrError;

    fn try_from(settings: &QrSettings) -> Result<Self, Self::Error> {
        let options = Self {
            size: settings.size,
            error_correction: settings.error_correction,
            colors: QrColors::from_hex(&settings.foreground, &settings.background)?,
            margin: settings.margin,
        };
        options.check_size()?;
        Ok(options)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// All generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,

    /// Selected background; `None` means the theme's first image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    /// Side length of the square display region, and of exported images.
    pub display_size: u32,

    pub qr: QrSettings,

    pub download_file_name: String,
    pub share_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            background: None,
            display_size: Layout::default().width,
            qr: QrSettings::default(),
            download_file_name: DOWNLOAD_FILE_NAME.to_string(),
            share_file_name: SHARE_FILE_NAME.to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_background(mut self, url: impl Into<String>) -> Self {
        self.background = Some(url.into());
        self
    }

    pub fn with_display_size(mut self, size: u32) -> Self {
        self.display_size = size;
        self
    }

    pub fn with_qr(mut self, qr: QrSettings) -> Self {
        self.qr = qr;
        self
    }

    /// The display region described by these settings.
    pub fn layout(&self) -> Layout {
        Layout::square(self.display_size)
    }

    /// The display region, rejecting sizes the compositor cannot allocate.
    pub fn checked_layout(&self) -> Result<Layout, SettingsError> {
        match self.display_size {
            size @ 1..=MAX_DIMENSION => Ok(Layout::square(size)),
            size => Err(SettingsError::DisplaySize(size)),
        }
    }

    /// Parses the QR section into renderer options.
    pub fn qr_options(&self) -> Result<QrOptions, SettingsError> {
        Ok(QrOptions::try_from(&self.qr)?)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
