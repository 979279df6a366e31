//! Generator state: input, style, and QR rendering options.

use crate::compose::Layout;
use crate::glow::{GlowOverlay, PointerHub};
use crate::input::InputController;
use crate::qr::{QrError, QrGraphic, QrRenderer};
use crate::settings::{DOWNLOAD_FILE_NAME, SHARE_FILE_NAME, QrSettings, Settings, SettingsError};
use crate::style::{StyleError, StyleSelector};
use crate::theme::Theme;

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from [`Settings`].
pub trait Configurable {
    /// Applies the settings. On error, nothing is changed.
    fn apply_settings(&mut self, settings: &Settings) -> Result<(), SettingsError>;

    /// Exports the current configuration.
    fn export_settings(&self) -> Settings;
}

// ============================================================================
// QrSession
// ============================================================================

/// The state behind one generator view.
///
/// The session is the single source of the QR graphic: actions receive it
/// from [`qr_graphic`](Self::qr_graphic) rather than locating it in a view.
///
/// # Example
///
/// ```
/// use stylish_qr::{QrSession, Theme};
///
/// let mut session = QrSession::new();
/// session.select_theme(Theme::Cartoon);
/// session.input.set_draft("https://example.com");
/// assert!(session.input.commit());
///
/// let graphic = session.qr_graphic().unwrap().unwrap();
/// assert_eq!(graphic.size(), 200);
/// ```
#[derive(Default)]
pub struct QrSession {
    /// Draft and committed text.
    pub input: InputController,

    style: StyleSelector,

    /// QR rendering options.
    pub renderer: QrRenderer,

    layout: Layout,
    download_file_name: Option<String>,
    share_file_name: Option<String>,
    glow: Option<GlowOverlay>,
}

impl QrSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a session from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        let mut session = Self::new();
        session.apply_settings(settings)?;
        Ok(session)
    }

    // ---- Style ----

    pub fn theme(&self) -> Theme {
        self.style.theme()
    }

    pub fn background(&self) -> &'static str {
        self.style.background()
    }

    pub fn style(&self) -> &StyleSelector {
        &self.style
    }

    /// Switches theme, resetting the background. Theme colors apply to the
    /// QR graphic.
    pub fn select_theme(&mut self, theme: Theme) {
        self.style.select_theme(theme);
        self.renderer.options.colors = theme.qr_colors();
    }

    pub fn select_background(&mut self, url: &str) -> Result<(), StyleError> {
        self.style.select_background(url)
    }

    pub fn select_background_at(&mut self, index: usize) -> Result<(), StyleError> {
        self.style.select_background_at(index)
    }

    // ---- Output ----

    /// Committed value, or `None` while the QR region is hidden.
    pub fn committed(&self) -> Option<&str> {
        self.input.is_qr_visible().then(|| self.input.committed())
    }

    /// Renders the committed value, or `None` while the QR region is hidden.
    pub fn qr_graphic(&self) -> Option<Result<QrGraphic, QrError>> {
        self.committed().map(|value| self.renderer.render(value))
    }

    /// Text shown under the QR code.
    pub fn caption(&self) -> Option<String> {
        self.committed()
            .map(|value| format!("Scan this QR code to access: {value}"))
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn download_file_name(&self) -> &str {
        self.download_file_name.as_deref().unwrap_or(DOWNLOAD_FILE_NAME)
    }

    pub fn share_file_name(&self) -> &str {
        self.share_file_name.as_deref().unwrap_or(SHARE_FILE_NAME)
    }

    // ---- Glow ----

    /// Starts the pointer glow. Any previous overlay is released first.
    pub fn attach_glow(&mut self, hub: &PointerHub) {
        self.glow = None;
        self.glow = Some(GlowOverlay::attach(hub));
    }

    /// Stops the pointer glow and releases its subscription.
    pub fn detach_glow(&mut self) {
        self.glow = None;
    }

    pub fn glow(&mut self) -> Option<&mut GlowOverlay> {
        self.glow.as_mut()
    }
}

impl Configurable for QrSession {
    fn apply_settings(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        let options = settings.qr_options()?;
        let layout = settings.checked_layout()?;

        let mut style = StyleSelector::new(settings.theme);
        if let Some(ref url) = settings.background {
            style.select_background(url)?;
        }

        self.style = style;
        self.renderer.options = options;
        self.layout = layout;
        self.download_file_name = Some(settings.download_file_name.clone());
        self.share_file_name = Some(settings.share_file_name.clone());
        Ok(())
    }

    fn export_settings(&self) -> Settings {
        let theme = self.style.theme();
        let background = self.style.background();
        Settings {
            theme,
            background: (background != theme.first_background()).then(|| background.to_string()),
            display_size: self.layout.width,
            qr: QrSettings::from(&self.renderer.options),
            download_file_name: self.download_file_name().to_string(),
            share_file_name: self.share_file_name().to_string(),
        }
    }
}
