//! QR graphic rendering.
//!
//! Encoding is delegated to the [`qrcode`] crate. This module turns the
//! resulting module matrix into SVG markup: a background rectangle and one
//! path made of unit squares, scaled to the requested pixel size.

use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use palette::{Srgb, Srgba};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::compose::MAX_DIMENSION;

/// Modules of blank space around the matrix when the margin is enabled.
pub const QUIET_ZONE_MODULES: usize = 4;

/// Errors produced while rendering a QR graphic.
#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("cannot encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("invalid color `{0}`")]
    Color(String),

    #[error("QR size must be greater than zero")]
    ZeroSize,

    #[error("QR size {0}px exceeds {max}px", max = MAX_DIMENSION)]
    TooLarge(u32),
}

// ============================================================================
// ErrorCorrection
// ============================================================================

/// Error-correction level of the encoded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    /// Recovers up to ~30% damage, which tolerates busy backgrounds.
    #[default]
    High,
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

// ============================================================================
// Colors
// ============================================================================

/// Foreground and background colors of a QR graphic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrColors {
    pub foreground: Srgba<u8>,
    pub background: Srgba<u8>,
}

impl Default for QrColors {
    /// Black modules over fully transparent white.
    fn default() -> Self {
        Self {
            foreground: Srgba::new(0, 0, 0, 255),
            background: Srgba::new(255, 255, 255, 0),
        }
    }
}

impl QrColors {
    /// Parses a pair of hex colors (see [`parse_color`]).
    pub fn from_hex(foreground: &str, background: &str) -> Result<Self, QrError> {
        Ok(Self {
            foreground: parse_color(foreground)?,
            background: parse_color(background)?,
        })
    }
}

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
pub fn parse_color(value: &str) -> Result<Srgba<u8>, QrError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("transparent") {
        return Ok(Srgba::new(255, 255, 255, 0));
    }

    let hex = value.trim_start_matches('#');
    let invalid = || QrError::Color(value.to_string());
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let (rgb, alpha) = match hex.len() {
        3 | 6 => (hex, 255),
        8 => {
            let alpha = u8::from_str_radix(&hex[6..], 16).map_err(|_| invalid())?;
            (&hex[..6], alpha)
        }
        _ => return Err(invalid()),
    };

    let rgb: Srgb<u8> = rgb.parse().map_err(|_| invalid())?;
    Ok(Srgba::new(rgb.red, rgb.green, rgb.blue, alpha))
}

/// Formats a color as `#rrggbb`, or `#rrggbbaa` when not opaque.
pub fn format_color(color: Srgba<u8>) -> String {
    let mut out = format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue);
    if color.alpha != 255 {
        let _ = write!(out, "{:02x}", color.alpha);
    }
    out
}

/// Writes `fill` (and `fill-opacity` when translucent) SVG attributes.
fn fill_attrs(color: Srgba<u8>) -> String {
    let mut attrs = format!(
        "fill=\"#{:02x}{:02x}{:02x}\"",
        color.red, color.green, color.blue
    );
    if color.alpha != 255 {
        let _ = write!(attrs, " fill-opacity=\"{:.3}\"", f32::from(color.alpha) / 255.0);
    }
    attrs
}

// ============================================================================
// Options & Renderer
// ============================================================================

/// Rendering options for [`QrRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QrOptions {
    /// Width and height of the rendered graphic in pixels.
    pub size: u32,
    pub error_correction: ErrorCorrection,
    pub colors: QrColors,
    /// Whether to surround the matrix with a quiet zone.
    pub margin: bool,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 200,
            error_correction: ErrorCorrection::High,
            colors: QrColors::default(),
            margin: true,
        }
    }
}

impl QrOptions {
    /// Rejects a zero or oversized footprint.
    pub fn check_size(&self) -> Result<(), QrError> {
        match self.size {
            0 => Err(QrError::ZeroSize),
            size if size > MAX_DIMENSION => Err(QrError::TooLarge(size)),
            _ => Ok(()),
        }
    }
}

/// Turns text into a scannable [`QrGraphic`].
#[derive(Debug, Clone, Default)]
pub struct QrRenderer {
    pub options: QrOptions,
}

impl QrRenderer {
    pub fn new(options: QrOptions) -> Self {
        Self { options }
    }

    /// Encodes `text` and renders it with the configured options.
    pub fn render(&self, text: &str) -> Result<QrGraphic, QrError> {
        let options = &self.options;
        options.check_size()?;

        let code = QrCode::with_error_correction_level(text.as_bytes(), options.error_correction.into())?;
        let width = code.width();
        let margin = if options.margin { QUIET_ZONE_MODULES } else { 0 };
        let modules = width + 2 * margin;

        let mut path = String::new();
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color == qrcode::Color::Dark {
                let x = i % width + margin;
                let y = i / width + margin;
                let _ = write!(path, "M{x} {y}h1v1h-1z");
            }
        }

        let size = options.size;
        let mut markup = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" \
             viewBox=\"0 0 {modules} {modules}\" shape-rendering=\"crispEdges\">"
        );
        if options.colors.background.alpha != 0 {
            let _ = write!(
                markup,
                "<rect width=\"{modules}\" height=\"{modules}\" {}/>",
                fill_attrs(options.colors.background)
            );
        }
        let _ = write!(
            markup,
            "<path {} d=\"{path}\"/></svg>",
            fill_attrs(options.colors.foreground)
        );

        log::debug!("rendered {width}x{width} QR matrix at {size}px");
        Ok(QrGraphic {
            markup,
            size,
            modules,
        })
    }
}

// ============================================================================
// QrGraphic
// ============================================================================

/// A rendered QR code as SVG markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrGraphic {
    markup: String,
    size: u32,
    modules: usize,
}

impl QrGraphic {
    /// The SVG document.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Rendered width and height in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Modules per side, quiet zone included.
    pub fn modules(&self) -> usize {
        self.modules
    }

    /// Serializes the markup into a base64 `data:image/svg+xml` reference.
    pub fn to_data_url(&self) -> String {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(self.markup.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_svg_at_requested_size() {
        let graphic = QrRenderer::default().render("Hello World").unwrap();
        assert_eq!(graphic.size(), 200);
        assert!(graphic.markup().starts_with("<svg"));
        assert!(graphic.markup().contains("width=\"200\""));
        assert!(graphic.markup().contains("fill=\"#000000\""));
        // Transparent background draws no rectangle.
        assert!(!graphic.markup().contains("<rect"));
    }

    #[test]
    fn margin_adds_quiet_zone() {
        let mut renderer = QrRenderer::default();
        let with_margin = renderer.render("abc").unwrap();
        renderer.options.margin = false;
        let without = renderer.render("abc").unwrap();
        assert_eq!(with_margin.modules(), without.modules() + 2 * QUIET_ZONE_MODULES);
    }

    #[test]
    fn higher_correction_never_shrinks_symbol() {
        let mut renderer = QrRenderer::default();
        renderer.options.error_correction = ErrorCorrection::Low;
        let low = renderer.render("https://example.com/some/longer/path").unwrap();
        renderer.options.error_correction = ErrorCorrection::High;
        let high = renderer.render("https://example.com/some/longer/path").unwrap();
        assert!(high.modules() >= low.modules());
    }

    #[test]
    fn opaque_background_draws_rect() {
        let options = QrOptions {
            colors: QrColors::from_hex("#112233", "#ffffff").unwrap(),
            ..QrOptions::default()
        };
        let graphic = QrRenderer::new(options).render("x").unwrap();
        assert!(graphic.markup().contains("<rect"));
        assert!(graphic.markup().contains("fill=\"#112233\""));
    }

    #[test]
    fn data_url_round_trips_markup() {
        let graphic = QrRenderer::default().render("data").unwrap();
        let url = graphic.to_data_url();
        let payload = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let decoded = STANDARD.decode(payload).unwrap();
        assert_eq!(decoded, graphic.markup().as_bytes());
    }

    #[test]
    fn oversized_text_fails() {
        let text = "x".repeat(4000);
        assert!(matches!(
            QrRenderer::default().render(&text),
            Err(QrError::Encode(_))
        ));
    }

    #[test]
    fn zero_size_fails() {
        let renderer = QrRenderer::new(QrOptions { size: 0, ..QrOptions::default() });
        assert!(matches!(renderer.render("x"), Err(QrError::ZeroSize)));
    }

    #[test]
    fn oversized_footprint_fails_before_encoding() {
        let renderer = QrRenderer::new(QrOptions {
            size: 100_000,
            ..QrOptions::default()
        });
        assert!(matches!(renderer.render("x"), Err(QrError::TooLarge(100_000))));

        let at_limit = QrOptions {
            size: MAX_DIMENSION,
            ..QrOptions::default()
        };
        assert!(at_limit.check_size().is_ok());
    }

    #[test]
    fn color_parsing() {
        assert_eq!(parse_color("#ff0000").unwrap(), Srgba::new(255, 0, 0, 255));
        assert_eq!(parse_color("00ff0080").unwrap(), Srgba::new(0, 255, 0, 128));
        assert_eq!(parse_color("transparent").unwrap().alpha, 0);
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert!(matches!(parse_color("#é1"), Err(QrError::Color(_))));
        assert!(matches!(parse_color("#ff00é"), Err(QrError::Color(_))));
        assert_eq!(format_color(Srgba::new(255, 255, 255, 0)), "#ffffff00");
        assert_eq!(format_color(Srgba::new(0, 0, 0, 255)), "#000000");
    }
}
