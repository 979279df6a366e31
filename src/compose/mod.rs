//! Compositing of a background image and a QR graphic into one raster.
//!
//! # Pipeline
//!
//! ```text
//! background src ──► load (await) ──► stretch to layout ─┐
//!                                                        ▼
//! QrGraphic ──► data URL ──► load (await) ──► center ──► RgbaImage
//! ```
//!
//! Both loads go through the same [`ImageLoader`], so the two suspension
//! points and their failures are visible to the caller as distinct
//! [`ComposeError`] variants. The background is fully drawn before the QR
//! overlay, and the overlay before the image is returned.
//!
//! # Overlapping requests
//!
//! A [`Compositor`] owns a single drawing surface. Each call to
//! [`Compositor::compose`] holds it for the whole load-and-draw sequence, so
//! concurrent requests are queued and run one after another in arrival order.

pub mod loader;
pub mod svg;

pub use loader::{DataUrl, DataUrlLoader, FileLoader, ImageLoader, LoadError, SourceLoader};
#[cfg(feature = "http")]
pub use loader::HttpLoader;
pub use svg::{SvgError, composite_over, render_svg};

use std::io::Cursor;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use tokio::sync::Mutex;

use crate::qr::QrGraphic;

/// Largest accepted side length, in pixels, of a layout or QR footprint.
pub const MAX_DIMENSION: u32 = 8192;

/// Errors produced while compositing.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("failed to load background image: {0}")]
    Background(#[source] LoadError),

    #[error("failed to load QR overlay: {0}")]
    Overlay(#[source] LoadError),

    #[error("display region must not be empty ({width}x{height})")]
    EmptyLayout { width: u32, height: u32 },

    #[error("display region {width}x{height} exceeds {max}px per side", max = MAX_DIMENSION)]
    OversizedLayout { width: u32, height: u32 },
}

// ============================================================================
// Layout
// ============================================================================

/// Pixel dimensions of the on-screen QR display region.
///
/// The composed raster always has exactly these dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self::square(400)
    }
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }

    /// Top-left corner that centers a `width` x `height` box in the region.
    ///
    /// May be negative when the box is larger than the region.
    pub fn centered(&self, width: u32, height: u32) -> (i32, i32) {
        // Half the difference of two u32 values always fits in i32.
        let offset = |outer: u32, inner: u32| ((i64::from(outer) - i64::from(inner)) / 2) as i32;
        (offset(self.width, width), offset(self.height, height))
    }

    /// Whether both sides are within [`MAX_DIMENSION`].
    pub fn fits(&self) -> bool {
        self.width <= MAX_DIMENSION && self.height <= MAX_DIMENSION
    }
}

// ============================================================================
// Compositor
// ============================================================================

/// Draws a QR graphic over a background image.
pub struct Compositor {
    loader: Arc<dyn ImageLoader>,
    /// Number of compositions started; the lock is the drawing surface.
    surface: Mutex<u64>,
}

impl Compositor {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            loader,
            surface: Mutex::new(0),
        }
    }

    /// Loads both images and paints them into a raster of `layout` size.
    pub async fn compose(
        &self,
        background: &str,
        graphic: &QrGraphic,
        layout: Layout,
    ) -> Result<RgbaImage, ComposeError> {
        if layout.width == 0 || layout.height == 0 {
            return Err(ComposeError::EmptyLayout {
                width: layout.width,
                height: layout.height,
            });
        }
        if !layout.fits() {
            return Err(ComposeError::OversizedLayout {
                width: layout.width,
                height: layout.height,
            });
        }

        let mut surface = self.surface.lock().await;
        *surface += 1;
        let job = *surface;

        log::debug!("compose #{job}: loading background {background}");
        let background = self
            .loader
            .load(background)
            .await
            .map_err(ComposeError::Background)?;
        let mut canvas = stretch(&background, layout);

        log::debug!("compose #{job}: loading {}px QR overlay", graphic.size());
        let overlay = self
            .loader
            .load(&graphic.to_data_url())
            .await
            .map_err(ComposeError::Overlay)?;
        draw_centered(&mut canvas, &overlay, graphic.size(), layout);

        log::debug!("compose #{job}: done ({}x{})", layout.width, layout.height);
        Ok(canvas)
    }

    /// Number of compositions started so far.
    pub async fn jobs_started(&self) -> u64 {
        *self.surface.lock().await
    }
}

/// Scales the background to fill the layout exactly, ignoring aspect ratio.
pub fn stretch(background: &RgbaImage, layout: Layout) -> RgbaImage {
    if background.dimensions() == (layout.width, layout.height) {
        return background.clone();
    }
    imageops::resize(background, layout.width, layout.height, FilterType::Triangle)
}

/// Draws `overlay` as a `footprint` square centered in the layout.
///
/// Overlays of another size are resampled with nearest-neighbour filtering
/// so module edges stay sharp.
pub fn draw_centered(canvas: &mut RgbaImage, overlay: &RgbaImage, footprint: u32, layout: Layout) {
    let resized;
    let overlay = if overlay.dimensions() == (footprint, footprint) {
        overlay
    } else {
        resized = imageops::resize(overlay, footprint, footprint, FilterType::Nearest);
        &resized
    };
    let (x, y) = layout.centered(footprint, footprint);
    composite_over(canvas, overlay, x, y);
}

/// Encodes a raster as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
