//! Download, share and copy-link actions.
//!
//! Every action reports its outcome to the caller. Failures are logged and
//! returned as an [`ActionError`]; none of them leaves state behind that
//! affects the next action.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use crate::compose::{ComposeError, Compositor, ImageLoader, encode_png};
use crate::platform::{Platform, PlatformError, ShareFile, ShareRequest};
use crate::qr::QrError;
use crate::session::QrSession;

/// Confirmation shown after text lands on the clipboard.
pub const COPIED_MESSAGE: &str = "Link copied to clipboard!";

/// Title attached to shared images.
pub const SHARE_TITLE: &str = "QR Code";

/// Errors produced by an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("nothing has been committed for encoding")]
    NothingCommitted,

    #[error(transparent)]
    Qr(#[from] QrError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("failed to copy to clipboard: {0}")]
    Clipboard(#[source] PlatformError),

    #[error("failed to share: {0}")]
    Share(#[source] PlatformError),

    #[error("failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How a share request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The image went to the native share target.
    Shared,
    /// No share target exists; the committed text was copied instead.
    CopiedToClipboard,
}

// ============================================================================
// DownloadArtifact
// ============================================================================

/// A composed PNG ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl DownloadArtifact {
    /// The image as a `data:image/png;base64,...` URL.
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }

    /// Writes the PNG into `dir` under its file name and returns the path.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ActionError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.png).map_err(|source| ActionError::Save {
            path: path.clone(),
            source,
        })?;
        log::info!("saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(path)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Runs the export actions against a platform.
pub struct Actions {
    compositor: Compositor,
    platform: Platform,
}

impl Actions {
    pub fn new(loader: Arc<dyn ImageLoader>, platform: Platform) -> Self {
        Self {
            compositor: Compositor::new(loader),
            platform,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Composes the session's QR code over its background.
    pub async fn render(&self, session: &QrSession) -> Result<RgbaImage, ActionError> {
        let graphic = session.qr_graphic().ok_or(ActionError::NothingCommitted)??;
        let image = self
            .compositor
            .compose(session.background(), &graphic, session.layout())
            .await?;
        Ok(image)
    }

    /// Composes and encodes the image for download.
    pub async fn download(&self, session: &QrSession) -> Result<DownloadArtifact, ActionError> {
        let result = self.download_inner(session).await;
        if let Err(ref e) = result {
            log::error!("download failed: {e}");
        }
        result
    }

    async fn download_inner(&self, session: &QrSession) -> Result<DownloadArtifact, ActionError> {
        let image = self.render(session).await?;
        Ok(DownloadArtifact {
            file_name: session.download_file_name().to_string(),
            width: image.width(),
            height: image.height(),
            png: encode_png(&image)?,
        })
    }

    /// Shares the composed image, or copies the text when sharing is absent.
    ///
    /// A share target that rejects the request yields
    /// [`ActionError::Share`]; the clipboard fallback only covers a missing
    /// target.
    pub async fn share(&self, session: &QrSession) -> Result<ShareOutcome, ActionError> {
        let result = self.share_inner(session).await;
        if let Err(ref e) = result {
            log::error!("share failed: {e}");
        }
        result
    }

    async fn share_inner(&self, session: &QrSession) -> Result<ShareOutcome, ActionError> {
        let value = session.committed().ok_or(ActionError::NothingCommitted)?;

        let Some(target) = self.platform.share.as_ref() else {
            log::debug!("no share target, copying text instead");
            self.copy_text(value).await?;
            return Ok(ShareOutcome::CopiedToClipboard);
        };

        let image = self.render(session).await?;
        let request = ShareRequest {
            files: vec![ShareFile {
                name: session.share_file_name().to_string(),
                mime: "image/png",
                bytes: encode_png(&image)?,
            }],
            title: SHARE_TITLE.to_string(),
            text: format!("QR Code for: {value}"),
        };
        target.share(request).await.map_err(ActionError::Share)?;
        Ok(ShareOutcome::Shared)
    }

    /// Copies the committed text, unmodified, to the clipboard.
    pub async fn copy_link(&self, session: &QrSession) -> Result<(), ActionError> {
        let result = match session.committed() {
            Some(value) => self.copy_text(value).await,
            None => Err(ActionError::NothingCommitted),
        };
        if let Err(ref e) = result {
            log::error!("copy failed: {e}");
        }
        result
    }

    async fn copy_text(&self, value: &str) -> Result<(), ActionError> {
        self.platform
            .clipboard
            .write_text(value)
            .await
            .map_err(ActionError::Clipboard)?;
        self.platform.notifier.alert(COPIED_MESSAGE);
        Ok(())
    }
}
