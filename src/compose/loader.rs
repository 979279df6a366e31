//! Image loading for the compositor.
//!
//! An [`ImageLoader`] resolves an image reference to decoded pixels. The
//! compositor awaits a loader twice per action: once for the background and
//! once for the serialized QR graphic.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use super::svg::{SvgError, render_svg};

const SVG_MIME: &str = "image/svg+xml";

/// Errors produced while loading an image.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("malformed data URL: {0}")]
    InvalidDataUrl(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("SVG payload is not UTF-8")]
    NotUtf8,

    #[error(transparent)]
    Svg(#[from] SvgError),

    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "http")]
    #[error("cannot fetch image: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unsupported image source `{0}`")]
    UnsupportedScheme(String),
}

/// Resolves an image reference (URL, data URL, or path) to RGBA pixels.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, src: &str) -> Result<RgbaImage, LoadError>;
}

/// Decodes raw bytes, rasterizing them first when they hold SVG markup.
fn decode_bytes(bytes: &[u8], is_svg: bool) -> Result<RgbaImage, LoadError> {
    if is_svg {
        let markup = std::str::from_utf8(bytes).map_err(|_| LoadError::NotUtf8)?;
        return Ok(render_svg(markup)?);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

// ============================================================================
// Data URLs
// ============================================================================

/// A parsed `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime: &'a str,
    pub base64: bool,
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Splits `data:[<mime>][;param...][;base64],<payload>`.
    ///
    /// Non-base64 payloads are taken literally; percent-escapes are not
    /// decoded.
    pub fn parse(url: &'a str) -> Result<Self, LoadError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| LoadError::InvalidDataUrl("missing `data:` prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| LoadError::InvalidDataUrl("missing `,` separator".into()))?;

        let mut parts = header.split(';');
        let mime = parts.next().unwrap_or_default();
        let base64 = parts.any(|param| param.eq_ignore_ascii_case("base64"));

        Ok(Self {
            mime: if mime.is_empty() { "text/plain" } else { mime },
            base64,
            payload,
        })
    }

    /// Returns the decoded payload bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, LoadError> {
        if self.base64 {
            Ok(STANDARD.decode(self.payload.trim())?)
        } else {
            Ok(self.payload.as_bytes().to_vec())
        }
    }

    pub fn is_svg(&self) -> bool {
        self.mime.eq_ignore_ascii_case(SVG_MIME)
    }
}

/// Loads images embedded in `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlLoader;

impl DataUrlLoader {
    /// Decodes a data URL synchronously.
    pub fn decode(&self, src: &str) -> Result<RgbaImage, LoadError> {
        let url = DataUrl::parse(src)?;
        if !url.is_svg() && !url.mime.starts_with("image/") {
            return Err(LoadError::InvalidDataUrl(format!(
                "`{}` is not an image type",
                url.mime
            )));
        }
        decode_bytes(&url.bytes()?, url.is_svg())
    }
}

#[async_trait]
impl ImageLoader for DataUrlLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, LoadError> {
        self.decode(src)
    }
}

// ============================================================================
// Files
// ============================================================================

/// Loads images from the local filesystem.
///
/// Accepts plain paths and `file://` URLs. Files with an `.svg` extension
/// are rasterized; anything else is decoded by content sniffing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

#[async_trait]
impl ImageLoader for FileLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, LoadError> {
        let path = Path::new(src.strip_prefix("file://").unwrap_or(src));
        let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        decode_bytes(&bytes, is_svg)
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches images over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpLoader {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ImageLoader for HttpLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, LoadError> {
        let response = self.client.get(src).send().await?.error_for_status()?;
        let is_svg = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(SVG_MIME));
        let bytes = response.bytes().await?;
        log::debug!("fetched {} bytes from {src}", bytes.len());
        decode_bytes(&bytes, is_svg)
    }
}

// ============================================================================
// SourceLoader
// ============================================================================

/// Dispatches to the data URL, HTTP or file loader based on the scheme.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    data: DataUrlLoader,
    file: FileLoader,
    #[cfg(feature = "http")]
    http: HttpLoader,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageLoader for SourceLoader {
    async fn load(&self, src: &str) -> Result<RgbaImage, LoadError> {
        if src.starts_with("data:") {
            return self.data.load(src).await;
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            #[cfg(feature = "http")]
            return self.http.load(src).await;
            #[cfg(not(feature = "http"))]
            return Err(LoadError::UnsupportedScheme(src.to_string()));
        }
        if src.contains("://") && !src.starts_with("file://") {
            return Err(LoadError::UnsupportedScheme(src.to_string()));
        }
        self.file.load(src).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    /// Encodes a solid-color PNG as a data URL.
    pub(crate) fn png_data_url(width: u32, height: u32, color: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn parse_data_url_parts() {
        let url = DataUrl::parse("data:image/svg+xml;charset=utf-8;base64,AAAA").unwrap();
        assert_eq!(url.mime, "image/svg+xml");
        assert!(url.base64);
        assert_eq!(url.payload, "AAAA");
        assert!(url.is_svg());

        let plain = DataUrl::parse("data:,hello").unwrap();
        assert_eq!(plain.mime, "text/plain");
        assert!(!plain.base64);
        assert_eq!(plain.bytes().unwrap(), b"hello");
    }

    #[test]
    fn reject_malformed_data_urls() {
        assert!(DataUrl::parse("image/png;base64,AAAA").is_err());
        assert!(DataUrl::parse("data:image/png;base64").is_err());
        assert!(matches!(
            DataUrlLoader.decode("data:image/png;base64,@@@"),
            Err(LoadError::Base64(_))
        ));
        assert!(matches!(
            DataUrlLoader.decode("data:text/plain,hi"),
            Err(LoadError::InvalidDataUrl(_))
        ));
    }

    #[tokio::test]
    async fn load_png_data_url() {
        let src = png_data_url(3, 2, [1, 2, 3, 255]);
        let img = DataUrlLoader.load(&src).await.unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3, 255]);
    }

    #[tokio::test]
    async fn load_plain_svg_data_url() {
        let src = r##"data:image/svg+xml,<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4"/>"##;
        let img = DataUrlLoader.load(src).await.unwrap();
        assert_eq!(img.dimensions(), (8, 4));
    }

    #[tokio::test]
    async fn load_file_and_report_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbaImage::from_pixel(5, 5, Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();

        let loader = SourceLoader::new();
        let img = loader.load(path.to_str().unwrap()).await.unwrap();
        assert_eq!(img.dimensions(), (5, 5));

        let url = format!("file://{}", path.display());
        assert!(loader.load(&url).await.is_ok());

        let missing = dir.path().join("missing.png");
        let err = loader.load(missing.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn unknown_scheme_is_rejected() {
        let err = SourceLoader::new()
            .load("ftp://example.com/bg.png")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedScheme(_)));
    }
}
