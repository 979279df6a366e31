//! SVG rasterization and alpha compositing using resvg/usvg.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// Errors from rasterizing SVG markup.
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("invalid SVG: {0}")]
    Parse(#[from] resvg::usvg::Error),

    #[error("SVG has an empty canvas ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Renders SVG markup at its intrinsic `width`/`height`.
///
/// This mirrors how an image element sizes an SVG it loads: one SVG user
/// unit per output pixel, rounded up.
pub fn render_svg(svg_data: &str) -> Result<RgbaImage, SvgError> {
    let tree = Tree::from_str(svg_data, &Options::default())?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap =
        Pixmap::new(width, height).ok_or(SvgError::EmptyCanvas { width, height })?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels = pixmap.pixels();
    // tiny_skia stores premultiplied RGBA, row-major like RgbaImage.
    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let color = pixels[(y * width + x) as usize].demultiply();
        Rgba([color.red(), color.green(), color.blue(), color.alpha()])
    })
}

// ============================================================================
// Compositing
// ============================================================================

/// Draws `src` over `dest` with its top-left corner at (`x`, `y`).
///
/// Pixels falling outside the destination are clipped.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let (dest_width, dest_height) = (i64::from(dest.width()), i64::from(dest.height()));

    for (sx, sy, src_pixel) in src.enumerate_pixels() {
        let dx = i64::from(x) + i64::from(sx);
        let dy = i64::from(y) + i64::from(sy);
        if !(0..dest_width).contains(&dx) || !(0..dest_height).contains(&dy) {
            continue;
        }

        let dst_pixel = dest.get_pixel_mut(dx as u32, dy as u32);
        *dst_pixel = source_over(*src_pixel, *dst_pixel);
    }
}

/// Porter-Duff source-over on straight (non-premultiplied) RGBA.
///
/// QR modules are fully opaque or fully transparent, so those cases skip the
/// arithmetic.
fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        255 => src,
        0 => dst,
        alpha => {
            let sa = u32::from(alpha);
            let da = u32::from(dst[3]) * (255 - sa) / 255;
            let out_a = sa + da;
            let mix = |s: u8, d: u8| {
                ((u32::from(s) * sa + u32::from(d) * da + out_a / 2) / out_a) as u8
            };
            Rgba([
                mix(src[0], dst[0]),
                mix(src[1], dst[1]),
                mix(src[2], dst[2]),
                out_a as u8,
            ])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect x="0" y="0" width="20" height="20" fill="#ff0000"/></svg>"##;

    #[test]
    fn renders_at_intrinsic_size() {
        let img = render_svg(SQUARE_SVG).unwrap();
        assert_eq!(img.dimensions(), (40, 20));
        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
        // Right half is untouched canvas.
        assert_eq!(img.get_pixel(30, 5)[3], 0);
    }

    #[test]
    fn viewbox_scales_to_intrinsic_size() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="30" viewBox="0 0 3 3" shape-rendering="crispEdges"><path fill="#000000" d="M1 1h1v1h-1z"/></svg>"##;
        let img = render_svg(svg).unwrap();
        assert_eq!(img.dimensions(), (30, 30));
        assert_eq!(img.get_pixel(15, 15).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 2)[3], 0);
    }

    #[test]
    fn malformed_svg_is_an_error() {
        assert!(matches!(render_svg("<svg"), Err(SvgError::Parse(_))));
    }

    #[test]
    fn dark_module_replaces_background() {
        let mut background = RgbaImage::from_pixel(6, 6, Rgba([200, 180, 40, 255]));
        let module = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));

        composite_over(&mut background, &module, 2, 2);

        assert_eq!(background.get_pixel(2, 2).0, [0, 0, 0, 255]);
        assert_eq!(background.get_pixel(3, 3).0, [0, 0, 0, 255]);
        assert_eq!(background.get_pixel(4, 4).0, [200, 180, 40, 255]);
    }

    #[test]
    fn translucent_source_mixes_with_destination() {
        let mixed = source_over(Rgba([0, 0, 255, 128]), Rgba([255, 0, 0, 255]));
        assert_eq!(mixed.0, [127, 0, 128, 255]);

        // Over a transparent destination the source keeps its own color.
        let alone = source_over(Rgba([10, 20, 30, 64]), Rgba([0, 0, 0, 0]));
        assert_eq!(alone.0, [10, 20, 30, 64]);
    }

    #[test]
    fn translucent_svg_is_demultiplied() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2"><rect width="2" height="2" fill="#ff0000" fill-opacity="0.5"/></svg>"##;
        let pixel = *render_svg(svg).unwrap().get_pixel(0, 0);
        assert_eq!(pixel[0], 255);
        assert!((127..=128).contains(&pixel[3]));
    }

    #[test]
    fn composite_clips_out_of_bounds() {
        let mut dest = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));

        composite_over(&mut dest, &src, -2, 2);

        assert_eq!(dest.get_pixel(0, 3).0, [0, 255, 0, 255]);
        assert_eq!(dest.get_pixel(3, 3).0, [255, 0, 0, 255]);
        assert_eq!(dest.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_source_leaves_destination() {
        let mut dest = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let src = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        composite_over(&mut dest, &src, 0, 0);
        assert_eq!(dest.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }
}
