use std::{io::Cursor, sync::OnceLock};

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::{tiny_skia, usvg};

fn options() -> &'static usvg::Options<'static> {
    static OPTIONS: OnceLock<usvg::Options<'static>> = OnceLock::new();
    OPTIONS.get_or_init(|| {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        options
    })
}

/// Rasterize SVG source at its intrinsic size and encode to `format`.
pub fn render_image(svg_src: &str, format: ImageFormat) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_str(svg_src, options()).context("Failed to parse SVG")?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow!("Invalid image dimensions"))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    let image = RgbaImage::from_raw(size.width(), size.height(), pixmap.take())
        .ok_or_else(|| anyhow!("Invalid pixel buffer"))?;
    encode_image(&DynamicImage::ImageRgba8(image), format)
}

pub fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    // JPEG has no alpha channel.
    if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut out, format)
            .context("Failed to encode image")?;
    } else {
        image.write_to(&mut out, format).context("Failed to encode image")?;
    }
    Ok(out.into_inner())
}
