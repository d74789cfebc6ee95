use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::Result;

const PLACEHOLDER_SIZE: u32 = 128;

/// Built-in icon used when the modpack has none: a grass block lookalike.
pub fn placeholder_icon() -> DynamicImage {
    let grass = Rgba([93, 156, 59, 255]);
    let dirt = Rgba([134, 96, 67, 255]);
    let img = RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |_, y| {
        if y < PLACEHOLDER_SIZE / 4 { grass } else { dirt }
    });
    DynamicImage::ImageRgba8(img)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}

/// Re-encode `icon` as a PNG data URI, falling back to the placeholder when
/// there is no icon or it cannot be decoded.
pub fn icon_data_uri(icon: Option<&[u8]>) -> Result<String> {
    let image = match icon.map(image::load_from_memory) {
        Some(Ok(img)) => img,
        Some(Err(e)) => {
            log::warn!("[icon_data_uri] Modpack icon could not be decoded, using placeholder: {}", e);
            placeholder_icon()
        }
        None => {
            log::debug!("[icon_data_uri] Modpack has no icon, using placeholder");
            placeholder_icon()
        }
    };
    Ok(png_data_uri(&encode_png(&image)?))
}
