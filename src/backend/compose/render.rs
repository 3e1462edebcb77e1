//! Card rendering

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageReader, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::backend::compose::layout::{
    cover_dimensions, fit_font_size, slot_x, slot_y, title_top, CANVAS_H, CANVAS_W,
    DISTRICT_MAX_H, LINE_GAP, SLOT_H, SLOT_W, STORE_MAX_H, TITLE_MAX_W,
};
use crate::backend::compose::ComposeError;

/// JPEG quality of the composed card
pub const JPEG_QUALITY: u8 = 92;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Load the title font
pub fn load_font(path: &Path) -> Result<FontVec, ComposeError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ComposeError::Font(format!("{}: {}", path.display(), e)))?;
    FontVec::try_from_vec(bytes)
        .map_err(|e| ComposeError::Font(format!("{}: {}", path.display(), e)))
}

/// Decode an image and apply its EXIF orientation
pub fn decode_oriented(bytes: &[u8]) -> Result<DynamicImage, ComposeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ComposeError::Decode(image::ImageError::IoError(e)))?;
    let mut decoder = reader.into_decoder().map_err(ComposeError::Decode)?;
    let orientation = decoder.orientation().map_err(ComposeError::Decode)?;
    let mut img = DynamicImage::from_decoder(decoder).map_err(ComposeError::Decode)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Resize to cover `width`×`height` and centre-crop
pub fn resize_cover(img: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let (rw, rh) = cover_dimensions((img.width(), img.height()), (width, height));
    let resized = img.resize_exact(rw, rh, FilterType::Lanczos3);
    let left = (rw - width) / 2;
    let top = (rh - height) / 2;
    resized.crop_imm(left, top, width, height).to_rgb8()
}

fn fitted_scale(font: &FontVec, text: &str, max_h: u32) -> PxScale {
    let size = fit_font_size(TITLE_MAX_W, max_h, |size| {
        text_size(PxScale::from(size as f32), font, text)
    });
    PxScale::from(size as f32)
}

/// Compose the card and encode it as JPEG
///
/// CPU-bound; callers run it on a blocking thread.
pub fn compose_card(
    font: &FontVec,
    background: &[u8],
    photo: &[u8],
    store_name: &str,
    district: &str,
    district_rgb: [u8; 3],
) -> Result<Vec<u8>, ComposeError> {
    let mut canvas = RgbImage::from_pixel(CANVAS_W, CANVAS_H, Rgb([0, 0, 0]));

    let bg = resize_cover(&decode_oriented(background)?, CANVAS_W, CANVAS_H);
    imageops::replace(&mut canvas, &bg, 0, 0);

    let x = slot_x() as i32;
    let district_scale = fitted_scale(font, district, DISTRICT_MAX_H);
    let store_scale = fitted_scale(font, store_name, STORE_MAX_H);

    let district_y = title_top();
    draw_text_mut(&mut canvas, Rgb(district_rgb), x, district_y as i32, district_scale, font, district);
    let (_, district_h) = text_size(district_scale, font, district);

    let store_y = district_y + district_h + LINE_GAP;
    draw_text_mut(&mut canvas, WHITE, x, store_y as i32, store_scale, font, store_name);
    let (_, store_h) = text_size(store_scale, font, store_name);

    let title_bottom = store_y + store_h;
    let photo_y = slot_y(title_bottom);
    let thumb = resize_cover(&decode_oriented(photo)?, SLOT_W, SLOT_H);
    imageops::replace(&mut canvas, &thumb, slot_x() as i64, photo_y as i64);

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode_image(&canvas)
        .map_err(ComposeError::Encode)?;
    Ok(out)
}
