//! Card geometry
//!
//! Fixed 1080×1350 portrait layout: a two-line title (district, store name)
//! under the top padding, then an 860×600 photo slot centred between the
//! title and the caption-safe area at the bottom.

/// Canvas width
pub const CANVAS_W: u32 = 1080;
/// Canvas height
pub const CANVAS_H: u32 = 1350;
pub const PAD: u32 = 72;
pub const TITLE_TOP_OFFSET: u32 = 50;
pub const LINE_GAP: u32 = 12;
pub const SLOT_W: u32 = 860;
pub const SLOT_H: u32 = 600;
pub const MIN_GAP: u32 = 30;
/// Bottom band kept free for Instagram's caption overlay
pub const CAPTION_SAFE_MARGIN: u32 = 150;

/// Width available to each title line
pub const TITLE_MAX_W: u32 = CANVAS_W - PAD * 2;
pub const DISTRICT_MAX_H: u32 = 160;
pub const STORE_MAX_H: u32 = 200;

pub const FONT_MAX_SIZE: u32 = 128;
pub const FONT_MIN_SIZE: u32 = 32;
const FONT_STEP: u32 = 2;

/// Title line 1 when the brief has no usable area keyword
pub const DEFAULT_DISTRICT: &str = "상권 정보";

/// Left edge of the photo slot and of both title lines
pub const fn slot_x() -> u32 {
    (CANVAS_W - SLOT_W) / 2
}

/// Top of the district line
pub const fn title_top() -> u32 {
    PAD + TITLE_TOP_OFFSET
}

/// Largest font size whose rendered text fits `max_w`×`max_h`
///
/// Sizes are tried from [`FONT_MAX_SIZE`] down in steps of 2;
/// [`FONT_MIN_SIZE`] is returned when nothing fits.
pub fn fit_font_size<F>(max_w: u32, max_h: u32, mut measure: F) -> u32
where
    F: FnMut(u32) -> (u32, u32),
{
    let mut size = FONT_MAX_SIZE;
    while size >= FONT_MIN_SIZE {
        let (w, h) = measure(size);
        if w <= max_w && h <= max_h {
            return size;
        }
        size -= FONT_STEP;
    }
    FONT_MIN_SIZE
}

/// Top of the photo slot for a title ending at `title_bottom`
pub fn slot_y(title_bottom: u32) -> u32 {
    let cap_top = (CANVAS_H - CAPTION_SAFE_MARGIN) as i64;
    let title_bottom = title_bottom as i64;
    let slot_h = SLOT_H as i64;
    let min_gap = MIN_GAP as i64;

    let available = cap_top - title_bottom - slot_h;
    let gap = if available > 0 {
        min_gap.max(available / 2)
    } else {
        min_gap
    };

    let mut y = title_bottom + gap;
    if y + slot_h > cap_top {
        y = (title_bottom + min_gap).max(cap_top - slot_h);
    }
    y.max(0) as u32
}

/// Scaled size that covers `target` while keeping the aspect ratio
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (iw, ih) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (tw, th) = (target.0 as f64, target.1 as f64);
    let scale = (tw / iw).max(th / ih);
    let w = (iw * scale).ceil() as u32;
    let h = (ih * scale).ceil() as u32;
    (w.max(target.0), h.max(target.1))
}

/// Title line 1 text for a list of area keywords
pub fn district_label(area_keywords: &[String]) -> String {
    crate::shared::ad_brief::first_district(area_keywords)
        .unwrap_or(DEFAULT_DISTRICT)
        .to_string()
}
