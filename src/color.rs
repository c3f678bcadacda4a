use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Darken, Hsl, IntoColor, Lighten, Srgb};

use crate::chart::cost::Upper;

// ---------------------------------------------------------------------------
// Theme colours
// ---------------------------------------------------------------------------

pub const CONSUMPTION: &str = "#FF6347";
pub const GENERATION: &str = "#2E8B57";
pub const CURRENT_COST: &str = "#E74C3C";
pub const PREVIOUS_COST: &str = "#999999";
pub const SAVINGS: &str = "#27AE60";
pub const SAVINGS_LABEL: &str = "#071B10";
pub const PLOT_BACKGROUND: &str = "#F8F9FA";

/// Parse a `#rrggbb` colour. Unparseable input falls back to grey.
pub fn hex(code: &str) -> Color32 {
    match Srgb::<u8>::from_str(code) {
        Ok(c) => Color32::from_rgb(c.red, c.green, c.blue),
        Err(_) => {
            log::warn!("Invalid colour '{code}', using grey");
            Color32::GRAY
        }
    }
}

/// Same colour with the given opacity (0.0–1.0).
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}

/// Shift lightness in HSL space; positive lightens, negative darkens.
pub fn shade(color: Color32, amount: f32) -> Color32 {
    let rgb = Srgb::new(color.r(), color.g(), color.b()).into_format::<f32>();
    let hsl: Hsl = rgb.into_color();
    let shaded = if amount >= 0.0 {
        hsl.lighten(amount)
    } else {
        hsl.darken(-amount)
    };
    let out: Srgb = shaded.into_color();
    let out = out.into_format::<u8>();
    Color32::from_rgb(out.red, out.green, out.blue)
}

/// Fill for the band between the cost lines, by which series is on top.
pub fn band_fill(upper: Upper) -> Color32 {
    match upper {
        Upper::Previous => with_alpha(hex(SAVINGS), 0.2),
        Upper::Current => with_alpha(hex(CURRENT_COST), 0.2),
        Upper::Tied => Color32::TRANSPARENT,
    }
}
