//! Message templates and delivery
//!
//! Templates use `%placeholder%` substitution. An empty template means the
//! message is disabled. Delivery failures are logged and swallowed.

use tracing::warn;

use crate::host::{Health, Messenger, PlayerId};

pub const TIME: &str = "%time%";
pub const NAME: &str = "%name%";
pub const VICTIM: &str = "%victim%";
pub const KILLER: &str = "%killer%";
pub const HEALTH: &str = "%health%";

/// Resource-pack heart glyph (U+E1FE)
pub const HEALTH_GLYPH: &str = "\u{e1fe}";
/// Resource-pack golden heart glyph (U+E1FF)
pub const ABSORPTION_GLYPH: &str = "\u{e1ff}";
/// Red heart with color codes
pub const HEALTH_ASCII: &str = "\u{a7}c\u{2764}\u{a7}r";
/// Yellow heart with color codes
pub const ABSORPTION_ASCII: &str = "\u{a7}e\u{2764}\u{a7}r";

/// Fill placeholders; `None` when the template is disabled
pub fn render(template: &str, vars: &[(&str, &str)]) -> Option<String> {
    if template.trim().is_empty() {
        return None;
    }
    let mut text = template.to_string();
    for (placeholder, value) in vars {
        text = text.replace(placeholder, value);
    }
    Some(text)
}

/// `20` rather than `20.0`, `9.5` stays
fn format_points(points: f32) -> String {
    let rounded = (points * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Health segment of a kill message, e.g. `20❤ 4❤`
pub fn health_indicator(health: Health, use_glyphs: bool) -> String {
    let (heart, golden) = if use_glyphs {
        (HEALTH_GLYPH, ABSORPTION_GLYPH)
    } else {
        (HEALTH_ASCII, ABSORPTION_ASCII)
    };

    let mut text = format!("{}{}", format_points(health.current.max(0.0)), heart);
    if health.absorption > 0.0 {
        text.push(' ');
        text.push_str(&format_points(health.absorption));
        text.push_str(golden);
    }
    text
}

/// Send a rendered message to one player
pub fn tell<M: Messenger + ?Sized>(messenger: &mut M, to: PlayerId, text: &str) {
    if let Err(e) = messenger.send(to, text) {
        warn!("Failed to message player {}: {}", to, e);
    }
}

/// Broadcast a rendered message to everyone
pub fn announce<M: Messenger + ?Sized>(messenger: &mut M, text: &str) {
    if let Err(e) = messenger.broadcast(text) {
        warn!("Failed to broadcast message: {}", e);
    }
}
