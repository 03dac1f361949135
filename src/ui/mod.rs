/// Widgets for the polaroid carousel
///
/// - Card rendering and caption bar (polaroid.rs)
/// - Drag capture and commit indicators (gesture_layer.rs)

pub mod gesture_layer;
pub mod polaroid;

use iced::theme::Palette;
use iced::{Color, Size, Theme};

use crate::photos::loader;

/// On-screen width of a card at scale 1
pub const CARD_WIDTH: f32 = 300.0;
/// Height of the area the stack is drawn in
pub const STAGE_HEIGHT: f32 = 560.0;

/// Rose accent used for indicators and the guest badge
pub const ACCENT: Color = Color {
    r: 0.855,
    g: 0.302,
    b: 0.451,
    a: 1.0,
};

/// On-screen size of a framed card, keeping the decoded aspect ratio
pub fn card_size(photo_width: u32) -> Size {
    let (w, h) = loader::framed_size(photo_width);
    Size::new(CARD_WIDTH, CARD_WIDTH * h as f32 / w as f32)
}

/// Warm light theme
pub fn theme() -> Theme {
    Theme::custom(
        "Blush".to_string(),
        Palette {
            background: Color::from_rgb8(0xFF, 0xF4, 0xF2),
            text: Color::from_rgb8(0x3F, 0x2A, 0x2E),
            primary: ACCENT,
            success: Color::from_rgb8(0x4C, 0x9A, 0x6A),
            danger: Color::from_rgb8(0xC2, 0x41, 0x3B),
        },
    )
}
