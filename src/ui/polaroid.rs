use cgmath::{Deg, Rad};
use iced::widget::image::Handle;
use iced::widget::{column, container, image, text, Space};
use iced::{Alignment, ContentFit, Element, Length, Padding, Radians, Rotation};

use super::{ACCENT, CARD_WIDTH};
use crate::carousel::view::Pose;
use crate::carousel::{CardItem, Placement};
use crate::Message;

/// Container padding that shifts a centred child by (dx, dy).
///
/// Padding one side by twice the offset moves the centre by the offset.
pub fn offset_padding(dx: f32, dy: f32) -> Padding {
    Padding {
        top: (2.0 * dy).max(0.0),
        right: (-2.0 * dx).max(0.0),
        bottom: (-2.0 * dy).max(0.0),
        left: (2.0 * dx).max(0.0),
    }
}

fn rotation(pose: &Pose) -> Rotation {
    let Rad(radians) = Rad::from(Deg(pose.rotate_deg));
    Rotation::Floating(Radians(radians))
}

/// One polaroid, posed and centred in the stage
pub fn card<'a>(placement: &Placement<'_>, handle: Handle) -> Element<'a, Message> {
    let pose = placement.pose;
    let width = (CARD_WIDTH * pose.scale).max(1.0);

    let photo = image(handle)
        .width(Length::Fixed(width))
        .content_fit(ContentFit::Contain)
        .rotation(rotation(&pose))
        .opacity(pose.opacity.clamp(0.0, 1.0));

    container(photo)
        .center(Length::Fill)
        .padding(offset_padding(pose.x, pose.y))
        .into()
}

/// Caption of the front card, with a badge for guest photos
pub fn caption_bar<'a>(front: Option<&CardItem>) -> Element<'a, Message> {
    let Some(card) = front else {
        return Space::with_height(Length::Fixed(56.0)).into();
    };

    let mut content = column![text(card.caption.clone()).size(22)]
        .spacing(6)
        .align_x(Alignment::Center);

    if let Some(badge) = card.provenance.badge() {
        content = content.push(text(badge).size(14).color(ACCENT));
    }

    container(content).center_x(Length::Fill).into()
}

/// Shown instead of the stack when there is nothing to draw
pub fn empty_state<'a>(loading: bool) -> Element<'a, Message> {
    let message = if loading { "Loading photos..." } else { "No polaroids to display" };
    container(text(message).size(18)).center(Length::Fill).into()
}
