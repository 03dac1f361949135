use iced::mouse::{self, Cursor};
use iced::touch;
use iced::widget::canvas::{self, Path, Program, Stroke, Text};
use iced::{alignment, Color, Pixels, Point, Rectangle, Renderer, Size, Theme};

use super::ACCENT;
use crate::carousel::GestureOutputs;
use crate::Message;

/// Radius of the commit indicators at scale 1
const INDICATOR_RADIUS: f32 = 22.0;
/// Gap between the card edge and an indicator's centre
const INDICATOR_GAP: f32 = 56.0;

/// Transparent layer over the card stack.
///
/// Captures mouse and touch drags that start on the front card and draws
/// the two commit indicators, scaled by the live gesture.
pub struct GestureLayer {
    pub outputs: GestureOutputs,
    /// Size of the front card, centred in the layer
    pub card_size: Size,
    /// False when there is no card to grab
    pub enabled: bool,
}

impl GestureLayer {
    fn card_bounds(&self, bounds: Rectangle) -> Rectangle {
        Rectangle::new(
            Point::new(
                bounds.x + (bounds.width - self.card_size.width) / 2.0,
                bounds.y + (bounds.height - self.card_size.height) / 2.0,
            ),
            self.card_size,
        )
    }

    fn start(&self, state: &mut DragState, pointer: Pointer, position: Point, bounds: Rectangle) -> Option<Message> {
        if !self.enabled || state.pointer.is_some() || !self.card_bounds(bounds).contains(position) {
            return None;
        }
        state.pointer = Some(pointer);
        state.origin_x = position.x;
        Some(Message::DragStarted)
    }
}

impl Program<Message> for GestureLayer {
    type State = DragState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let message = match event {
            // Mouse button press - start dragging if over the front card
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(position) = cursor.position() else {
                    return (canvas::event::Status::Ignored, None);
                };
                self.start(state, Pointer::Mouse, position, bounds)
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                (state.pointer == Some(Pointer::Mouse)).then(|| Message::Dragged(position.x - state.origin_x))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.release(Pointer::Mouse)
            }

            canvas::Event::Touch(touch::Event::FingerPressed { id, position }) => {
                self.start(state, Pointer::Finger(id), position, bounds)
            }
            canvas::Event::Touch(touch::Event::FingerMoved { id, position }) => {
                (state.pointer == Some(Pointer::Finger(id))).then(|| Message::Dragged(position.x - state.origin_x))
            }
            canvas::Event::Touch(touch::Event::FingerLifted { id, .. })
            | canvas::Event::Touch(touch::Event::FingerLost { id, .. }) => state.release(Pointer::Finger(id)),

            _ => None,
        };

        match message {
            Some(message) => (canvas::event::Status::Captured, Some(message)),
            None => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        if !self.enabled {
            return vec![];
        }

        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let center_y = bounds.height / 2.0;
        let half_card = self.card_size.width / 2.0;

        let left_x = (bounds.width / 2.0 - half_card - INDICATOR_GAP).max(INDICATOR_RADIUS * 1.5);
        let right_x = (bounds.width / 2.0 + half_card + INDICATOR_GAP).min(bounds.width - INDICATOR_RADIUS * 1.5);

        draw_indicator(&mut frame, Point::new(left_x, center_y), self.outputs.forward_indicator_scale, "‹");
        draw_indicator(&mut frame, Point::new(right_x, center_y), self.outputs.backward_indicator_scale, "›");

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(&self, state: &Self::State, bounds: Rectangle, cursor: Cursor) -> mouse::Interaction {
        if state.pointer == Some(Pointer::Mouse) {
            mouse::Interaction::Grabbing
        } else if self.enabled && cursor.is_over(self.card_bounds(bounds)) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Scale is unclamped upstream; long drags can push it below zero
fn draw_indicator(frame: &mut canvas::Frame, center: Point, scale: f32, glyph: &str) {
    let scale = scale.max(0.0);
    if scale == 0.0 {
        return;
    }
    let radius = INDICATOR_RADIUS * scale;

    let circle = Path::circle(center, radius);
    frame.fill(&circle, Color::WHITE);
    frame.stroke(&circle, Stroke::default().with_width(2.0).with_color(ACCENT));

    frame.fill_text(Text {
        content: glyph.to_string(),
        position: center,
        color: ACCENT,
        size: Pixels(28.0 * scale),
        horizontal_alignment: alignment::Horizontal::Center,
        vertical_alignment: alignment::Vertical::Center,
        ..Text::default()
    });
}

/// Which pointer owns the drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Mouse,
    Finger(touch::Finger),
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub pointer: Option<Pointer>,
    /// Pointer x where the drag started, in window coordinates
    pub origin_x: f32,
}

impl DragState {
    fn release(&mut self, pointer: Pointer) -> Option<Message> {
        if self.pointer == Some(pointer) {
            self.pointer = None;
            Some(Message::DragReleased)
        } else {
            None
        }
    }
}
