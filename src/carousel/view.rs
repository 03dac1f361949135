/// Carousel view composition
///
/// Turns the card stack and the live gesture into an ordered list of
/// placements (bottom to top) that the UI draws as-is. Everything here is
/// a pure function of its inputs, so it can be tested without a window.

use std::time::{Duration, Instant};

use super::card::{CardItem, Transform};
use super::easing::{lerp, EASE_IN_OUT_EXIT, EASE_OUT_EXPO};
use super::gesture::{GestureOutputs, SwipeDirection};
use super::stack::{CardStack, Transition};
use crate::config::CarouselConfig;

/// Animation role of a card, by position from the front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRole {
    Current,
    Upcoming,
    UpcomingSecond,
    /// Hidden pose new cards fade in from
    Remaining,
    Exit(SwipeDirection),
}

impl CardRole {
    pub fn for_depth(depth: usize) -> Self {
        match depth {
            0 => CardRole::Current,
            1 => CardRole::Upcoming,
            2 => CardRole::UpcomingSecond,
            _ => CardRole::Remaining,
        }
    }

    pub fn pose(self) -> Pose {
        match self {
            CardRole::Current => Pose::REST,
            CardRole::Upcoming => Pose {
                y: 40.0,
                scale: 0.9,
                rotate_deg: 15.0,
                ..Pose::REST
            },
            CardRole::UpcomingSecond => Pose {
                y: 60.0,
                scale: 0.85,
                rotate_deg: -10.0,
                ..Pose::REST
            },
            CardRole::Remaining => Pose {
                opacity: 0.0,
                y: 20.0,
                scale: 0.9,
                ..Pose::REST
            },
            CardRole::Exit(direction) => Pose {
                opacity: 0.0,
                x: 100.0 * direction.sign(),
                y: 40.0,
                rotate_deg: 20.0 * direction.sign(),
                scale: 1.0,
            },
        }
    }

    /// Jitter is for the cards underneath; the front card stays straight
    fn takes_jitter(self) -> bool {
        matches!(self, CardRole::Upcoming | CardRole::UpcomingSecond)
    }
}

/// Where and how a card is drawn, relative to the stack's centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub opacity: f32,
    /// Horizontal offset in px (positive = right)
    pub x: f32,
    /// Vertical offset in px (positive = down)
    pub y: f32,
    pub scale: f32,
    pub rotate_deg: f32,
}

impl Pose {
    pub const REST: Pose = Pose {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotate_deg: 0.0,
    };

    pub fn lerp(from: Pose, to: Pose, t: f32) -> Pose {
        Pose {
            opacity: lerp(from.opacity, to.opacity, t),
            x: lerp(from.x, to.x, t),
            y: lerp(from.y, to.y, t),
            scale: lerp(from.scale, to.scale, t),
            rotate_deg: lerp(from.rotate_deg, to.rotate_deg, t),
        }
    }

    fn with_transform(self, transform: Option<Transform>) -> Pose {
        let Some(t) = transform else {
            return self;
        };
        Pose {
            x: self.x + t.translate.x,
            y: self.y + t.translate.y,
            rotate_deg: self.rotate_deg + t.rotate.0,
            ..self
        }
    }

    fn with_gesture(self, g: &GestureOutputs) -> Pose {
        Pose {
            x: self.x + g.displacement,
            y: self.y - g.lift,
            rotate_deg: self.rotate_deg + g.rotation_deg,
            ..self
        }
    }
}

/// Resting pose for a card in a role, jitter included
fn settled_pose(role: CardRole, card: &CardItem) -> Pose {
    if role.takes_jitter() {
        role.pose().with_transform(card.transform)
    } else {
        role.pose()
    }
}

/// Animation timings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub exit: Duration,
    pub role: Duration,
    /// Gesture boundary, to rebuild the front card's pose at release
    pub boundary: f32,
}

impl From<&CarouselConfig> for Timing {
    fn from(config: &CarouselConfig) -> Self {
        Self {
            exit: config.exit_duration(),
            role: config.role_duration(),
            boundary: config.boundary_px,
        }
    }
}

fn progress(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

/// A card ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub card: &'a CardItem,
    /// Role the card is settling into
    pub role: CardRole,
    pub pose: Pose,
    /// Receives drag input
    pub is_front: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layout<'a> {
    /// Nothing to show
    Empty,
    /// Bottom to top
    Cards(Vec<Placement<'a>>),
}

/// Compose the stack into placements at time `now`
pub fn layout<'a>(stack: &'a CardStack, gesture: &GestureOutputs, timing: &Timing, now: Instant) -> Layout<'a> {
    if stack.is_empty() {
        return Layout::Empty;
    }

    let window = stack.window();
    let len = window.len();
    let transition = stack.transition();

    let role_t = transition
        .map(|t| EASE_OUT_EXPO.ease(progress(now.saturating_duration_since(t.started_at), timing.role)))
        .unwrap_or(1.0);

    let mut placements: Vec<Placement<'a>> = Vec::with_capacity(len + 1);

    // A card leaving from the back goes under everything else
    if let Some(t) = transition.filter(|t| t.departing_depth > 0) {
        placements.push(departing_placement(t, timing, now));
    }

    for (index, card) in window.iter().enumerate() {
        let depth = len - 1 - index;
        let role = CardRole::for_depth(depth);
        let target = settled_pose(role, card);

        let mut pose = match transition {
            Some(t) if role_t < 1.0 => {
                let from = match t.direction {
                    SwipeDirection::Forward if index == 0 => CardRole::Remaining.pose(),
                    SwipeDirection::Forward => settled_pose(CardRole::for_depth(depth + 1), card),
                    SwipeDirection::Backward if depth == 0 => CardRole::Exit(SwipeDirection::Backward).pose(),
                    // The card that was dragged moves back from where it was let go
                    SwipeDirection::Backward if depth == 1 => released_pose(t, timing),
                    SwipeDirection::Backward => settled_pose(CardRole::for_depth(depth - 1), card),
                };
                Pose::lerp(from, target, role_t)
            }
            _ => target,
        };

        let is_front = depth == 0;
        if is_front {
            pose = pose.with_gesture(gesture);
        }

        placements.push(Placement {
            card,
            role,
            pose,
            is_front,
        });
    }

    // A card swiped off the front stays on top while it flies out
    if let Some(t) = transition.filter(|t| t.departing_depth == 0) {
        placements.push(departing_placement(t, timing, now));
    }

    Layout::Cards(placements)
}

/// Pose of the front card at the moment a drag was released
fn released_pose(t: &Transition, timing: &Timing) -> Pose {
    Pose::REST.with_gesture(&GestureOutputs::at(t.release_offset, timing.boundary))
}

fn departing_placement<'a>(
    t: &'a Transition,
    timing: &Timing,
    now: Instant,
) -> Placement<'a> {
    let exit_t = EASE_IN_OUT_EXIT.ease(progress(now.saturating_duration_since(t.started_at), timing.exit));
    let role = CardRole::Exit(t.direction);

    let from = if t.departing_depth == 0 {
        released_pose(t, timing)
    } else {
        settled_pose(CardRole::for_depth(t.departing_depth), &t.departing)
    };

    Placement {
        card: &t.departing,
        role,
        pose: Pose::lerp(from, role.pose(), exit_t),
        is_front: false,
    }
}
