/// Polaroid carousel engine
///
/// This module is UI-toolkit agnostic:
/// - Card model (card.rs)
/// - Jitter for the messy stack look (jitter.rs)
/// - Swipe gesture interpretation (gesture.rs)
/// - Card stack state machine (stack.rs)
/// - Composition into drawable placements (view.rs)
/// - Timing curves (easing.rs)
///
/// `Carousel` ties the pieces together for the application.

pub mod card;
pub mod easing;
pub mod gesture;
pub mod jitter;
pub mod stack;
pub mod view;

use std::time::Instant;

pub use card::{CardItem, Provenance, SourceItem};
pub use gesture::{GestureOutputs, Release, SwipeDirection};
pub use stack::CardStack;
pub use view::{Layout, Placement};

use crate::config::CarouselConfig;
use gesture::SwipeGesture;
use view::Timing;

#[derive(Debug)]
pub struct Carousel {
    stack: CardStack,
    gesture: SwipeGesture,
    timing: Timing,
}

impl Carousel {
    pub fn new(items: Vec<SourceItem>, config: &CarouselConfig) -> Self {
        Self::from_stack(CardStack::new(items, config), config)
    }

    /// Build around an existing stack (seeded RNG in tests)
    pub fn from_stack(stack: CardStack, config: &CarouselConfig) -> Self {
        Self {
            stack,
            gesture: SwipeGesture::new(config),
            timing: Timing::from(config),
        }
    }

    pub fn stack(&self) -> &CardStack {
        &self.stack
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Swap in a freshly fetched list. The window is re-seeded; a drag in
    /// progress is dropped since its card may be gone.
    pub fn replace_items(&mut self, items: Vec<SourceItem>) {
        self.gesture.reset();
        self.stack.replace_source(items);
    }

    /// Next/previous button or arrow key
    pub fn step(&mut self, direction: SwipeDirection, now: Instant) -> bool {
        self.stack.request_advance(direction, now)
    }

    pub fn press(&mut self, now: Instant) {
        if self.stack.front().is_some() {
            self.gesture.begin(now);
        }
    }

    pub fn drag_to(&mut self, offset: f32, now: Instant) {
        self.gesture.drag_to(offset, now);
    }

    /// Let go of the front card. Returns the direction the stack moved, if
    /// the release committed and the stack accepted it. A refused commit
    /// springs back like a cancelled drag.
    pub fn release(&mut self, now: Instant) -> Option<SwipeDirection> {
        match self.gesture.release(now) {
            Release::Commit {
                direction,
                offset,
                velocity,
            } => {
                if self.stack.request_swipe(direction, offset, now) {
                    Some(direction)
                } else {
                    self.gesture.spring_back(offset, velocity, now);
                    None
                }
            }
            Release::Cancel => None,
        }
    }

    /// Advance springs and transition timers
    pub fn tick(&mut self, now: Instant) {
        self.gesture.tick(now);
        self.stack.tick(now);
    }

    /// True while frames are needed
    pub fn is_animating(&self) -> bool {
        self.gesture.is_dragging() || self.gesture.is_animating() || self.stack.is_transitioning()
    }

    /// Live gesture outputs (indicator scales included)
    pub fn gesture_outputs(&self) -> GestureOutputs {
        self.gesture.outputs()
    }

    pub fn layout(&self, now: Instant) -> Layout<'_> {
        view::layout(&self.stack, &self.gesture.outputs(), &self.timing, now)
    }

    /// Clear everything in flight (window closing)
    pub fn shutdown(&mut self) {
        self.gesture.reset();
        self.stack.cancel();
    }
}
