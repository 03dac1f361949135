/// Card stack controller
///
/// Owns the circular source list and the visible window (at most three
/// cards, ordered back to front: the last element is the active card).
///
/// - Forward: the front card departs and the source item after the back
///   card is pulled in at the back.
/// - Backward: the back card departs and the source item before the front
///   card is pulled in on top.
///
/// Pulled cards are always new `CardItem`s with a fresh id and jitter, so
/// stepping forward n times and back n times gives the same photos in the
/// same order, but never the same cards.
///
/// While a transition is in flight further requests are dropped (not
/// queued) until the settle delay has passed.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use super::card::{CardItem, SourceItem};
use super::gesture::SwipeDirection;
use super::jitter::{self, JitterMagnitudes};
use crate::config::CarouselConfig;

/// Maximum number of cards on screen
pub const MAX_DEPTH: usize = 3;

/// A transition in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub direction: SwipeDirection,
    pub started_at: Instant,
    /// The card leaving the window, kept around for its exit animation
    pub departing: CardItem,
    /// Depth (0 = front) the departing card had when it left
    pub departing_depth: usize,
    /// Drag offset at release; 0 for button presses
    pub release_offset: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StackState {
    Idle,
    Transitioning(Transition),
}

#[derive(Debug)]
pub struct CardStack {
    source: Vec<SourceItem>,
    /// Back to front
    window: Vec<CardItem>,
    next_id: u64,
    state: StackState,
    rng: StdRng,
    jitter: JitterMagnitudes,
    settle_delay: Duration,
}

impl CardStack {
    pub fn new(source: Vec<SourceItem>, config: &CarouselConfig) -> Self {
        Self::with_rng(source, config, StdRng::from_os_rng())
    }

    /// Same as `new` with a caller-provided RNG (seeded in tests)
    pub fn with_rng(source: Vec<SourceItem>, config: &CarouselConfig, rng: StdRng) -> Self {
        let mut stack = Self {
            source,
            window: Vec::with_capacity(MAX_DEPTH),
            next_id: 0,
            state: StackState::Idle,
            rng,
            jitter: JitterMagnitudes::from(config),
            settle_delay: config.exit_duration(),
        };
        stack.seed();
        stack
    }

    /// Fill the window with the last `depth` source items
    fn seed(&mut self) {
        self.window.clear();
        let len = self.source.len();
        let depth = len.min(MAX_DEPTH);
        let front = len - depth;

        for index in (front..len).rev() {
            let card = self.pull(index);
            self.window.push(card);
        }

        log::debug!("Seeded card stack with {} of {} photos", depth, len);
    }

    /// Build a fresh card for a source position
    fn pull(&mut self, index: usize) -> CardItem {
        let transform = jitter::generate(&mut self.rng, &self.jitter);
        let card = CardItem::from_source(&self.source[index], index, self.next_id, Some(transform));
        self.next_id += 1;
        card
    }

    /// Replace the source list wholesale (refresh) and re-seed.
    /// Ids keep counting up so nothing collides with a card still animating
    /// out in the view.
    pub fn replace_source(&mut self, source: Vec<SourceItem>) {
        self.cancel();
        self.source = source;
        self.seed();
    }

    pub fn source(&self) -> &[SourceItem] {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Visible cards, back to front
    pub fn window(&self) -> &[CardItem] {
        &self.window
    }

    pub fn front(&self) -> Option<&CardItem> {
        self.window.last()
    }

    /// Source items the next step in either direction would pull in,
    /// for prefetching their images
    pub fn upcoming_sources(&self) -> Vec<&SourceItem> {
        let len = self.source.len();
        let (Some(back), Some(front)) = (self.window.first(), self.window.last()) else {
            return Vec::new();
        };
        if len <= 1 {
            return Vec::new();
        }
        let next = (back.source_index + 1) % len;
        let previous = (front.source_index + len - 1) % len;
        if next == previous {
            vec![&self.source[next]]
        } else {
            vec![&self.source[next], &self.source[previous]]
        }
    }

    pub fn transition(&self) -> Option<&Transition> {
        match &self.state {
            StackState::Idle => None,
            StackState::Transitioning(transition) => Some(transition),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, StackState::Transitioning(_))
    }

    #[cfg(test)]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Move the stack one step. Returns false if the request was ignored.
    pub fn request_advance(&mut self, direction: SwipeDirection, now: Instant) -> bool {
        self.request_swipe(direction, 0.0, now)
    }

    /// Move the stack one step after a drag released at `release_offset`
    pub fn request_swipe(&mut self, direction: SwipeDirection, release_offset: f32, now: Instant) -> bool {
        let len = self.source.len();
        if len <= 1 {
            return false;
        }
        if self.is_transitioning() {
            log::debug!("Dropping {:?} request, transition in flight", direction);
            return false;
        }

        let (departing, departing_depth) = match direction {
            SwipeDirection::Forward => {
                let Some(back) = self.window.first().map(|c| c.source_index) else {
                    return false;
                };
                let Some(departing) = self.window.pop() else {
                    return false;
                };
                let incoming = self.pull((back + 1) % len);
                self.window.insert(0, incoming);
                (departing, 0)
            }
            SwipeDirection::Backward => {
                let Some(front) = self.window.last().map(|c| c.source_index) else {
                    return false;
                };
                let depth = self.window.len();
                let departing = self.window.remove(0);
                let incoming = self.pull((front + len - 1) % len);
                self.window.push(incoming);
                (departing, depth - 1)
            }
        };

        log::debug!(
            "Stack moved {:?}: photo #{} left, front is now #{}",
            direction,
            departing.source_index,
            self.window.last().map(|c| c.source_index).unwrap_or_default()
        );

        self.state = StackState::Transitioning(Transition {
            direction,
            started_at: now,
            departing,
            departing_depth,
            release_offset,
        });
        true
    }

    /// Release the transition guard once the settle delay has passed.
    /// Returns true when this call finished a transition.
    pub fn tick(&mut self, now: Instant) -> bool {
        let settled = match &self.state {
            StackState::Transitioning(t) => now.saturating_duration_since(t.started_at) >= self.settle_delay,
            StackState::Idle => false,
        };
        if settled {
            self.state = StackState::Idle;
        }
        settled
    }

    /// Drop any transition in flight
    pub fn cancel(&mut self) {
        self.state = StackState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::card::Provenance;
    use rand::Rng;
    use std::collections::HashSet;

    fn items(n: usize) -> Vec<SourceItem> {
        (0..n)
            .map(|i| SourceItem::new(format!("/images/{i}.jpg"), format!("note {i}"), Provenance::Curated))
            .collect()
    }

    fn stack(n: usize) -> CardStack {
        CardStack::with_rng(items(n), &CarouselConfig::default(), StdRng::seed_from_u64(9))
    }

    fn indices(stack: &CardStack) -> Vec<usize> {
        stack.window().iter().map(|c| c.source_index).collect()
    }

    fn ids_unique(stack: &CardStack) -> bool {
        let ids: HashSet<u64> = stack.window().iter().map(|c| c.stable_id).collect();
        ids.len() == stack.window().len()
    }

    /// Step and immediately settle
    fn step(stack: &mut CardStack, direction: SwipeDirection, now: &mut Instant) -> bool {
        let moved = stack.request_advance(direction, *now);
        *now += stack.settle_delay();
        stack.tick(*now);
        moved
    }

    #[test]
    fn test_seeds_last_three() {
        let s = stack(5);
        assert_eq!(indices(&s), vec![4, 3, 2]);
        assert_eq!(s.front().map(|c| c.source_index), Some(2));
        assert!(s.window().iter().all(|c| c.transform.is_some()));
        assert!(ids_unique(&s));
    }

    #[test]
    fn test_forward_wraps_to_start() {
        let mut s = stack(5);
        let now = Instant::now();

        assert!(s.request_advance(SwipeDirection::Forward, now));

        let t = s.transition().unwrap();
        assert_eq!(t.departing.source_index, 2);
        assert_eq!(t.departing_depth, 0);
        assert_eq!(indices(&s), vec![0, 4, 3]);
        assert!(ids_unique(&s));
        assert!(s.window().iter().all(|c| c.stable_id != t.departing.stable_id));
    }

    #[test]
    fn test_backward_takes_previous_onto_front() {
        let mut s = stack(5);
        assert!(s.request_advance(SwipeDirection::Backward, Instant::now()));

        let t = s.transition().unwrap();
        assert_eq!(t.departing.source_index, 4);
        assert_eq!(t.departing_depth, 2);
        assert_eq!(indices(&s), vec![3, 2, 1]);
    }

    #[test]
    fn test_single_item_never_moves() {
        let mut s = stack(1);
        let mut now = Instant::now();
        for _ in 0..5 {
            assert!(!step(&mut s, SwipeDirection::Forward, &mut now));
            assert!(!step(&mut s, SwipeDirection::Backward, &mut now));
        }
        assert_eq!(indices(&s), vec![0]);
        assert_eq!(s.window()[0].stable_id, 0);
        assert!(!s.is_transitioning());
    }

    #[test]
    fn test_empty_source_is_valid() {
        let mut s = stack(0);
        assert!(s.is_empty());
        assert!(s.window().is_empty());
        assert!(s.front().is_none());
        assert!(!s.request_advance(SwipeDirection::Forward, Instant::now()));
    }

    #[test]
    fn test_two_items_alternate() {
        let mut s = stack(2);
        let mut now = Instant::now();
        assert_eq!(indices(&s), vec![1, 0]);

        step(&mut s, SwipeDirection::Forward, &mut now);
        assert_eq!(indices(&s), vec![0, 1]);
        step(&mut s, SwipeDirection::Forward, &mut now);
        assert_eq!(indices(&s), vec![1, 0]);
        assert!(ids_unique(&s));
    }

    #[test]
    fn test_requests_dropped_while_transitioning() {
        let mut s = stack(6);
        let start = Instant::now();

        assert!(s.request_advance(SwipeDirection::Forward, start));
        let after_first = indices(&s);

        // Rapid repeats inside the settle delay do nothing
        for ms in [10, 50, 120, 299] {
            let at = start + Duration::from_millis(ms);
            assert!(!s.tick(at));
            assert!(!s.request_advance(SwipeDirection::Forward, at));
            assert!(!s.request_advance(SwipeDirection::Backward, at));
        }
        assert_eq!(indices(&s), after_first);

        assert!(s.tick(start + Duration::from_millis(300)));
        assert!(!s.is_transitioning());
        assert!(s.request_advance(SwipeDirection::Forward, start + Duration::from_millis(301)));
    }

    #[test]
    fn test_round_trip_restores_content() {
        let mut now = Instant::now();
        for n in [2, 3, 4, 7] {
            for steps in 0..12 {
                let mut s = stack(n);
                let before: Vec<CardItem> = s.window().to_vec();

                for _ in 0..steps {
                    step(&mut s, SwipeDirection::Forward, &mut now);
                }
                for _ in 0..steps {
                    step(&mut s, SwipeDirection::Backward, &mut now);
                }

                assert_eq!(s.window().len(), before.len());
                for (a, b) in s.window().iter().zip(&before) {
                    assert!(a.same_content(b), "n={n} steps={steps}");
                }
            }
        }
    }

    #[test]
    fn test_random_sequences_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut now = Instant::now();

        for n in 1..=8 {
            let mut s = stack(n);
            for _ in 0..200 {
                let direction = if rng.random_bool(0.5) {
                    SwipeDirection::Forward
                } else {
                    SwipeDirection::Backward
                };
                // Sometimes hammer the stack without waiting for it to settle
                if rng.random_bool(0.3) {
                    s.request_advance(direction, now);
                    now += Duration::from_millis(5);
                    s.tick(now);
                } else {
                    step(&mut s, direction, &mut now);
                }

                assert_eq!(s.window().len(), n.min(MAX_DEPTH));
                assert!(ids_unique(&s));
                if let Some(t) = s.transition() {
                    assert!(s.window().iter().all(|c| c.stable_id != t.departing.stable_id));
                }
            }
        }
    }

    #[test]
    fn test_window_stays_contiguous() {
        let mut s = stack(7);
        let mut now = Instant::now();
        for _ in 0..20 {
            step(&mut s, SwipeDirection::Forward, &mut now);
            let idx = indices(&s);
            // Back to front, each card is the one before in the source list
            assert_eq!(idx[0], (idx[1] + 1) % 7);
            assert_eq!(idx[1], (idx[2] + 1) % 7);
        }
    }

    #[test]
    fn test_replace_source_reseeds_and_cancels() {
        let mut s = stack(5);
        s.request_advance(SwipeDirection::Forward, Instant::now());
        let highest = s.window().iter().map(|c| c.stable_id).max().unwrap();

        s.replace_source(items(2));

        assert!(!s.is_transitioning());
        assert_eq!(indices(&s), vec![1, 0]);
        assert!(s.window().iter().all(|c| c.stable_id > highest));
    }

    #[test]
    fn test_replace_with_empty_source() {
        let mut s = stack(4);
        s.replace_source(Vec::new());
        assert!(s.window().is_empty());
        assert!(!s.request_advance(SwipeDirection::Backward, Instant::now()));
    }

    #[test]
    fn test_upcoming_sources() {
        let s = stack(5);
        let upcoming: Vec<&str> = s.upcoming_sources().iter().map(|i| i.image_ref.as_str()).collect();
        assert_eq!(upcoming, vec!["/images/0.jpg", "/images/1.jpg"]);

        assert!(stack(1).upcoming_sources().is_empty());
        assert_eq!(stack(4).upcoming_sources().len(), 1);
    }

    #[test]
    fn test_cancel_releases_guard() {
        let mut s = stack(4);
        let now = Instant::now();
        s.request_swipe(SwipeDirection::Forward, -180.0, now);
        assert_eq!(s.transition().map(|t| t.release_offset), Some(-180.0));

        s.cancel();
        assert!(s.request_advance(SwipeDirection::Forward, now));
    }
}
