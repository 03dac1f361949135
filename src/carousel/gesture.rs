/// Swipe gesture interpretation for the front card
///
/// The drag offset `x` (px, 0 = rest) drives four visual outputs through a
/// fixed three-point table over `[-B, 0, B]`. On release, the gesture
/// commits when it went past `B` or was flicked faster than `V`;
/// otherwise `x` springs back to 0.
///
/// Direction mapping: dragging left (negative `x`) moves forward to the
/// next card, dragging right moves back to the previous one.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::CarouselConfig;

/// Velocity is averaged over this much trailing history
const VELOCITY_WINDOW: Duration = Duration::from_millis(150);

/// Spring integration step
const SPRING_STEP: f32 = 1.0 / 240.0;
/// Frames arriving after a long stall are not integrated past this
const MAX_FRAME_DT: f32 = 0.064;
const SETTLE_POSITION: f32 = 0.5;
const SETTLE_VELOCITY: f32 = 10.0;

/// Which way the stack moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Next card; the front card leaves to the left
    Forward,
    /// Previous card; the departing card leaves to the right
    Backward,
}

impl SwipeDirection {
    /// Direction implied by a signed offset or velocity
    pub fn from_sign(value: f32) -> Option<Self> {
        if value < 0.0 {
            Some(SwipeDirection::Forward)
        } else if value > 0.0 {
            Some(SwipeDirection::Backward)
        } else {
            None
        }
    }

    /// -1 for leftward motion, +1 for rightward
    pub fn sign(self) -> f32 {
        match self {
            SwipeDirection::Forward => -1.0,
            SwipeDirection::Backward => 1.0,
        }
    }
}

/// Piecewise-linear map through three control points.
///
/// Outside `[input[0], input[2]]` the nearest segment is extended, so long
/// drags keep exaggerating instead of stopping at the table's edge.
pub fn interpolate(x: f32, input: [f32; 3], output: [f32; 3]) -> f32 {
    let (x0, x1, y0, y1) = if x <= input[1] {
        (input[0], input[1], output[0], output[1])
    } else {
        (input[1], input[2], output[1], output[2])
    };

    if x == x0 {
        return y0;
    }
    if x == x1 {
        return y1;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Visual outputs derived from the drag offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureOutputs {
    /// Horizontal card displacement (px), overshooting the raw drag
    pub displacement: f32,
    /// How far the card rises (px, positive = up)
    pub lift: f32,
    pub rotation_deg: f32,
    /// Indicator on the left (forward) side
    pub forward_indicator_scale: f32,
    /// Indicator on the right (backward) side
    pub backward_indicator_scale: f32,
}

impl GestureOutputs {
    pub const REST: GestureOutputs = GestureOutputs {
        displacement: 0.0,
        lift: 0.0,
        rotation_deg: 0.0,
        forward_indicator_scale: 1.0,
        backward_indicator_scale: 1.0,
    };

    /// Evaluate the control-point tables at offset `x` with boundary `b`
    pub fn at(x: f32, b: f32) -> Self {
        let input = [-b, 0.0, b];
        Self {
            displacement: interpolate(x, input, [-200.0, 0.0, 200.0]),
            lift: interpolate(x, input, [50.0, 0.0, 50.0]),
            rotation_deg: interpolate(x, input, [-40.0, 0.0, 40.0]),
            forward_indicator_scale: interpolate(x, input, [0.3, 1.0, 3.0]),
            backward_indicator_scale: interpolate(x, input, [3.0, 1.0, 0.3]),
        }
    }
}

/// Decide a release: commit past the boundary or above the speed limit.
///
/// Direction is the sign of the offset at release. A pure flick from the
/// rest position falls back to the velocity's sign.
pub fn release_direction(
    offset: f32,
    velocity: f32,
    boundary: f32,
    velocity_threshold: f32,
) -> Option<SwipeDirection> {
    if offset.abs() > boundary || velocity.abs() > velocity_threshold {
        SwipeDirection::from_sign(offset).or_else(|| SwipeDirection::from_sign(velocity))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    offset: f32,
    at: Instant,
}

/// Tracks recent drag samples to estimate release velocity
#[derive(Debug, Default)]
pub struct VelocityTracker {
    history: VecDeque<Sample>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset: f32, at: Instant) {
        // Out-of-order samples would give a negative time span
        if let Some(last) = self.history.back() {
            if at < last.at {
                log::trace!("Ignoring drag sample older than the last one");
                return;
            }
        }
        self.history.push_back(Sample { offset, at });
        self.trim(at);
    }

    fn trim(&mut self, now: Instant) {
        while let Some(first) = self.history.front() {
            if now.duration_since(first.at) > VELOCITY_WINDOW {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Mean velocity (px/s) over the trailing window ending at `now`
    pub fn velocity(&mut self, now: Instant) -> f32 {
        self.trim(now);
        let (Some(first), Some(last)) = (self.history.front(), self.history.back()) else {
            return 0.0;
        };
        let span = last.at.duration_since(first.at).as_secs_f32();
        if span == 0.0 {
            return 0.0;
        }
        (last.offset - first.offset) / span
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Damped spring pulling a value back to 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub position: f32,
    pub velocity: f32,
    stiffness: f32,
    damping: f32,
    last_tick: Instant,
}

impl Spring {
    pub fn new(position: f32, velocity: f32, stiffness: f32, damping: f32, now: Instant) -> Self {
        Self {
            position,
            velocity,
            stiffness,
            damping,
            last_tick: now,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.position.abs() < SETTLE_POSITION && self.velocity.abs() < SETTLE_VELOCITY
    }

    /// Integrate up to `now`; returns true once the spring has settled
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut remaining = now
            .saturating_duration_since(self.last_tick)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        self.last_tick = now;

        while remaining > 0.0 {
            let dt = remaining.min(SPRING_STEP);
            let accel = -self.stiffness * self.position - self.damping * self.velocity;
            self.velocity += accel * dt;
            self.position += self.velocity * dt;
            remaining -= dt;
        }

        if self.is_settled() {
            self.position = 0.0;
            self.velocity = 0.0;
            true
        } else {
            false
        }
    }
}

/// Outcome of letting go of the card
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Counted as a swipe; `offset` and `velocity` are the card's state
    /// when it was let go
    Commit {
        direction: SwipeDirection,
        offset: f32,
        velocity: f32,
    },
    /// Snapping back to rest
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Dragging { offset: f32 },
    Returning(Spring),
}

/// Drag state of the front card
#[derive(Debug)]
pub struct SwipeGesture {
    boundary: f32,
    velocity_threshold: f32,
    stiffness: f32,
    damping: f32,
    phase: Phase,
    tracker: VelocityTracker,
}

impl SwipeGesture {
    pub fn new(config: &CarouselConfig) -> Self {
        Self {
            boundary: config.boundary_px,
            velocity_threshold: config.velocity_threshold,
            stiffness: config.spring_stiffness,
            damping: config.spring_damping,
            phase: Phase::Idle,
            tracker: VelocityTracker::new(),
        }
    }

    /// Current offset `x`
    pub fn offset(&self) -> f32 {
        match self.phase {
            Phase::Idle => 0.0,
            Phase::Dragging { offset } => offset,
            Phase::Returning(spring) => spring.position,
        }
    }

    pub fn outputs(&self) -> GestureOutputs {
        match self.phase {
            Phase::Idle => GestureOutputs::REST,
            _ => GestureOutputs::at(self.offset(), self.boundary),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// True while the snap-back spring still needs frames
    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Returning(_))
    }

    /// Pointer went down on the card. Grabbing a returning card continues
    /// from where the spring currently has it.
    pub fn begin(&mut self, now: Instant) {
        let offset = self.offset();
        self.tracker.clear();
        self.tracker.push(offset, now);
        self.phase = Phase::Dragging { offset };
    }

    /// Latest pointer sample; only the newest one matters
    pub fn drag_to(&mut self, offset: f32, now: Instant) {
        if let Phase::Dragging { .. } = self.phase {
            self.phase = Phase::Dragging { offset };
            self.tracker.push(offset, now);
        }
    }

    /// Pointer went up. Commits reset `x` to 0 immediately (the stack
    /// animates the departing card); cancels hand `x` to the spring.
    pub fn release(&mut self, now: Instant) -> Release {
        let Phase::Dragging { offset } = self.phase else {
            return Release::Cancel;
        };

        let velocity = self.tracker.velocity(now);
        self.tracker.clear();

        match release_direction(offset, velocity, self.boundary, self.velocity_threshold) {
            Some(direction) => {
                log::debug!(
                    "Swipe committed {:?} at {:.0}px, {:.0}px/s",
                    direction,
                    offset,
                    velocity
                );
                self.phase = Phase::Idle;
                Release::Commit {
                    direction,
                    offset,
                    velocity,
                }
            }
            None => {
                self.spring_back(offset, velocity, now);
                Release::Cancel
            }
        }
    }

    /// Animate `x` from `offset` back to 0. Also used when a committed
    /// swipe is refused by the stack, so the card never jumps.
    pub fn spring_back(&mut self, offset: f32, velocity: f32, now: Instant) {
        let spring = Spring::new(offset, velocity, self.stiffness, self.damping, now);
        self.phase = if spring.is_settled() {
            Phase::Idle
        } else {
            Phase::Returning(spring)
        };
    }

    /// Advance the snap-back spring
    pub fn tick(&mut self, now: Instant) {
        if let Phase::Returning(ref mut spring) = self.phase {
            if spring.tick(now) {
                self.phase = Phase::Idle;
            }
        }
    }

    /// Drop any drag or spring in progress
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.tracker.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: f32 = 150.0;
    const V: f32 = 800.0;

    fn gesture() -> SwipeGesture {
        SwipeGesture::new(&CarouselConfig::default())
    }

    #[test]
    fn test_boundary_values_are_exact() {
        let left = GestureOutputs::at(-B, B);
        assert_eq!(left.displacement, -200.0);
        assert_eq!(left.lift, 50.0);
        assert_eq!(left.rotation_deg, -40.0);
        assert_eq!(left.forward_indicator_scale, 0.3);
        assert_eq!(left.backward_indicator_scale, 3.0);

        let right = GestureOutputs::at(B, B);
        assert_eq!(right.displacement, 200.0);
        assert_eq!(right.lift, 50.0);
        assert_eq!(right.rotation_deg, 40.0);
        assert_eq!(right.forward_indicator_scale, 3.0);
        assert_eq!(right.backward_indicator_scale, 0.3);

        assert_eq!(GestureOutputs::at(0.0, B), GestureOutputs::REST);
    }

    #[test]
    fn test_interpolation_is_linear_between_points() {
        let half = GestureOutputs::at(75.0, B);
        assert!((half.displacement - 100.0).abs() < 1e-4);
        assert!((half.lift - 25.0).abs() < 1e-4);
        assert!((half.rotation_deg - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_extrapolates_past_boundary() {
        let far = GestureOutputs::at(-300.0, B);
        assert!((far.displacement + 400.0).abs() < 1e-3);
        assert!((far.lift - 100.0).abs() < 1e-3);
        assert!((far.rotation_deg + 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_slow_short_release_does_not_commit() {
        for offset in [-B, -100.0, -0.5, 0.0, 42.0, B] {
            for velocity in [-V, -300.0, 0.0, 500.0, V] {
                assert_eq!(release_direction(offset, velocity, B, V), None);
            }
        }
    }

    #[test]
    fn test_long_release_commits_by_offset_sign() {
        for velocity in [-5_000.0, 0.0, 5_000.0] {
            assert_eq!(
                release_direction(-B - 1.0, velocity, B, V),
                Some(SwipeDirection::Forward)
            );
            assert_eq!(
                release_direction(B + 1.0, velocity, B, V),
                Some(SwipeDirection::Backward)
            );
        }
    }

    #[test]
    fn test_flick_commits_by_offset_sign() {
        // Direction follows the offset, not the flick
        assert_eq!(
            release_direction(-20.0, 1_200.0, B, V),
            Some(SwipeDirection::Forward)
        );
        assert_eq!(
            release_direction(30.0, -900.0, B, V),
            Some(SwipeDirection::Backward)
        );
        // From rest the velocity decides
        assert_eq!(
            release_direction(0.0, -900.0, B, V),
            Some(SwipeDirection::Forward)
        );
    }

    #[test]
    fn test_velocity_tracker() {
        let start = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.push(0.0, start);
        tracker.push(-50.0, start + Duration::from_millis(50));
        tracker.push(-100.0, start + Duration::from_millis(100));

        let v = tracker.velocity(start + Duration::from_millis(100));
        assert!((v + 1_000.0).abs() < 1.0);

        // Old samples age out
        assert_eq!(tracker.velocity(start + Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn test_tracker_ignores_out_of_order_samples() {
        let start = Instant::now();
        let mut tracker = VelocityTracker::new();
        tracker.push(0.0, start + Duration::from_millis(20));
        tracker.push(500.0, start);

        assert_eq!(tracker.velocity(start + Duration::from_millis(20)), 0.0);
    }

    #[test]
    fn test_slow_drag_springs_back_to_rest() {
        let start = Instant::now();
        let mut g = gesture();
        g.begin(start);
        // 100px over a second: well under both thresholds
        for i in 1..=10 {
            g.drag_to(10.0 * i as f32, start + Duration::from_millis(100 * i));
        }
        let released = start + Duration::from_millis(1_000);
        assert_eq!(g.release(released), Release::Cancel);
        assert!(g.is_animating());
        assert!(g.offset() > 0.0);

        let mut now = released;
        for _ in 0..200 {
            now += Duration::from_millis(16);
            g.tick(now);
        }
        assert!(!g.is_animating());
        assert_eq!(g.offset(), 0.0);
        assert_eq!(g.outputs(), GestureOutputs::REST);
    }

    #[test]
    fn test_fast_flick_commits_before_boundary() {
        let start = Instant::now();
        let mut g = gesture();
        g.begin(start);
        g.drag_to(-40.0, start + Duration::from_millis(20));
        g.drag_to(-80.0, start + Duration::from_millis(40));

        let release = g.release(start + Duration::from_millis(40));
        let Release::Commit {
            direction,
            offset,
            velocity,
        } = release
        else {
            panic!("expected a commit, got {release:?}");
        };
        assert_eq!(direction, SwipeDirection::Forward);
        assert_eq!(offset, -80.0);
        assert!(velocity < -V);
        assert_eq!(g.offset(), 0.0);
        assert!(!g.is_animating());
    }

    #[test]
    fn test_long_slow_drag_commits() {
        let start = Instant::now();
        let mut g = gesture();
        g.begin(start);
        g.drag_to(160.0, start + Duration::from_secs(2));

        let release = g.release(start + Duration::from_secs(3));
        assert!(matches!(
            release,
            Release::Commit {
                direction: SwipeDirection::Backward,
                ..
            }
        ));
    }

    #[test]
    fn test_spring_back_from_refused_commit() {
        let start = Instant::now();
        let mut g = gesture();
        g.spring_back(-200.0, -500.0, start);

        assert!(g.is_animating());
        assert_eq!(g.offset(), -200.0);

        let mut now = start;
        for _ in 0..200 {
            now += Duration::from_millis(16);
            g.tick(now);
        }
        assert!(!g.is_animating());
        assert_eq!(g.offset(), 0.0);
    }

    #[test]
    fn test_moves_without_press_are_ignored() {
        let mut g = gesture();
        g.drag_to(120.0, Instant::now());
        assert_eq!(g.offset(), 0.0);
        assert_eq!(g.release(Instant::now()), Release::Cancel);
    }

    #[test]
    fn test_regrab_continues_from_spring_position() {
        let start = Instant::now();
        let mut g = gesture();
        g.begin(start);
        g.drag_to(100.0, start + Duration::from_millis(500));
        g.release(start + Duration::from_millis(800));

        g.tick(start + Duration::from_millis(816));
        let mid = g.offset();
        g.begin(start + Duration::from_millis(820));

        assert!(g.is_dragging());
        assert_eq!(g.offset(), mid);
    }
}
