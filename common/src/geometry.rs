//! Pure numeric helpers shared by the tick scheduler and the AI contract:
//! angle normalization, the turn governor, trail sampling, and the
//! radial spawn distributions used for snakes and food.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

const TAU: f64 = 2.0 * PI;

/// A point in the continuous arena. Full f64 precision; rounding only
/// happens when a point is encoded into a spectator snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn dist(&self, other: &Point) -> f64 {
        self.dist_sq(other).sqrt()
    }

    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

/// Returns the representative of `a` in `[0, 2*PI)`.
pub fn normalize_angle(a: f64) -> f64 {
    let r = a % TAU;
    if r < 0.0 { r + TAU } else { r }
}

/// Signed shortest-arc difference `to - from`, in `(-PI, PI]`.
pub fn angle_diff(from: f64, to: f64) -> f64 {
    let diff = normalize_angle(to) - normalize_angle(from);
    if diff > PI {
        diff - TAU
    } else if diff <= -PI {
        diff + TAU
    } else {
        diff
    }
}

/// The turn governor: rate-limits an arbitrary participant-chosen target
/// heading to at most `max_rate` radians of change from `current`.
pub fn turn_toward(current: f64, target: f64, max_rate: f64) -> f64 {
    let diff = angle_diff(current, target);
    if diff.abs() <= max_rate {
        normalize_angle(target)
    } else {
        normalize_angle(current + max_rate * diff.signum())
    }
}

pub fn is_in_bounds(x: f64, y: f64, arena_radius: f64) -> bool {
    x * x + y * y < arena_radius * arena_radius
}

/// Samples up to `segment_count` positions along `trail`'s polyline,
/// starting at `trail[0]` and walking the arc length in `spacing`
/// increments, linearly interpolating between consecutive trail vertices.
pub fn segment_positions(trail: &[Point], segment_count: usize, spacing: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(segment_count.min(trail.len().max(1)));
    let Some(&head) = trail.first() else {
        return out;
    };
    out.push(head);
    if segment_count <= 1 || trail.len() < 2 {
        out.truncate(segment_count);
        return out;
    }

    let mut target_arc = spacing;
    let mut accumulated = 0.0;
    let mut i = 0;
    while i + 1 < trail.len() && out.len() < segment_count {
        let a = trail[i];
        let b = trail[i + 1];
        let seg_len = a.dist(&b);
        if seg_len <= f64::EPSILON {
            i += 1;
            continue;
        }
        while accumulated + seg_len >= target_arc && out.len() < segment_count {
            let t = (target_arc - accumulated) / seg_len;
            out.push(a.lerp(&b, t.clamp(0.0, 1.0)));
            target_arc += spacing;
        }
        accumulated += seg_len;
        i += 1;
    }

    out
}

/// Total arc length of a polyline, used to decide how much trail history
/// to retain.
pub fn trail_arc_length(trail: &[Point]) -> f64 {
    trail.windows(2).map(|w| w[0].dist(&w[1])).sum()
}

/// Prunes `trail` in place so that at most `max_arc_length` of arc length
/// is retained, measured from the head.
pub fn prune_trail(trail: &mut Vec<Point>, max_arc_length: f64) {
    if trail.len() < 2 {
        return;
    }
    let mut accumulated = 0.0;
    let mut cutoff = trail.len();
    for i in 0..trail.len() - 1 {
        accumulated += trail[i].dist(&trail[i + 1]);
        if accumulated > max_arc_length {
            cutoff = i + 2;
            break;
        }
    }
    trail.truncate(cutoff.min(trail.len()));
}

/// Polar sample for a respawn point: angle uniform in `[0, 2*PI)`, radius
/// uniform in `[0.5R, 0.8R]`. Heading faces the arena center, perturbed by
/// up to `PI/4` either way.
pub fn spawn_position(arena_radius: f64, rng: &mut impl Rng) -> (Point, f64) {
    let angle = rng.random_range(0.0..TAU);
    let radius = rng.random_range(0.5 * arena_radius..0.8 * arena_radius);
    let x = radius * angle.cos();
    let y = radius * angle.sin();

    let toward_center = (-y).atan2(-x);
    let perturbation = rng.random_range(-PI / 4.0..=PI / 4.0);
    let heading = normalize_angle(toward_center + perturbation);

    (Point::new(x, y), heading)
}

/// Uniform sample over the arena disk, used to place food.
pub fn spawn_food_position(arena_radius: f64, rng: &mut impl Rng) -> Point {
    let angle = rng.random_range(0.0..TAU);
    let u: f64 = rng.random_range(0.0..1.0);
    let radius = arena_radius * u.sqrt() * 0.95;
    Point::new(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_angle_is_in_range() {
        assert!((normalize_angle(-0.1) - (TAU - 0.1)).abs() < 1e-9);
        assert!((normalize_angle(TAU + 0.2) - 0.2).abs() < 1e-9);
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn angle_diff_shortest_arc() {
        assert!((angle_diff(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-9);
        assert!((angle_diff(0.1, -0.1) + 0.2).abs() < 1e-9);
        assert!((angle_diff(0.0, PI) - PI).abs() < 1e-9);
    }

    #[test]
    fn turn_toward_clamps_to_max_rate() {
        let result = turn_toward(0.0, PI, 0.25);
        assert!((angle_diff(0.0, result) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn turn_toward_reaches_target_within_rate() {
        let result = turn_toward(0.0, 0.1, 0.25);
        assert!((result - 0.1).abs() < 1e-9);
    }

    #[test]
    fn segment_positions_starts_at_head() {
        let trail = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)];
        let segs = segment_positions(&trail, 3, 5.0);
        assert_eq!(segs[0], trail[0]);
        assert!(segs.len() <= 3);
    }

    #[test]
    fn prune_trail_respects_cap() {
        let mut trail: Vec<Point> = (0..50).map(|i| Point::new(i as f64 * 2.0, 0.0)).collect();
        prune_trail(&mut trail, 20.0);
        assert!(trail_arc_length(&trail) <= 22.0);
    }

    proptest! {
        #[test]
        fn turn_governor_never_exceeds_max_rate(
            current in -10.0f64..10.0,
            target in -10.0f64..10.0,
            max_rate in 0.001f64..1.0,
        ) {
            let result = turn_toward(current, target, max_rate);
            let diff = angle_diff(normalize_angle(current), result).abs();
            prop_assert!(diff <= max_rate + 1e-9);
        }

        #[test]
        fn normalize_angle_always_in_range(a in -1000.0f64..1000.0) {
            let n = normalize_angle(a);
            prop_assert!(n >= 0.0 && n < TAU);
        }
    }
}
