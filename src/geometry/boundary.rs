use super::Point2;
use rand::Rng;
use std::f64::consts::PI;

/// An axis-aligned bounding box, `(min, max)`.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point2,
    pub max: Point2,
}

impl Aabb {
    pub fn new(min: Point2, max: Point2) -> Self {
        Aabb { min, max }
    }

    pub fn volume(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0) * (self.max.y - self.min.y).max(0.0)
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb::new(
            Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }
}

/// Uniform sample over a closed box `[lo, hi]`.
pub fn sample_box<R: Rng + ?Sized>(rng: &mut R, lo: Point2, hi: Point2) -> Point2 {
    super::sample_uniform_box(rng, lo, hi)
}

/// Uniform sample over a disc of given center/radius.
///
/// Uses the same rejection-free polar method as the original Python
/// implementation (`BallBoundary2D.sample` in `spaces/maps2d.py`): draw two
/// uniforms, fold their sum back under 1 to get a radius with the correct
/// area-proportional density, then pick a uniform angle.
pub fn sample_ball<R: Rng + ?Sized>(rng: &mut R, center: Point2, radius: f64) -> Point2 {
    let r0: f64 = rng.gen_range(0.0..1.0);
    let r1: f64 = rng.gen_range(0.0..1.0);
    let mut rr = r0 + r1;
    if rr > 1.0 {
        rr = 2.0 - rr;
    }
    let rad = radius * rr;
    let theta = 2.0 * PI * rng.gen_range(0.0..1.0);
    Point2::new(center.x + rad * theta.cos(), center.y + rad * theta.sin())
}

/// Slab-interval clip test: does the open segment `(src, dest)`, or `src`
/// alone when `dest` is `None`, intersect the box `[lo, hi]`?
///
/// Direct port of `BoxBoundary2D.intersects` (`spaces/maps2d.py`).
pub fn box_intersects(lo: Point2, hi: Point2, src: Point2, dest: Option<Point2>) -> bool {
    match dest {
        None => lo.x <= src.x && src.x <= hi.x && lo.y <= src.y && src.y <= hi.y,
        Some(dest) => {
            let diff = (dest.x - src.x, dest.y - src.y);
            let eps = f64::EPSILON * 8.0;
            let mut u = (0.0_f64, 0.0_f64);
            let mut v = (1.0_f64, 1.0_f64);

            if diff.0.abs() < eps {
                if !(lo.x <= src.x && src.x <= hi.x) {
                    return false;
                }
            } else {
                u.0 = (lo.x - src.x) / diff.0;
                v.0 = (hi.x - src.x) / diff.0;
            }

            if diff.1.abs() < eps {
                if !(lo.y <= src.y && src.y <= hi.y) {
                    return false;
                }
            } else {
                u.1 = (lo.y - src.y) / diff.1;
                v.1 = (hi.y - src.y) / diff.1;
            }

            u.0.max(u.1).max(0.0) <= v.0.min(v.1).min(1.0)
        }
    }
}

/// Closest-point-on-segment-to-center ball intersection test.
///
/// Direct port of `BallBoundary2D.intersects` (`spaces/maps2d.py`): project
/// the center onto the line through `(src, dest)`, clamp to `[0, 1]`, and
/// compare the resulting distance to the radius.
pub fn ball_intersects(center: Point2, radius: f64, src: Point2, dest: Option<Point2>) -> bool {
    match dest {
        None => center.dist(&src) <= radius,
        Some(dest) => {
            let u = (dest.x - src.x, dest.y - src.y);
            let w = (center.x - src.x, center.y - src.y);
            let denom = u.0 * u.0 + u.1 * u.1;
            let lambda = if denom.abs() < f64::EPSILON {
                0.0
            } else {
                (w.0 * u.0 + w.1 * u.1) / denom
            };
            let lambda = lambda.clamp(0.0, 1.0);
            let closest = (src.x + lambda * u.0, src.y + lambda * u.1);
            let d = ((center.x - closest.0).powi(2) + (center.y - closest.1).powi(2)).sqrt();
            d <= radius
        }
    }
}
