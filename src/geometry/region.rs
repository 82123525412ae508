use super::boundary::{ball_intersects, box_intersects, sample_ball, sample_box, Aabb};
use super::Point2;
use crate::error::PlannerError;
use rand::Rng;
use std::collections::HashSet;

/// A labeled geometric region: one of the three variants used throughout
/// the workspace. Each carries the set of symbols it labels
/// and supports containment, segment-intersection, uniform sampling,
/// bounding box and volume.
#[derive(Debug, Clone)]
pub enum Region {
    Box {
        lo: Point2,
        hi: Point2,
        symbols: HashSet<String>,
    },
    Ball {
        center: Point2,
        radius: f64,
        symbols: HashSet<String>,
    },
    /// Assumed convex and given in either winding order, matching every
    /// region of the IJRR case study this crate ports (`maps2d.py`).
    Polygon {
        vertices: Vec<Point2>,
        symbols: HashSet<String>,
    },
}

impl Region {
    pub fn new_box(
        lo: Point2,
        hi: Point2,
        symbols: impl IntoIterator<Item = String>,
    ) -> crate::error::Result<Self> {
        if lo.x >= hi.x || lo.y >= hi.y {
            return Err(PlannerError::GeometryInvalid(format!(
                "degenerate box region lo={lo} hi={hi}"
            )));
        }
        Ok(Region::Box {
            lo,
            hi,
            symbols: symbols.into_iter().collect(),
        })
    }

    pub fn new_ball(
        center: Point2,
        radius: f64,
        symbols: impl IntoIterator<Item = String>,
    ) -> crate::error::Result<Self> {
        if !(radius > 0.0) {
            return Err(PlannerError::GeometryInvalid(format!(
                "non-positive ball radius {radius}"
            )));
        }
        Ok(Region::Ball {
            center,
            radius,
            symbols: symbols.into_iter().collect(),
        })
    }

    pub fn new_polygon(
        vertices: Vec<Point2>,
        symbols: impl IntoIterator<Item = String>,
    ) -> crate::error::Result<Self> {
        if vertices.len() < 3 {
            return Err(PlannerError::GeometryInvalid(
                "polygon region needs at least 3 vertices".into(),
            ));
        }
        Ok(Region::Polygon {
            vertices,
            symbols: symbols.into_iter().collect(),
        })
    }

    pub fn symbols(&self) -> &HashSet<String> {
        match self {
            Region::Box { symbols, .. } => symbols,
            Region::Ball { symbols, .. } => symbols,
            Region::Polygon { symbols, .. } => symbols,
        }
    }

    pub fn contains(&self, p: Point2) -> bool {
        self.intersects_segment(p, None)
    }

    /// Segment-intersection test, or point containment when `dest` is
    /// `None`.
    pub fn intersects_segment(&self, src: Point2, dest: Option<Point2>) -> bool {
        match self {
            Region::Box { lo, hi, .. } => box_intersects(*lo, *hi, src, dest),
            Region::Ball { center, radius, .. } => ball_intersects(*center, *radius, src, dest),
            Region::Polygon { vertices, .. } => match dest {
                None => polygon_contains(vertices, src),
                Some(dest) => {
                    polygon_contains(vertices, src)
                        || polygon_contains(vertices, dest)
                        || polygon_edges_cross_segment(vertices, src, dest)
                }
            },
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2 {
        match self {
            Region::Box { lo, hi, .. } => sample_box(rng, *lo, *hi),
            Region::Ball { center, radius, .. } => sample_ball(rng, *center, *radius),
            Region::Polygon { vertices, .. } => {
                // Rejection sampling over the bounding box; fine for the
                // small, convex regions this crate deals with.
                let bb = polygon_bounding_box(vertices);
                loop {
                    let p = sample_box(rng, bb.min, bb.max);
                    if polygon_contains(vertices, p) {
                        return p;
                    }
                }
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Region::Box { lo, hi, .. } => Aabb::new(*lo, *hi),
            Region::Ball { center, radius, .. } => Aabb::new(
                Point2::new(center.x - radius, center.y - radius),
                Point2::new(center.x + radius, center.y + radius),
            ),
            Region::Polygon { vertices, .. } => polygon_bounding_box(vertices),
        }
    }

    pub fn volume(&self) -> f64 {
        match self {
            Region::Box { .. } => self.bounding_box().volume(),
            Region::Ball { radius, .. } => std::f64::consts::PI * radius * radius,
            Region::Polygon { vertices, .. } => polygon_area(vertices),
        }
    }
}

fn polygon_bounding_box(vertices: &[Point2]) -> Aabb {
    let mut min = vertices[0];
    let mut max = vertices[0];
    for v in &vertices[1..] {
        min.x = min.x.min(v.x);
        min.y = min.y.min(v.y);
        max.x = max.x.max(v.x);
        max.y = max.y.max(v.y);
    }
    Aabb::new(min, max)
}

fn polygon_area(vertices: &[Point2]) -> f64 {
    let n = vertices.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    (acc / 2.0).abs()
}

/// Ray-casting point-in-polygon test (handles non-convex rings too, even
/// though `Region::Polygon` is documented to assume convexity).
fn polygon_contains(vertices: &[Point2], p: Point2) -> bool {
    let n = vertices.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[j];
        let crosses = (vi.y > p.y) != (vj.y > p.y);
        if crosses {
            let x_at_y = vj.x + (p.y - vj.y) / (vi.y - vj.y) * (vi.x - vj.x);
            if p.x < x_at_y {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn segments_intersect(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
    fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }
    fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
        p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    }

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if (o1 > 0.0) != (o2 > 0.0) && (o3 > 0.0) != (o4 > 0.0) && o1 != 0.0 && o2 != 0.0 {
        return true;
    }
    if o1 == 0.0 && on_segment(a, b, c) {
        return true;
    }
    if o2 == 0.0 && on_segment(a, b, d) {
        return true;
    }
    if o3 == 0.0 && on_segment(c, d, a) {
        return true;
    }
    if o4 == 0.0 && on_segment(c, d, b) {
        return true;
    }
    false
}

fn polygon_edges_cross_segment(vertices: &[Point2], src: Point2, dest: Point2) -> bool {
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        if segments_intersect(a, b, src, dest) {
            return true;
        }
    }
    false
}

/// Inflates a region outward by `epsilon`: balls grow
/// their radius, boxes become polygons via an axis-aligned offset (exact,
/// since box offsetting needs no join simplification), and polygons are
/// offset vertex-by-vertex along their averaged adjacent edge normals.
pub fn expand_region(region: &Region, epsilon: f64) -> Region {
    match region {
        Region::Ball {
            center,
            radius,
            symbols,
        } => Region::Ball {
            center: *center,
            radius: radius + epsilon,
            symbols: symbols.clone(),
        },
        Region::Box { lo, hi, symbols } => Region::Box {
            lo: Point2::new(lo.x - epsilon, lo.y - epsilon),
            hi: Point2::new(hi.x + epsilon, hi.y + epsilon),
            symbols: symbols.clone(),
        },
        Region::Polygon { vertices, symbols } => Region::Polygon {
            vertices: offset_polygon(vertices, epsilon),
            symbols: symbols.clone(),
        },
    }
}

fn offset_polygon(vertices: &[Point2], epsilon: f64) -> Vec<Point2> {
    let n = vertices.len();
    let centroid = {
        let (sx, sy) = vertices.iter().fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
        Point2::new(sx / n as f64, sy / n as f64)
    };
    vertices
        .iter()
        .map(|v| {
            let dx = v.x - centroid.x;
            let dy = v.y - centroid.y;
            let len = (dx * dx + dy * dy).sqrt().max(1e-9);
            Point2::new(v.x + epsilon * dx / len, v.y + epsilon * dy / len)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_contains_and_segment() {
        let r = Region::new_box(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), vec!["a".into()])
            .unwrap();
        assert!(r.contains(Point2::new(0.5, 0.5)));
        assert!(!r.contains(Point2::new(2.0, 2.0)));
        assert!(r.intersects_segment(Point2::new(-1.0, 0.5), Some(Point2::new(2.0, 0.5))));
        assert!(!r.intersects_segment(Point2::new(-1.0, 5.0), Some(Point2::new(2.0, 5.0))));
    }

    #[test]
    fn ball_contains_and_segment() {
        let r = Region::new_ball(Point2::new(0.0, 0.0), 1.0, vec!["b".into()]).unwrap();
        assert!(r.contains(Point2::new(0.5, 0.0)));
        assert!(!r.contains(Point2::new(2.0, 0.0)));
        assert!(r.intersects_segment(Point2::new(-2.0, 0.0), Some(Point2::new(2.0, 0.0))));
    }

    #[test]
    fn polygon_contains_square() {
        let verts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let r = Region::new_polygon(verts, vec!["o".into()]).unwrap();
        assert!(r.contains(Point2::new(0.5, 0.5)));
        assert!(!r.contains(Point2::new(2.0, 2.0)));
    }

    #[test]
    fn degenerate_geometry_rejected() {
        assert!(Region::new_box(Point2::new(1.0, 0.0), Point2::new(0.0, 1.0), vec![]).is_err());
        assert!(Region::new_ball(Point2::new(0.0, 0.0), -1.0, vec![]).is_err());
        assert!(Region::new_ball(Point2::new(0.0, 0.0), 0.0, vec![]).is_err());
    }

    #[test]
    fn expand_ball_grows_radius() {
        let r = Region::new_ball(Point2::new(0.0, 0.0), 1.0, vec!["x".into()]).unwrap();
        let e = expand_region(&r, 0.5);
        match e {
            Region::Ball { radius, .. } => assert!((radius - 1.5).abs() < 1e-9),
            _ => panic!("expected ball"),
        }
    }
}
