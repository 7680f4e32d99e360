//! Geometric predicates over the `xy` projection of mesh coordinates.
//!
//! Every predicate here uses plain `f64` arithmetic with strict
//! comparisons; degeneracy (collinear / cocircular input) is broken by the
//! caller via the jitter step in [`crate::delaunay`], not by exact
//! arithmetic.

use geo::Coord;

use crate::error::{MeshError, MeshResult};

/// Arithmetic mean of a set of points. Returns the origin for an empty set.
pub fn centroid(points: &[Coord<f64>]) -> Coord<f64> {
    if points.is_empty() {
        return Coord { x: 0.0, y: 0.0 };
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Coord {
        x: sx / n,
        y: sy / n,
    }
}

/// Axis-aligned bounding box as `(min, max)` corners. Returns `(origin,
/// origin)` for an empty set.
pub fn bounding_box(points: &[Coord<f64>]) -> (Coord<f64>, Coord<f64>) {
    if points.is_empty() {
        let z = Coord { x: 0.0, y: 0.0 };
        return (z, z);
    }
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Euclidean distance between two points.
pub fn distance(p: Coord<f64>, q: Coord<f64>) -> f64 {
    ((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).sqrt()
}

fn cross2(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Whether `p` lies inside triangle `[a, b, c]`, via a same-sign check of
/// the three edge cross products. When `inclusive`, a zero cross product
/// (on an edge) counts as inside.
pub fn is_point_in_triangle(p: Coord<f64>, [a, b, c]: [Coord<f64>; 3], inclusive: bool) -> bool {
    let d1 = cross2(a, b, p);
    let d2 = cross2(b, c, p);
    let d3 = cross2(c, a, p);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    if inclusive {
        !(has_neg && has_pos)
    } else {
        !(has_neg && has_pos) && d1 != 0.0 && d2 != 0.0 && d3 != 0.0
    }
}

/// Whether `p` lies inside `polygon` (closed implicitly: the last vertex
/// connects back to the first) via ray casting.
pub fn is_point_in_polygon(p: Coord<f64>, polygon: &[Coord<f64>]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = polygon[i];
        let vj = polygon[j];
        let crosses = (vi.y > p.y) != (vj.y > p.y);
        if crosses {
            let x_intersect = (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x;
            if p.x < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// The unique circle through three points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Coord<f64>,
    pub radius: f64,
}

/// Computes the circle through `a`, `b`, `c`. Fails with
/// [`MeshError::Degenerate`] when the three points are collinear.
pub fn circle_from_points(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> MeshResult<Circle> {
    let ax = a.x;
    let ay = a.y;
    let bx = b.x;
    let by = b.y;
    let cx = c.x;
    let cy = c.y;

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-12 {
        return Err(MeshError::Degenerate);
    }

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;

    let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
    let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;

    let center = Coord { x: ux, y: uy };
    let radius = distance(center, a);
    Ok(Circle { center, radius })
}

/// Whether `p` lies strictly inside `circle` (strict `<` on distance).
pub fn is_point_in_circle(p: Coord<f64>, circle: &Circle) -> bool {
    distance(p, circle.center) < circle.radius
}

/// `t` must lie in the open interval `(0, 1)`; otherwise returns
/// [`MeshError::InvalidParameter`].
pub fn check_split_parameter(t: f64) -> MeshResult<()> {
    if t <= 0.0 || t >= 1.0 {
        Err(MeshError::InvalidParameter(format!(
            "split parameter t={t} is not in (0, 1)"
        )))
    } else {
        Ok(())
    }
}
