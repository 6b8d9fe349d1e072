use nalgebra as na;

/// 2D cross product of (a - o) and (b - o)
#[inline]
fn cross(o: &na::Point2<f64>, a: &na::Point2<f64>, b: &na::Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull of a point set (monotone chain)
///
/// Returns the distinct hull corners counter-clockwise, starting at the
/// lowest-x, lowest-z point. Collinear points are dropped, so a segment
/// yields its two end points and a single repeated point yields one.
pub fn convex_hull(points: &[na::Point2<f64>]) -> Vec<na::Point2<f64>> {
    let mut pts: Vec<na::Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
    });
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<na::Point2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<na::Point2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Whether `point` lies inside or on the convex hull of `points`
pub fn hull_contains(points: &[na::Point2<f64>], point: &na::Point2<f64>) -> bool {
    let hull = convex_hull(points);
    match hull.len() {
        0 => false,
        1 => hull[0] == *point,
        2 => {
            let (a, b) = (&hull[0], &hull[1]);
            cross(a, b, point).abs() < 1e-9
                && point.x >= a.x.min(b.x) - 1e-9
                && point.x <= a.x.max(b.x) + 1e-9
                && point.y >= a.y.min(b.y) - 1e-9
                && point.y <= a.y.max(b.y) + 1e-9
        }
        n => (0..n).all(|i| cross(&hull[i], &hull[(i + 1) % n], point) >= -1e-9),
    }
}

/// Reduce a contact polygon to its extreme points (min x, min z, max x, max z)
///
/// Polygonal providers can emit many corners; four well spread points are
/// enough for the force distribution.
pub fn reduce_to_extreme_points(points: &[na::Point2<f64>]) -> Vec<na::Point2<f64>> {
    if points.len() <= 4 {
        return points.to_vec();
    }

    let mut min_x = points[0];
    let mut min_z = points[0];
    let mut max_x = points[0];
    let mut max_z = points[0];

    for p in points.iter().skip(1) {
        if p.x < min_x.x {
            min_x = *p;
        }
        if p.y < min_z.y {
            min_z = *p;
        }
        if p.x > max_x.x {
            max_x = *p;
        }
        if p.y > max_z.y {
            max_z = *p;
        }
    }

    let mut unique: Vec<na::Point2<f64>> = Vec::with_capacity(4);
    for p in [min_x, min_z, max_x, max_z] {
        if !unique.contains(&p) {
            unique.push(p);
        }
    }
    unique
}
