use nalgebra as na;

/// Project a 3D point onto the floor plane (x, z)
#[inline]
pub fn floor_projection(point: &na::Point3<f64>) -> na::Point2<f64> {
    na::Point2::new(point.x, point.z)
}

/// Round to a fixed number of decimals
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round both coordinates of a floor point
pub fn round_point(point: na::Point2<f64>, decimals: u32) -> na::Point2<f64> {
    na::Point2::new(round_to(point.x, decimals), round_to(point.y, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(-0.004, 2), -0.0);
        assert_eq!(round_to(98.1, 0), 98.0);
    }

    #[test]
    fn test_floor_projection_drops_height() {
        let p = floor_projection(&na::Point3::new(1.0, 2.0, 3.0));
        assert_eq!(p, na::Point2::new(1.0, 3.0));
    }
}
