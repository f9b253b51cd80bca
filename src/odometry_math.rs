use crate::point::FloatPoint;

pub fn find_goal_heading(p1: FloatPoint, p2: FloatPoint) -> f64 {
    (p2[1] - p1[1]).atan2(p2[0] - p1[0])
}

pub fn find_euclidean_distance(p1: FloatPoint, p2: FloatPoint) -> f64 {
    p1.euclidean_distance(p2)
}

const PI: f64 = std::f64::consts::PI;

/// Maps `angle` into (-pi, pi].
pub fn find_normalized_angle(angle: f64) -> f64 {
    let mut angle = floored_modulo(angle, 2.0 * PI);
    if angle > PI {
        angle -= 2.0 * PI;
    }
    angle
}

pub fn find_angle_diff(angle1: f64, angle2: f64) -> f64 {
    find_normalized_angle(angle1 - angle2)
}

/// Remainder carrying the sign of the divisor.
fn floored_modulo(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && a.signum() != b.signum() {
        r + b
    } else {
        r
    }
}
