// Joint angle geometry

use crate::models::pose::{JointTriple, Point2D};

/// Interior angle at `b` between the rays `b -> a` and `b -> c`, in degrees.
///
/// Always in [0, 180]: a reflex difference of bearings is folded back to its
/// complement. Coincident points give 0 since `atan2(0, 0) == 0`.
pub fn calculate_angle(a: Point2D, b: Point2D, c: Point2D) -> f32 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Angle at the hinge of a resolved joint
pub fn joint_angle(joint: &JointTriple) -> f32 {
    calculate_angle(joint.proximal, joint.hinge, joint.distal)
}
