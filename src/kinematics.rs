use serde::{Deserialize, Serialize};

use crate::{odometry_math::find_normalized_angle, point::FloatPoint};

/// Continuous robot state: pose plus the last applied velocity command.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct KinematicState {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub v: f64,
    pub yaw_rate: f64,
}

/// Linear and angular velocity command.
#[derive(Copy, Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Control {
    pub v: f64,
    pub yaw_rate: f64,
}

impl Control {
    pub fn new(v: f64, yaw_rate: f64) -> Self {
        Self { v, yaw_rate }
    }
}

impl KinematicState {
    /// At rest at `(x, y)` facing `yaw`.
    pub fn at_rest(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            yaw,
            ..Self::default()
        }
    }

    pub fn position(&self) -> FloatPoint {
        FloatPoint::new([self.x, self.y])
    }

    pub fn heading(&self) -> f64 {
        find_normalized_angle(self.yaw)
    }

    /// Unicycle model, one Euler step of `dt`. Translation uses the heading
    /// from before the step; velocities jump straight to the command.
    pub fn step(&mut self, control: Control, dt: f64) {
        self.x += control.v * self.yaw.cos() * dt;
        self.y += control.v * self.yaw.sin() * dt;
        self.yaw += control.yaw_rate * dt;
        self.v = control.v;
        self.yaw_rate = control.yaw_rate;
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn test_straight_step() {
        let mut state = KinematicState::at_rest(1.0, 2.0, 0.0);
        state.step(Control::new(0.5, 0.0), 0.1);
        assert!((state.x - 1.05).abs() < 1e-12);
        assert_eq!(state.y, 2.0);
        assert_eq!(state.v, 0.5);
        assert_eq!(state.yaw_rate, 0.0);
    }

    #[test]
    fn test_translation_uses_previous_heading() {
        let mut state = KinematicState::at_rest(0.0, 0.0, PI / 2.0);
        state.step(Control::new(1.0, 1.0), 1.0);
        assert!(state.x.abs() < 1e-12);
        assert!((state.y - 1.0).abs() < 1e-12);
        assert!((state.yaw - (PI / 2.0 + 1.0)).abs() < 1e-12);
        assert_eq!(state.yaw_rate, 1.0);
    }

    #[test]
    fn test_heading_is_normalized() {
        let state = KinematicState::at_rest(0.0, 0.0, 3.0 * PI / 2.0);
        assert!((state.heading() + PI / 2.0).abs() < 1e-9);
        assert_eq!(state.position(), FloatPoint::new([0.0, 0.0]));
    }
}
