use serde::{Deserialize, Serialize};

use crate::point::FloatPoint;

/// Moving obstacles owned by the caller's simulation. Planners never read them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DynamicObstacle {
    Circular(CircularObstacle),
}

impl DynamicObstacle {
    pub fn advance(&mut self) {
        match self {
            DynamicObstacle::Circular(c) => c.advance(),
        }
    }

    pub fn position(&self) -> FloatPoint {
        match self {
            DynamicObstacle::Circular(c) => c.position(),
        }
    }
}

/// Point moving around `center` at `speed` radians per tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircularObstacle {
    pub center: [f64; 2],
    pub radius: f64,
    pub speed: f64,
    #[serde(rename = "initial_angle")]
    pub angle: f64,
    /// Starting position as configured; replaced by the orbit position after
    /// the first tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
}

impl CircularObstacle {
    pub fn advance(&mut self) {
        self.angle += self.speed;
        self.position = Some(self.orbit_position().coords());
    }

    pub fn position(&self) -> FloatPoint {
        self.position
            .map(FloatPoint::from)
            .unwrap_or_else(|| self.orbit_position())
    }

    fn orbit_position(&self) -> FloatPoint {
        FloatPoint::new([
            self.center[0] + self.radius * self.angle.cos(),
            self.center[1] + self.radius * self.angle.sin(),
        ])
    }
}
