//! Scenario configuration loaded from YAML.

use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    PlannerKind,
    astar::GridPathPlanner,
    dwa::{DwaConfig, DynamicWindowPlanner},
    grid::OccupancyGrid,
    kinematics::KinematicState,
    obstacles::DynamicObstacle,
    odometry_math::find_goal_heading,
    point::GridPoint,
};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSection {
    pub width: i64,
    pub height: i64,
}

impl Default for MapSection {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
        }
    }
}

/// Vehicle drawn by a renderer; carried through for callers, unused by planners.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarSection {
    pub speed: f64,
    pub length: f64,
    pub width: f64,
}

fn default_max_iterations() -> usize {
    1000
}

/// Everything needed to run one planning request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub map: MapSection,
    pub start: [i64; 2],
    pub goal: [i64; 2],
    #[serde(default)]
    pub static_obstacles: Vec<[i64; 2]>,
    #[serde(default)]
    pub algorithm: PlannerKind,
    /// Control-cycle budget for the kinodynamic planner.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<CarSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_obstacles: Vec<DynamicObstacle>,
    #[serde(default)]
    pub dwa: DwaConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            map: MapSection::default(),
            start: [0, 0],
            goal: [19, 19],
            static_obstacles: vec![],
            algorithm: PlannerKind::default(),
            max_iterations: default_max_iterations(),
            car: None,
            dynamic_obstacles: vec![],
            dwa: DwaConfig::default(),
        }
    }
}

/// Values given on the command line that replace the file's.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioOverrides {
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub start: Option<[i64; 2]>,
    pub goal: Option<[i64; 2]>,
    pub algorithm: Option<PlannerKind>,
    pub max_iterations: Option<usize>,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_yaml(&contents)?;
        info!("Loaded scenario from {}", path.display());
        Ok(config)
    }

    /// Falls back to the built-in scenario when `path` does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("{} not found, using the default scenario", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width <= 0 || self.map.height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "map dimensions must be positive, got {}x{}",
                self.map.width, self.map.height
            )));
        }
        let d = &self.dwa;
        for (name, value) in [
            ("dwa.dt", d.dt),
            ("dwa.predict_time", d.predict_time),
            ("dwa.v_resolution", d.v_resolution),
            ("dwa.yaw_rate_resolution", d.yaw_rate_resolution),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        for (name, value) in [
            ("dwa.max_yaw_rate", d.max_yaw_rate),
            ("dwa.max_accel", d.max_accel),
            ("dwa.max_dyaw_rate", d.max_dyaw_rate),
            ("dwa.goal_tolerance", d.goal_tolerance),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        if d.min_speed > d.max_speed {
            return Err(ConfigError::Invalid(format!(
                "dwa.min_speed {} exceeds dwa.max_speed {}",
                d.min_speed, d.max_speed
            )));
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ScenarioOverrides) -> Result<(), ConfigError> {
        if let Some(width) = overrides.width {
            self.map.width = width;
        }
        if let Some(height) = overrides.height {
            self.map.height = height;
        }
        if let Some(start) = overrides.start {
            self.start = start;
        }
        if let Some(goal) = overrides.goal {
            self.goal = goal;
        }
        if let Some(algorithm) = overrides.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(max_iterations) = overrides.max_iterations {
            self.max_iterations = max_iterations;
        }
        self.validate()
    }

    pub fn start_point(&self) -> GridPoint {
        GridPoint::from(self.start)
    }

    pub fn goal_point(&self) -> GridPoint {
        GridPoint::from(self.goal)
    }

    pub fn grid(&self) -> OccupancyGrid {
        OccupancyGrid::new(
            self.map.width,
            self.map.height,
            self.static_obstacles.iter().copied().map(GridPoint::from),
        )
    }

    pub fn grid_planner(&self) -> GridPathPlanner {
        GridPathPlanner::new(self.grid())
    }

    pub fn dwa_planner(&self) -> DynamicWindowPlanner {
        let obstacles = self
            .static_obstacles
            .iter()
            .map(|c| GridPoint::from(*c).to_float())
            .collect();
        DynamicWindowPlanner::new(self.map.width, self.map.height, obstacles, self.dwa.clone())
    }

    /// At rest on the start cell, facing the goal.
    pub fn dwa_start_state(&self) -> KinematicState {
        let start = self.start_point().to_float();
        let yaw = find_goal_heading(start, self.goal_point().to_float());
        KinematicState::at_rest(start.x(), start.y(), yaw)
    }
}
