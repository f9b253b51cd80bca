//! Grid and kinodynamic path planning for a mobile agent on a 2D occupancy grid.
//!
//! Two interchangeable planners share the `find_path(start, goal)` contract:
//! [`astar::GridPathPlanner`] searches the 4-connected lattice of an
//! [`grid::OccupancyGrid`], and [`dwa::DynamicWindowPlanner`] drives a unicycle
//! model through continuous space with the Dynamic Window Approach.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod astar;
pub mod cmd;
pub mod config;
pub mod dwa;
pub mod executor;
pub mod grid;
pub mod kinematics;
pub mod obstacles;
pub mod odometry_math;
pub mod point;
pub mod render;
pub mod search_iter;

pub use astar::GridPathPlanner;
pub use config::ScenarioConfig;
pub use dwa::{DwaConfig, DynamicWindowPlanner};
pub use grid::OccupancyGrid;
pub use kinematics::KinematicState;

use point::{FloatPoint, GridPoint};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub enum PlannerKind {
    #[default]
    #[serde(rename = "astar")]
    GridSearch,
    #[serde(rename = "dwa")]
    Kinodynamic,
    /// Reserved selector; no sampling-based planner is provided.
    #[serde(rename = "rrt")]
    SamplingBased,
}

impl std::fmt::Display for PlannerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlannerKind::GridSearch => "astar",
            PlannerKind::Kinodynamic => "dwa",
            PlannerKind::SamplingBased => "rrt",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for PlannerKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "astar" => Ok(PlannerKind::GridSearch),
            "dwa" => Ok(PlannerKind::Kinodynamic),
            "rrt" => Ok(PlannerKind::SamplingBased),
            other => Err(PlanError::UnknownPlanner(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PlanError {
    #[error("{which} {position} is out of bounds or occupied")]
    InvalidEndpoint { which: Endpoint, position: GridPoint },
    #[error("no feasible path found")]
    NotFound,
    #[error("planner '{0}' is not implemented")]
    Unsupported(PlannerKind),
    #[error("unknown planner '{0}' (expected astar, dwa or rrt)")]
    UnknownPlanner(String),
}

/// Structured status of one planning request, for callers to log or display.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanReport {
    pub planner: PlannerKind,
    pub outcome: PlanOutcome,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    /// `length` is the waypoint count for grid paths and the travelled
    /// distance for continuous paths.
    Found {
        waypoints: Vec<FloatPoint>,
        length: f64,
    },
    Failed(PlanError),
}

impl PlanReport {
    pub fn from_grid(result: &Result<Vec<GridPoint>, PlanError>) -> Self {
        let outcome = match result {
            Ok(path) => PlanOutcome::Found {
                waypoints: path.iter().map(|p| p.to_float()).collect(),
                length: path.len() as f64,
            },
            Err(e) => PlanOutcome::Failed(e.clone()),
        };
        Self {
            planner: PlannerKind::GridSearch,
            outcome,
        }
    }

    pub fn from_continuous(result: &Result<Vec<FloatPoint>, PlanError>) -> Self {
        let outcome = match result {
            Ok(path) => PlanOutcome::Found {
                waypoints: path.clone(),
                length: path
                    .windows(2)
                    .map(|w| w[0].euclidean_distance(w[1]))
                    .sum(),
            },
            Err(e) => PlanOutcome::Failed(e.clone()),
        };
        Self {
            planner: PlannerKind::Kinodynamic,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PlanOutcome::Found { .. })
    }

    pub fn waypoints(&self) -> &[FloatPoint] {
        match &self.outcome {
            PlanOutcome::Found { waypoints, .. } => waypoints,
            PlanOutcome::Failed(_) => &[],
        }
    }
}

impl std::fmt::Display for PlanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            PlanOutcome::Found { waypoints, length } => match self.planner {
                PlannerKind::GridSearch => {
                    write!(f, "{}: path found through {} cells", self.planner, waypoints.len())
                }
                _ => write!(
                    f,
                    "{}: path found with {} points, {length:.2} long",
                    self.planner,
                    waypoints.len()
                ),
            },
            PlanOutcome::Failed(e) => write!(f, "{}: {e}", self.planner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_kind_names() {
        for kind in [
            PlannerKind::GridSearch,
            PlannerKind::Kinodynamic,
            PlannerKind::SamplingBased,
        ] {
            assert_eq!(kind.to_string().parse::<PlannerKind>(), Ok(kind));
        }
        assert_eq!(
            "prm".parse::<PlannerKind>(),
            Err(PlanError::UnknownPlanner("prm".to_string()))
        );
    }

    #[test]
    fn test_grid_report() {
        let path = vec![GridPoint::new([0, 0]), GridPoint::new([0, 1])];
        let report = PlanReport::from_grid(&Ok(path));
        assert!(report.is_success());
        assert_eq!(report.waypoints().len(), 2);
        assert_eq!(report.to_string(), "astar: path found through 2 cells");

        let failed = PlanReport::from_grid(&Err(PlanError::NotFound));
        assert!(!failed.is_success());
        assert!(failed.waypoints().is_empty());
        assert_eq!(failed.to_string(), "astar: no feasible path found");
    }

    #[test]
    fn test_continuous_report_length() {
        let path = vec![
            FloatPoint::new([0.0, 0.0]),
            FloatPoint::new([3.0, 4.0]),
            FloatPoint::new([3.0, 5.0]),
        ];
        let report = PlanReport::from_continuous(&Ok(path));
        match report.outcome {
            PlanOutcome::Found { length, .. } => assert!((length - 6.0).abs() < 1e-9),
            PlanOutcome::Failed(e) => panic!("unexpected failure {e}"),
        }
    }
}
