//! Dynamic Window Approach local planner.
//!
//! Each control cycle derives the velocities reachable under the acceleration
//! limits, rolls every sampled command forward over the prediction horizon,
//! scores the rollouts and applies the cheapest command for one `dt`.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    PlanError,
    grid::OccupancyGrid,
    kinematics::{Control, KinematicState},
    odometry_math::find_euclidean_distance,
    point::FloatPoint,
};

/// Slack used when counting samples so that `(hi - lo) / res` landing a hair
/// above an integer does not add a sample at the upper bound.
const SAMPLE_EPSILON: f64 = 1e-9;

/// Kinematic limits, sampling resolutions and cost gains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DwaConfig {
    pub max_speed: f64,
    pub min_speed: f64,
    pub max_yaw_rate: f64,
    pub max_accel: f64,
    pub max_dyaw_rate: f64,
    pub v_resolution: f64,
    pub yaw_rate_resolution: f64,
    pub dt: f64,
    pub predict_time: f64,
    pub to_goal_cost_gain: f64,
    pub speed_cost_gain: f64,
    pub obstacle_cost_gain: f64,
    pub goal_tolerance: f64,
}

impl Default for DwaConfig {
    fn default() -> Self {
        Self {
            max_speed: 1.0,
            min_speed: -0.5,
            max_yaw_rate: 40.0_f64.to_radians(),
            max_accel: 0.2,
            max_dyaw_rate: 40.0_f64.to_radians(),
            v_resolution: 0.01,
            yaw_rate_resolution: 0.1_f64.to_radians(),
            dt: 0.1,
            predict_time: 3.0,
            to_goal_cost_gain: 0.15,
            speed_cost_gain: 1.0,
            obstacle_cost_gain: 1.0,
            goal_tolerance: 0.5,
        }
    }
}

impl DwaConfig {
    /// Number of integration steps in one rollout, never less than one.
    pub fn horizon_steps(&self) -> usize {
        (self.predict_time / self.dt - SAMPLE_EPSILON).ceil().max(1.0) as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DynamicWindow {
    pub v_min: f64,
    pub v_max: f64,
    pub yaw_rate_min: f64,
    pub yaw_rate_max: f64,
}

impl DynamicWindow {
    pub fn contains(&self, control: Control) -> bool {
        (self.v_min..=self.v_max).contains(&control.v)
            && (self.yaw_rate_min..=self.yaw_rate_max).contains(&control.yaw_rate)
    }

    /// Uniform grid over the window, velocity-major, both axes ascending and
    /// half-open at the upper bound.
    pub fn candidates(&self, config: &DwaConfig) -> impl Iterator<Item = Control> + use<> {
        let yaw_rates = sample_axis(self.yaw_rate_min, self.yaw_rate_max, config.yaw_rate_resolution);
        sample_axis(self.v_min, self.v_max, config.v_resolution)
            .into_iter()
            .flat_map(move |v| {
                yaw_rates
                    .clone()
                    .into_iter()
                    .map(move |yaw_rate| Control::new(v, yaw_rate))
            })
    }
}

fn sample_axis(lo: f64, hi: f64, resolution: f64) -> Vec<f64> {
    if hi < lo || resolution <= 0.0 {
        return vec![];
    }
    let count = ((hi - lo) / resolution - SAMPLE_EPSILON).ceil().max(1.0) as usize;
    (0..count).map(|i| lo + i as f64 * resolution).collect()
}

/// Positions visited by one candidate command over the prediction horizon.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub control: Control,
    pub points: Vec<FloatPoint>,
}

impl Trajectory {
    pub fn last_point(&self) -> Option<FloatPoint> {
        self.points.last().copied()
    }
}

/// Weighted cost terms of one rollout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CostBreakdown {
    pub to_goal: f64,
    pub speed: f64,
    pub obstacle: f64,
    pub total: f64,
}

/// Outcome of one control cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlDecision {
    pub control: Control,
    pub window: DynamicWindow,
    pub trajectory: Trajectory,
    pub cost: CostBreakdown,
}

#[derive(Clone, Debug)]
pub struct DynamicWindowPlanner {
    grid: OccupancyGrid,
    obstacles: Vec<FloatPoint>,
    config: DwaConfig,
}

impl DynamicWindowPlanner {
    pub fn new(width: i64, height: i64, obstacles: Vec<FloatPoint>, config: DwaConfig) -> Self {
        let grid = OccupancyGrid::new(width, height, obstacles.iter().map(|p| p.to_cell()));
        Self {
            grid,
            obstacles,
            config,
        }
    }

    pub fn config(&self) -> &DwaConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[FloatPoint] {
        &self.obstacles
    }

    /// Inside the map and not on an obstacle cell.
    pub fn is_valid_position(&self, pos: FloatPoint) -> bool {
        self.grid.is_valid_position(pos)
    }

    /// Hard limits intersected with what the acceleration limits can reach in
    /// one `dt`. The current command is clamped into the hard limits first so
    /// the window is never empty.
    pub fn dynamic_window(&self, state: &KinematicState) -> DynamicWindow {
        let c = &self.config;
        let v = state.v.clamp(c.min_speed, c.max_speed);
        let yaw_rate = state.yaw_rate.clamp(-c.max_yaw_rate, c.max_yaw_rate);
        DynamicWindow {
            v_min: c.min_speed.max(v - c.max_accel * c.dt),
            v_max: c.max_speed.min(v + c.max_accel * c.dt),
            yaw_rate_min: (-c.max_yaw_rate).max(yaw_rate - c.max_dyaw_rate * c.dt),
            yaw_rate_max: c.max_yaw_rate.min(yaw_rate + c.max_dyaw_rate * c.dt),
        }
    }

    pub fn rollout(&self, state: &KinematicState, control: Control) -> Trajectory {
        let mut simulated = *state;
        let points = (0..self.config.horizon_steps())
            .map(|_| {
                simulated.step(control, self.config.dt);
                simulated.position()
            })
            .collect();
        Trajectory { control, points }
    }

    /// Reciprocal of the closest approach to any obstacle; 0 without
    /// obstacles, infinite on contact.
    pub fn obstacle_cost(&self, trajectory: &Trajectory) -> f64 {
        if self.obstacles.is_empty() {
            return 0.0;
        }
        let min_dist = trajectory
            .points
            .iter()
            .flat_map(|p| self.obstacles.iter().map(move |o| p.euclidean_distance(*o)))
            .fold(f64::INFINITY, f64::min);
        if min_dist == 0.0 {
            f64::INFINITY
        } else if min_dist.is_finite() {
            1.0 / min_dist
        } else {
            0.0
        }
    }

    pub fn evaluate(&self, trajectory: &Trajectory, goal: FloatPoint) -> CostBreakdown {
        let c = &self.config;
        let to_goal = c.to_goal_cost_gain
            * trajectory
                .last_point()
                .map_or(f64::INFINITY, |p| p.euclidean_distance(goal));
        let speed = c.speed_cost_gain * (c.max_speed - trajectory.control.v);
        let obstacle = c.obstacle_cost_gain * self.obstacle_cost(trajectory);
        CostBreakdown {
            to_goal,
            speed,
            obstacle,
            total: to_goal + speed + obstacle,
        }
    }

    /// Scores every candidate in the current window and keeps the cheapest.
    /// A candidate replaces the best on equal cost, so ties go to the last
    /// one enumerated.
    pub fn plan_step(&self, state: &KinematicState, goal: FloatPoint) -> ControlDecision {
        let window = self.dynamic_window(state);
        let mut best: Option<(Trajectory, CostBreakdown)> = None;
        for control in window.candidates(&self.config) {
            let trajectory = self.rollout(state, control);
            let cost = self.evaluate(&trajectory, goal);
            if best.as_ref().is_none_or(|(_, b)| cost.total <= b.total) {
                best = Some((trajectory, cost));
            }
        }
        let (trajectory, cost) = best.unwrap_or_else(|| {
            let trajectory = self.rollout(state, Control::default());
            let cost = self.evaluate(&trajectory, goal);
            (trajectory, cost)
        });
        ControlDecision {
            control: trajectory.control,
            window,
            trajectory,
            cost,
        }
    }

    pub fn advance(&self, state: &mut KinematicState, control: Control) {
        state.step(control, self.config.dt);
    }

    pub fn reached(&self, state: &KinematicState, goal: FloatPoint) -> bool {
        find_euclidean_distance(state.position(), goal) <= self.config.goal_tolerance
    }

    /// Runs up to `max_iterations` control cycles from `start`. The path holds
    /// the start position followed by one position per cycle.
    pub fn find_path(
        &self,
        start: KinematicState,
        goal: FloatPoint,
        max_iterations: usize,
    ) -> Result<Vec<FloatPoint>, PlanError> {
        let mut state = start;
        let mut path = vec![state.position()];
        for iteration in 1..=max_iterations {
            let decision = self.plan_step(&state, goal);
            self.advance(&mut state, decision.control);
            path.push(state.position());
            trace!(
                "dwa: cycle {iteration} v={:.3} yaw_rate={:.4} at {} heading {:.3} cost={:.3}",
                decision.control.v,
                decision.control.yaw_rate,
                state.position(),
                state.heading(),
                decision.cost.total
            );
            if self.reached(&state, goal) {
                debug!("dwa: reached {goal} after {iteration} cycles");
                return Ok(path);
            }
        }
        debug!(
            "dwa: gave up after {max_iterations} cycles, {:.3} from {goal}",
            state.position().euclidean_distance(goal)
        );
        Err(PlanError::NotFound)
    }
}
