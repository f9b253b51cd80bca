use std::collections::VecDeque;

use itertools::Itertools;

use crate::{
    odometry_math::{find_angle_diff, find_goal_heading},
    point::FloatPoint,
};

/// Walks a planned path one waypoint at a time.
pub struct PathFollower {
    position: Option<FloatPoint>,
    heading: f64,
    path: VecDeque<FloatPoint>,
}

impl PathFollower {
    /// The first waypoint is taken as the current position.
    pub fn new<I: IntoIterator<Item = FloatPoint>>(path: I) -> Self {
        let mut path = path.into_iter().collect::<VecDeque<_>>();
        let position = path.pop_front();
        let mut follower = Self {
            position,
            heading: 0.0,
            path,
        };
        follower.heading = follower.next_heading().unwrap_or(0.0);
        follower
    }

    pub fn position(&self) -> Option<FloatPoint> {
        self.position
    }

    pub fn waypoint(&self) -> Option<FloatPoint> {
        self.path.front().copied()
    }

    /// Direction of travel on the most recent move, or toward the first
    /// waypoint before moving.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Signed rotation from the current heading onto the next waypoint.
    pub fn turn_to_waypoint(&self) -> Option<f64> {
        Some(find_angle_diff(self.next_heading()?, self.heading))
    }

    pub fn goal(&self) -> Option<FloatPoint> {
        self.path.back().copied().or(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.path.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.path.len()
    }

    pub fn full_path_copy(&self) -> String {
        format!(
            "[{}]",
            self.position
                .iter()
                .chain(self.path.iter())
                .map(|p| format!("{p}"))
                .join(",")
        )
    }

    /// Moves onto the next waypoint and returns it.
    pub fn advance(&mut self) -> Option<FloatPoint> {
        if let Some(heading) = self.next_heading() {
            self.heading = heading;
        }
        let next = self.path.pop_front()?;
        self.position = Some(next);
        Some(next)
    }

    fn next_heading(&self) -> Option<f64> {
        Some(find_goal_heading(self.position?, self.waypoint()?))
    }
}
