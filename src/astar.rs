use std::collections::HashSet;

use log::debug;

use crate::{
    Endpoint, PlanError,
    grid::OccupancyGrid,
    point::GridPoint,
    search_iter::{BfsIter, PrioritySearchIter},
};

/// A found path plus how much work the search did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchOutcome {
    pub path: Vec<GridPoint>,
    pub cost: i64,
    pub expanded: usize,
}

/// Shortest 4-connected paths over an [`OccupancyGrid`] with unit step cost
/// and the Manhattan heuristic.
#[derive(Clone, Debug)]
pub struct GridPathPlanner {
    grid: OccupancyGrid,
}

impl GridPathPlanner {
    pub fn new(grid: OccupancyGrid) -> Self {
        Self { grid }
    }

    pub fn from_obstacles<I: IntoIterator<Item = GridPoint>>(
        width: i64,
        height: i64,
        obstacles: I,
    ) -> Self {
        Self::new(OccupancyGrid::new(width, height, obstacles))
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn find_path(&self, start: GridPoint, goal: GridPoint) -> Result<Vec<GridPoint>, PlanError> {
        self.search(start, goal).map(|outcome| outcome.path)
    }

    pub fn search(&self, start: GridPoint, goal: GridPoint) -> Result<SearchOutcome, PlanError> {
        self.check_endpoint(Endpoint::Start, start)?;
        self.check_endpoint(Endpoint::Goal, goal)?;
        debug!("a*: searching {start} -> {goal}");

        let mut searcher = PrioritySearchIter::a_star(
            start,
            |p: &GridPoint| self.grid.free_neighbors(*p).map(|n| (n, 1)).collect(),
            |p: &GridPoint| p.manhattan_distance(&goal),
        );
        match searcher.by_ref().find(|p| *p == goal) {
            Some(_) => {
                let mut path = searcher.path_back_from(&goal);
                path.make_contiguous().reverse();
                let outcome = SearchOutcome {
                    path: path.into(),
                    cost: searcher.cost_for(&goal).unwrap_or_default(),
                    expanded: searcher.expanded(),
                };
                debug!(
                    "a*: reached {goal} through {} cells after {} expansions ({} left on frontier)",
                    outcome.path.len(),
                    outcome.expanded,
                    searcher.frontier_len()
                );
                Ok(outcome)
            }
            None => {
                debug!(
                    "a*: frontier exhausted after {} expansions without reaching {goal}",
                    searcher.expanded()
                );
                Err(PlanError::NotFound)
            }
        }
    }

    /// Every cell reachable from `start`, including `start` itself when valid.
    pub fn reachable_from(&self, start: GridPoint) -> HashSet<GridPoint> {
        if !self.grid.is_valid_point(start) {
            return HashSet::new();
        }
        let mut bfs = BfsIter::new(start, |p: &GridPoint| {
            self.grid.free_neighbors(*p).collect()
        });
        bfs.by_ref().last();
        bfs.all_depths().into_keys().collect()
    }

    fn check_endpoint(&self, which: Endpoint, position: GridPoint) -> Result<(), PlanError> {
        if self.grid.is_valid_point(position) {
            Ok(())
        } else {
            debug!("a*: rejecting {which} {position}");
            Err(PlanError::InvalidEndpoint { which, position })
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn assert_well_formed(planner: &GridPathPlanner, path: &[GridPoint]) {
        for cell in path {
            assert!(planner.grid().is_valid_point(*cell), "{cell} is not valid");
        }
        for step in path.windows(2) {
            assert_eq!(step[0].manhattan_distance(&step[1]), 1, "{} -> {}", step[0], step[1]);
        }
    }

    #[test]
    fn test_open_grid_is_optimal() {
        let planner = GridPathPlanner::from_obstacles(8, 6, []);
        for (start, goal) in [
            ((0, 0), (7, 5)),
            ((7, 0), (0, 5)),
            ((3, 3), (3, 3)),
            ((2, 5), (6, 1)),
        ] {
            let start = GridPoint::new([start.0, start.1]);
            let goal = GridPoint::new([goal.0, goal.1]);
            let path = planner.find_path(start, goal).unwrap();
            assert_eq!(path.len() as i64, start.manhattan_distance(&goal) + 1);
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(&goal));
            assert_well_formed(&planner, &path);
        }
    }

    #[test]
    fn test_endpoint_rejection() {
        let planner = GridPathPlanner::from_obstacles(5, 5, [GridPoint::new([1, 1])]);
        let free = GridPoint::new([0, 0]);
        assert_eq!(
            planner.search(GridPoint::new([1, 1]), free),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Start,
                position: GridPoint::new([1, 1])
            })
        );
        assert_eq!(
            planner.search(free, GridPoint::new([5, 0])),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Goal,
                position: GridPoint::new([5, 0])
            })
        );
        assert!(matches!(
            planner.find_path(GridPoint::new([-1, 2]), free),
            Err(PlanError::InvalidEndpoint { which: Endpoint::Start, .. })
        ));
    }

    #[test]
    fn test_enclosed_goal_not_found() {
        let ring = [(3, 2), (2, 3), (4, 3), (3, 4)].map(|(x, y)| GridPoint::new([x, y]));
        let planner = GridPathPlanner::from_obstacles(7, 7, ring);
        let goal = GridPoint::new([3, 3]);
        assert_eq!(
            planner.find_path(GridPoint::new([0, 0]), goal),
            Err(PlanError::NotFound)
        );
        assert!(!planner.reachable_from(GridPoint::new([0, 0])).contains(&goal));
        assert_eq!(planner.reachable_from(goal).len(), 1);
    }

    #[test]
    fn test_start_equals_goal_expands_once() {
        let planner = GridPathPlanner::from_obstacles(3, 3, []);
        let p = GridPoint::new([1, 2]);
        let outcome = planner.search(p, p).unwrap();
        assert_eq!(outcome.path, vec![p]);
        assert_eq!(outcome.cost, 0);
        assert_eq!(outcome.expanded, 1);
    }

    #[test]
    fn test_search_reports_cost() {
        let planner = GridPathPlanner::from_obstacles(5, 5, (0..4).map(|y| GridPoint::new([2, y])));
        let outcome = planner.search(GridPoint::new([0, 0]), GridPoint::new([4, 0])).unwrap();
        assert_eq!(outcome.cost, 12);
        assert_eq!(outcome.path.len() as i64, outcome.cost + 1);
        assert!(outcome.expanded >= outcome.path.len());
    }

    #[test]
    fn test_endpoints_checked_before_searching() {
        // Searching this grid from a valid start would run for hours, so an
        // immediate answer shows no expansion took place.
        let planner = GridPathPlanner::from_obstacles(1 << 30, 1 << 30, []);
        let inside = GridPoint::new([5, 5]);
        assert_eq!(
            planner.search(inside, GridPoint::new([-1, 5])),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Goal,
                position: GridPoint::new([-1, 5])
            })
        );
        assert_eq!(
            planner.search(GridPoint::new([5, 1 << 30]), inside),
            Err(PlanError::InvalidEndpoint {
                which: Endpoint::Start,
                position: GridPoint::new([5, 1 << 30])
            })
        );
    }

    #[test]
    fn test_random_grids_match_bfs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..40 {
            let (width, height) = (rng.random_range(3..12), rng.random_range(3..12));
            let mut obstacles = vec![];
            for x in 0..width {
                for y in 0..height {
                    if rng.random_bool(0.3) {
                        obstacles.push(GridPoint::new([x, y]));
                    }
                }
            }
            let planner = GridPathPlanner::from_obstacles(width, height, obstacles);
            let start = GridPoint::new([rng.random_range(0..width), rng.random_range(0..height)]);
            let goal = GridPoint::new([rng.random_range(0..width), rng.random_range(0..height)]);
            let result = planner.find_path(start, goal);

            if !planner.grid().is_valid_point(start) || !planner.grid().is_valid_point(goal) {
                assert!(matches!(result, Err(PlanError::InvalidEndpoint { .. })));
                continue;
            }
            let mut bfs = BfsIter::new(start, |p: &GridPoint| {
                planner.grid().free_neighbors(*p).collect()
            });
            bfs.by_ref().last();
            match bfs.depth_for(&goal) {
                Some(depth) => {
                    let path = result.unwrap();
                    assert_eq!(path.len(), depth + 1);
                    assert_eq!(path.first(), Some(&start));
                    assert_eq!(path.last(), Some(&goal));
                    assert_well_formed(&planner, &path);
                }
                None => assert_eq!(result, Err(PlanError::NotFound)),
            }
        }
    }
}
