use grid_planners::{
    DwaConfig, DynamicWindowPlanner, GridPathPlanner, KinematicState, OccupancyGrid, PlanError,
    PlanReport, ScenarioConfig,
    executor::PathFollower,
    point::{FloatPoint, GridPoint},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rstest::rstest;

fn cell(x: i64, y: i64) -> GridPoint {
    GridPoint::new([x, y])
}

fn walled_grid() -> OccupancyGrid {
    OccupancyGrid::new(5, 5, (0..4).map(|y| cell(2, y)))
}

fn assert_connected(path: &[GridPoint]) {
    for pair in path.windows(2) {
        assert_eq!(pair[0].manhattan_distance(&pair[1]), 1, "{} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn open_grid_path_is_monotonic() {
    let planner = GridPathPlanner::new(OccupancyGrid::new(5, 5, []));
    let path = planner.find_path(cell(0, 0), cell(4, 4)).unwrap();
    assert_eq!(path.len(), 9);
    assert_eq!(path.first(), Some(&cell(0, 0)));
    assert_eq!(path.last(), Some(&cell(4, 4)));
    assert_connected(&path);
    for pair in path.windows(2) {
        assert!(pair[1].x() >= pair[0].x() && pair[1].y() >= pair[0].y());
    }
}

#[test]
fn wall_forces_detour_through_opening() {
    let planner = GridPathPlanner::new(walled_grid());
    let path = planner.find_path(cell(0, 0), cell(4, 4)).unwrap();
    assert_eq!(path.len(), 9);
    assert!(path.contains(&cell(2, 4)));
    assert!(path.iter().all(|p| planner.grid().is_valid_point(*p)));
    assert_connected(&path);
}

#[test]
fn sealed_wall_has_no_path() {
    let grid = OccupancyGrid::new(5, 5, (0..5).map(|y| cell(2, y)));
    let planner = GridPathPlanner::new(grid);
    assert_eq!(planner.find_path(cell(0, 0), cell(4, 4)), Err(PlanError::NotFound));
}

#[rstest]
#[case(cell(0, 0))]
#[case(cell(4, 4))]
#[case(cell(2, 4))]
fn start_equal_to_goal_is_single_cell(#[case] p: GridPoint) {
    let planner = GridPathPlanner::new(walled_grid());
    assert_eq!(planner.find_path(p, p), Ok(vec![p]));
}

#[rstest]
#[case(cell(-1, 0), cell(4, 4))]
#[case(cell(0, 0), cell(5, 4))]
#[case(cell(2, 1), cell(4, 4))]
#[case(cell(0, 0), cell(2, 0))]
fn invalid_endpoints_are_rejected(#[case] start: GridPoint, #[case] goal: GridPoint) {
    let planner = GridPathPlanner::new(walled_grid());
    assert!(matches!(
        planner.find_path(start, goal),
        Err(PlanError::InvalidEndpoint { .. })
    ));
}

#[rstest]
#[case(11)]
#[case(29)]
#[case(47)]
fn random_paths_avoid_obstacles(#[case] seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let obstacles = (0..60)
        .map(|_| cell(rng.random_range(0..15), rng.random_range(0..15)))
        .filter(|p| *p != cell(0, 0) && *p != cell(14, 14))
        .collect::<Vec<_>>();
    let planner = GridPathPlanner::from_obstacles(15, 15, obstacles);
    let reachable = planner.reachable_from(cell(0, 0));
    match planner.find_path(cell(0, 0), cell(14, 14)) {
        Ok(path) => {
            assert!(reachable.contains(&cell(14, 14)));
            assert!(path.iter().all(|p| planner.grid().is_valid_point(*p)));
            assert_connected(&path);
        }
        Err(e) => {
            assert_eq!(e, PlanError::NotFound);
            assert!(!reachable.contains(&cell(14, 14)));
        }
    }
}

#[test]
fn dwa_drives_straight_to_goal() {
    let planner = DynamicWindowPlanner::new(10, 10, vec![], DwaConfig::default());
    let goal = FloatPoint::new([5.0, 0.0]);
    let path = planner
        .find_path(KinematicState::at_rest(0.0, 0.0, 0.0), goal, 1000)
        .unwrap();
    let last = *path.last().unwrap();
    assert!(last.euclidean_distance(goal) <= 0.5);
    assert!(path.len() - 1 < 1000);
    assert!(path.iter().all(|p| p.y().abs() < 0.3), "path strayed: {path:?}");
}

#[rstest]
#[case(50)]
#[case(200)]
fn dwa_gives_up_on_distant_goal(#[case] max_iterations: usize) {
    let planner = DynamicWindowPlanner::new(10, 10, vec![], DwaConfig::default());
    let result = planner.find_path(
        KinematicState::at_rest(0.0, 0.0, 0.0),
        FloatPoint::new([1000.0, 0.0]),
        max_iterations,
    );
    assert_eq!(result, Err(PlanError::NotFound));
}

#[test]
fn dwa_fails_exactly_when_cycles_run_out() {
    let planner = DynamicWindowPlanner::new(10, 10, vec![], DwaConfig::default());
    let start = KinematicState::at_rest(0.0, 0.0, 0.0);
    let goal = FloatPoint::new([2.0, 0.0]);
    let cycles = planner.find_path(start, goal, 1000).unwrap().len() - 1;
    assert!(cycles > 1);

    assert_eq!(planner.find_path(start, goal, 0), Err(PlanError::NotFound));
    assert_eq!(planner.find_path(start, goal, cycles - 1), Err(PlanError::NotFound));
    let path = planner.find_path(start, goal, cycles).unwrap();
    assert_eq!(path.len(), cycles + 1);
    assert!(path.last().unwrap().euclidean_distance(goal) <= 0.5);
}

#[test]
fn dwa_commands_stay_inside_window() {
    let obstacles = vec![FloatPoint::new([3.0, 0.0]), FloatPoint::new([3.0, 1.0])];
    let planner = DynamicWindowPlanner::new(10, 10, obstacles, DwaConfig::default());
    let config = planner.config().clone();
    let goal = FloatPoint::new([6.0, 0.5]);
    let mut state = KinematicState::at_rest(0.0, 0.5, 0.0);
    for _ in 0..80 {
        let decision = planner.plan_step(&state, goal);
        assert!(decision.window.contains(decision.control));
        assert!((decision.control.v - state.v).abs() <= config.max_accel * config.dt + 1e-9);
        assert!(decision.control.v <= config.max_speed + 1e-9);
        assert!(decision.control.v >= config.min_speed - 1e-9);
        assert!(decision.control.yaw_rate.abs() <= config.max_yaw_rate + 1e-9);
        assert_eq!(decision.trajectory.points.len(), config.horizon_steps());
        planner.advance(&mut state, decision.control);
        assert_eq!((state.v, state.yaw_rate), (decision.control.v, decision.control.yaw_rate));
    }
}

#[test]
fn scenario_file_runs_end_to_end() {
    let config = ScenarioConfig::from_yaml(
        "map: {width: 5, height: 5}\nstart: [0, 0]\ngoal: [4, 4]\nstatic_obstacles: [[2, 0], [2, 1], [2, 2], [2, 3]]\n",
    )
    .unwrap();
    let path = config
        .grid_planner()
        .find_path(config.start_point(), config.goal_point());
    let report = PlanReport::from_grid(&path);
    assert!(report.is_success());

    let mut follower = PathFollower::new(report.waypoints().iter().copied());
    let mut steps = 0;
    while follower.advance().is_some() {
        steps += 1;
    }
    assert_eq!(steps, 8);
    assert_eq!(follower.position(), Some(FloatPoint::new([4.0, 4.0])));
}
