use std::path::Path;

use grid_planners::{
    PlanError, PlanReport, PlannerKind, ScenarioConfig,
    cmd::ArgVals,
    config::ScenarioOverrides,
    executor::PathFollower,
    render::{render, render_waypoints},
};
use log::{debug, info, warn};

const DEFAULT_CONFIG: &str = "data/maps/default_config.yaml";

fn main() {
    env_logger::init();
    let args = ArgVals::default();
    if args.has_flag("-h") || args.has_flag("--help") {
        println!(
            "Usage: grid_planners [width height [start_x start_y [goal_x goal_y]]] [start=x,y] [goal=x,y] [config=path] [algorithm=astar|dwa|rrt] [max_iterations=n] [render=true|false]"
        );
    } else {
        match parse_args(&args) {
            Ok((config, show)) => {
                if let Err(e) = runner(config, show) {
                    println!("Unrecoverable error: {e}");
                }
            }
            Err(e) => {
                println!("Error: {e}");
            }
        }
    }
}

fn parse_args(args: &ArgVals) -> anyhow::Result<(ScenarioConfig, bool)> {
    let mut config = match args.mapped_vals.get("config") {
        Some(path) => ScenarioConfig::load(Path::new(path))?,
        None => ScenarioConfig::load_or_default(Path::new(DEFAULT_CONFIG))?,
    };
    config.apply_overrides(&parse_overrides(args)?)?;
    let show = args.get_value::<bool>("render")?.unwrap_or(true);
    Ok((config, show))
}

fn parse_overrides(args: &ArgVals) -> anyhow::Result<ScenarioOverrides> {
    let cell = |i: usize, key: &str| -> anyhow::Result<Option<[i64; 2]>> {
        match (args.get_positional(i)?, args.get_positional(i + 1)?) {
            (Some(x), Some(y)) => Ok(Some([x, y])),
            (Some(_), None) => Err(anyhow::Error::msg(format!(
                "argument {} needs a matching y coordinate",
                i + 1
            ))),
            _ => Ok(args.get_duple(key)?.map(|(x, y)| [x, y])),
        }
    };
    Ok(ScenarioOverrides {
        width: args.get_positional(0)?,
        height: args.get_positional(1)?,
        start: cell(2, "start")?,
        goal: cell(4, "goal")?,
        algorithm: args.get_value("algorithm")?,
        max_iterations: args.get_value("max_iterations")?,
    })
}

fn runner(mut config: ScenarioConfig, show: bool) -> anyhow::Result<()> {
    let grid = config.grid();
    info!(
        "{} on {}x{} map, {} obstacles, {} -> {}",
        config.algorithm,
        grid.width(),
        grid.height(),
        grid.obstacle_count(),
        config.start_point(),
        config.goal_point()
    );
    let (report, picture) = match config.algorithm {
        PlannerKind::GridSearch => {
            let path = config
                .grid_planner()
                .find_path(config.start_point(), config.goal_point());
            let picture = path.as_ref().map(|p| render(&grid, p)).ok();
            (PlanReport::from_grid(&path), picture)
        }
        PlannerKind::Kinodynamic => {
            let path = config.dwa_planner().find_path(
                config.dwa_start_state(),
                config.goal_point().to_float(),
                config.max_iterations,
            );
            let picture = path.as_ref().map(|p| render_waypoints(&grid, p)).ok();
            (PlanReport::from_continuous(&path), picture)
        }
        PlannerKind::SamplingBased => return Err(PlanError::Unsupported(config.algorithm).into()),
    };

    if report.is_success() {
        info!("{report}");
    } else {
        warn!("{report}");
    }
    println!("{report}");
    if show {
        println!("{}", picture.unwrap_or_else(|| render(&grid, &[])));
    }

    let mut follower = PathFollower::new(report.waypoints().iter().copied());
    debug!("following {}", follower.full_path_copy());
    while let Some(position) = follower.advance() {
        for obstacle in config.dynamic_obstacles.iter_mut() {
            obstacle.advance();
        }
        debug!(
            "at {position} heading {:.1}°, turn {:.1}°, {} to go, obstacles at [{}]",
            follower.heading().to_degrees(),
            follower.turn_to_waypoint().unwrap_or(0.0).to_degrees(),
            follower.remaining(),
            config
                .dynamic_obstacles
                .iter()
                .map(|o| o.position().to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    if let Some(goal) = follower.goal() {
        info!("arrived at {goal}");
    }
    Ok(())
}
