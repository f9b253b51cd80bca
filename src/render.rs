use std::collections::HashSet;

use itertools::Itertools;

use crate::{
    grid::OccupancyGrid,
    point::{FloatPoint, GridPoint},
};

/// Text picture of `grid` with `path` drawn over it, highest row first.
///
/// `#` occupied, `S` first path cell, `G` last path cell, `o` other path
/// cells, `.` free.
pub fn render(grid: &OccupancyGrid, path: &[GridPoint]) -> String {
    let on_path = path.iter().copied().collect::<HashSet<_>>();
    let start = path.first().copied();
    let goal = path.last().copied();
    (0..grid.height())
        .rev()
        .map(|y| {
            (0..grid.width())
                .map(|x| {
                    let p = GridPoint::new([x, y]);
                    if grid.is_occupied(p) {
                        '#'
                    } else if Some(p) == start {
                        'S'
                    } else if Some(p) == goal {
                        'G'
                    } else if on_path.contains(&p) {
                        'o'
                    } else {
                        '.'
                    }
                })
                .collect::<String>()
        })
        .join("\n")
}

/// Continuous waypoints are drawn on the cells they fall in.
pub fn render_waypoints(grid: &OccupancyGrid, waypoints: &[FloatPoint]) -> String {
    let cells = waypoints
        .iter()
        .map(|p| p.to_cell())
        .dedup()
        .collect::<Vec<_>>();
    render(grid, &cells)
}
