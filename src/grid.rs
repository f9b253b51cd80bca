use std::collections::HashSet;

use crate::point::{FloatPoint, GridPoint};

/// Static occupancy over a `width` x `height` lattice. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct OccupancyGrid {
    width: i64,
    height: i64,
    occupied: HashSet<GridPoint>,
}

impl OccupancyGrid {
    /// Obstacles outside the bounds are dropped; they could never be queried as valid.
    pub fn new<I: IntoIterator<Item = GridPoint>>(width: i64, height: i64, obstacles: I) -> Self {
        let mut grid = Self {
            width,
            height,
            occupied: HashSet::new(),
        };
        grid.occupied = obstacles
            .into_iter()
            .filter(|p| grid.contains(*p))
            .collect();
        grid
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn contains(&self, p: GridPoint) -> bool {
        (0..self.width).contains(&p.x()) && (0..self.height).contains(&p.y())
    }

    pub fn is_occupied(&self, p: GridPoint) -> bool {
        self.occupied.contains(&p)
    }

    pub fn is_valid(&self, x: i64, y: i64) -> bool {
        self.is_valid_point(GridPoint::new([x, y]))
    }

    pub fn is_valid_point(&self, p: GridPoint) -> bool {
        self.contains(p) && !self.is_occupied(p)
    }

    /// Continuous variant: the position is valid when it is inside the map
    /// and the cell it truncates to is free.
    pub fn is_valid_position(&self, pos: FloatPoint) -> bool {
        pos.x() >= 0.0
            && pos.y() >= 0.0
            && pos.x() < self.width as f64
            && pos.y() < self.height as f64
            && !self.is_occupied(pos.to_cell())
    }

    /// Valid 4-connected neighbors in up, right, down, left order.
    pub fn free_neighbors(&self, p: GridPoint) -> impl Iterator<Item = GridPoint> + '_ {
        p.manhattan_neighbors().filter(|n| self.is_valid_point(*n))
    }

    pub fn obstacle_count(&self) -> usize {
        self.occupied.len()
    }
}
