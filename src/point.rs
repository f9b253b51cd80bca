use std::{
    fmt::Display,
    ops::{Add, AddAssign, Index, IndexMut},
};

use enum_iterator::{Sequence, all};
use itertools::Itertools;
use num_traits::{Num, cast::ToPrimitive};
use trait_set::trait_set;

trait_set! {
    pub trait NumType = Display + ToPrimitive + Default + Num + Copy + AddAssign;
}

pub type GridPoint = Point<i64, 2>;
pub type FloatPoint = Point<f64, 2>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Point<N: NumType, const S: usize> {
    coords: [N; S],
}

impl<N: NumType, const S: usize> Display for Point<N, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self.coords.map(|n| format!("{n}")).join(",");
        write!(f, "({joined})")
    }
}

impl<N: NumType, const S: usize> Point<N, S> {
    pub fn new(coords: [N; S]) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> [N; S] {
        self.coords
    }

    pub fn euclidean_distance(&self, other: Point<N, S>) -> f64 {
        (0..S)
            .map(|i| {
                let a = self[i].to_f64().unwrap_or(f64::NAN);
                let b = other[i].to_f64().unwrap_or(f64::NAN);
                (a - b).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl<N: NumType, const S: usize> From<[N; S]> for Point<N, S> {
    fn from(coords: [N; S]) -> Self {
        Self { coords }
    }
}

/// The four unit steps of a 4-connected grid. Declaration order is the
/// neighbor expansion order: up (+y), right (+x), down (-y), left (-x).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Sequence)]
pub enum ManhattanDir {
    Up,
    Right,
    Down,
    Left,
}

impl ManhattanDir {
    pub fn offset(&self) -> GridPoint {
        match self {
            ManhattanDir::Up => GridPoint::new([0, 1]),
            ManhattanDir::Right => GridPoint::new([1, 0]),
            ManhattanDir::Down => GridPoint::new([0, -1]),
            ManhattanDir::Left => GridPoint::new([-1, 0]),
        }
    }

    pub fn neighbor(&self, p: GridPoint) -> GridPoint {
        p + self.offset()
    }
}

impl GridPoint {
    pub fn x(&self) -> i64 {
        self[0]
    }

    pub fn y(&self) -> i64 {
        self[1]
    }

    pub fn manhattan_distance(&self, other: &GridPoint) -> i64 {
        (self[0] - other[0]).abs() + (self[1] - other[1]).abs()
    }

    /// Unbounded 4-connected neighbors; callers filter against their own bounds.
    pub fn manhattan_neighbors(&self) -> impl Iterator<Item = GridPoint> + use<> {
        let center = *self;
        all::<ManhattanDir>().map(move |d| d.neighbor(center))
    }

    pub fn to_float(&self) -> FloatPoint {
        FloatPoint::new([self[0] as f64, self[1] as f64])
    }
}

impl FloatPoint {
    pub fn x(&self) -> f64 {
        self[0]
    }

    pub fn y(&self) -> f64 {
        self[1]
    }

    /// Cell containing this position.
    pub fn to_cell(&self) -> GridPoint {
        GridPoint::new([self[0].floor() as i64, self[1].floor() as i64])
    }
}

impl<N: NumType, const S: usize> Index<usize> for Point<N, S> {
    type Output = N;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coords[index]
    }
}

impl<N: NumType, const S: usize> IndexMut<usize> for Point<N, S> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.coords[index]
    }
}

impl<N: NumType, const S: usize> Default for Point<N, S> {
    fn default() -> Self {
        Self {
            coords: [N::default(); S],
        }
    }
}

impl<N: NumType, const S: usize> Add for Point<N, S> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result += rhs;
        result
    }
}

impl<N: NumType, const S: usize> AddAssign for Point<N, S> {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..S {
            self[i] += rhs[i];
        }
    }
}
