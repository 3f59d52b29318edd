use crate::error::FindError;
use crate::find::{MapStorage, MapTrait, NodeReference};
use crate::record::palette;
use std::{fmt::Display, str::FromStr};

use image::Rgb;
use serde::{Deserialize, Serialize};

/// Traversability of a single mask pixel
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Free,
    Blocked,
    /// Any colour that is neither reference colour, and everything outside the map
    #[default]
    Unknown,
}

impl Cell {
    /// Exact match against the two reference colours, nothing in between counts as road.
    pub fn from_color(color: Rgb<u8>) -> Self {
        if color == palette::FREE {
            Cell::Free
        } else if color == palette::BLOCKED {
            Cell::Blocked
        } else {
            Cell::Unknown
        }
    }

    pub fn is_free(self) -> bool {
        self == Cell::Free
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell::Free => ".",
                Cell::Blocked => "X",
                Cell::Unknown => "?",
            }
        )
    }
}

impl TryFrom<char> for Cell {
    type Error = FindError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '.' => Ok(Cell::Free),
            'X' | '#' => Ok(Cell::Blocked),
            '?' => Ok(Cell::Unknown),
            _ => Err(FindError::InvalidMap(format!("unexpected cell '{c}'"))),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbor enumeration order. Every strategy breaks ties by this order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// A pixel position, `x` is the column and `y` the row (y grows downwards)
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Straight-line distance, never larger than the number of unit steps between the two
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan(&self, other: &Point) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl NodeReference for Point {}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = FindError;

    /// Parses `x,y`, optionally wrapped in parentheses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')');
        let (x, y) = inner
            .split_once(',')
            .ok_or_else(|| FindError::InvalidPoint(s.to_string()))?;
        let x = x
            .trim()
            .parse()
            .map_err(|_| FindError::InvalidPoint(s.to_string()))?;
        let y = y
            .trim()
            .parse()
            .map_err(|_| FindError::InvalidPoint(s.to_string()))?;
        Ok(Point { x, y })
    }
}

/// A MapTrait implementation over a rectangular raster of classified cells.
/// The classification is computed once and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMap {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl GridMap {
    pub fn new(width: usize, height: usize, fill: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn classify(&self, point: Point) -> Cell {
        if self.contains(point) {
            self.cells[point.y * self.width + point.x]
        } else {
            Cell::Unknown
        }
    }

    /// Overwrite a single cell, ignoring points outside the map
    pub fn set(&mut self, point: Point, cell: Cell) {
        if self.contains(point) {
            self.cells[point.y * self.width + point.x] = cell;
        }
    }

    /// The cell one step away in the given direction, if it is still inside the map
    pub fn step(&self, point: Point, direction: Direction) -> Option<Point> {
        let Point { x, y } = point;
        match direction {
            Direction::Up => y.checked_sub(1).map(|y| Point { x, y }),
            Direction::Down => (y + 1 < self.height).then_some(Point { x, y: y + 1 }),
            Direction::Left => x.checked_sub(1).map(|x| Point { x, y }),
            Direction::Right => (x + 1 < self.width).then_some(Point { x: x + 1, y }),
        }
    }

    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_free()).count()
    }

    /// Scales the map by the given factor, i.e. to make it twice as large, pass 2.
    /// Interpolates the cells by repeating the existing cells in the new grid.
    pub fn scale_up(&mut self, factor: usize) {
        let width = self.width * factor;
        let mut new_cells = vec![Cell::default(); width * self.height * factor];

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                for r in 0..factor {
                    for c in 0..factor {
                        new_cells[(y * factor + r) * width + x * factor + c] = cell;
                    }
                }
            }
        }

        self.width = width;
        self.height *= factor;
        self.cells = new_cells;
    }
}

impl Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for GridMap {
    type Err = FindError;

    /// Reads the format written by `Display`: one line per row, `.` free, `X` blocked,
    /// `?` unknown. Whitespace around a row is indentation, blank lines are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(FindError::InvalidMap("map has no cells".to_string()));
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(FindError::InvalidMap(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            for c in row.chars() {
                cells.push(Cell::try_from(c)?);
            }
        }

        Ok(GridMap {
            width,
            height: rows.len(),
            cells,
        })
    }
}

/// A MapStorage holding one value per grid cell in a single row-major vec
#[derive(Debug, Clone)]
pub struct CellStorage<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.x < self.width && node.y < self.height
    }

    fn get(&self, node: Self::Reference) -> T {
        self.cells[node.y * self.width + node.x]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.cells[node.y * self.width + node.x]
    }
}

impl<T: Display> Display for CellStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl MapTrait for GridMap {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        self.contains(node)
    }

    fn classify(&self, node: Self::Reference) -> Cell {
        GridMap::classify(self, node)
    }

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(node, direction))
    }

    fn distance(&self, a: Self::Reference, b: Self::Reference) -> f64 {
        a.distance(&b)
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage {
            width: self.width,
            height: self.height,
            cells: vec![Default::default(); self.width * self.height],
        }
    }
}
