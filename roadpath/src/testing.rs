//! Helpers shared by the strategy tests

use crate::find::{MapStorage, MapTrait, Visited};
use crate::grid::{Cell, CellStorage, GridMap, Point};

/// Tiny deterministic generator so the generated maps are the same on every run
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// A random map with roughly 70% road, plus two distinct-or-equal free endpoints
pub fn random_map(rng: &mut Lcg) -> (GridMap, Point, Point) {
    loop {
        let width = 2 + rng.below(7);
        let height = 2 + rng.below(7);
        let mut map = GridMap::new(width, height, Cell::Free);
        for y in 0..height {
            for x in 0..width {
                if rng.below(10) < 3 {
                    map.set(Point::new(x, y), Cell::Blocked);
                }
            }
        }

        let free: Vec<Point> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Point::new(x, y)))
            .filter(|p| map.classify(*p).is_free())
            .collect();
        if free.is_empty() {
            continue;
        }

        let start = free[rng.below(free.len())];
        let goal = free[rng.below(free.len())];
        return (map, start, goal);
    }
}

/// Shortest number of unit steps from `start` to every cell, by repeated relaxation
pub fn brute_force_distances(map: &GridMap, start: Point) -> Vec<Option<usize>> {
    let index = |p: Point| p.y * map.width + p.x;
    let mut dist = vec![None; map.width * map.height];
    dist[index(start)] = Some(0);

    let mut changed = true;
    while changed {
        changed = false;
        for y in 0..map.height {
            for x in 0..map.width {
                let here = Point::new(x, y);
                let Some(d) = dist[index(here)] else {
                    continue;
                };
                for n in map.neighbors_of(here) {
                    if !map.classify(n).is_free() {
                        continue;
                    }
                    if dist[index(n)].map_or(true, |old| d + 1 < old) {
                        dist[index(n)] = Some(d + 1);
                        changed = true;
                    }
                }
            }
        }
    }

    dist
}

pub fn brute_force_distance(map: &GridMap, start: Point, goal: Point) -> Option<usize> {
    brute_force_distances(map, start)[goal.y * map.width + goal.x]
}

/// Every cell is free, consecutive cells are one unit step apart, and the ends are right
pub fn assert_valid_path(map: &GridMap, path: &[Point], start: Point, goal: Point) {
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    for p in path {
        assert!(map.classify(*p).is_free(), "{p} is not free in\n{map}");
    }
    for pair in path.windows(2) {
        assert_eq!(pair[0].manhattan(&pair[1]), 1, "{} -> {}", pair[0], pair[1]);
    }
}

/// Following parents from any recorded cell ends at `start` within `width * height` steps
pub fn assert_tree(map: &GridMap, visited: &CellStorage<Visited<Point>>, start: Point) {
    let limit = map.width * map.height;
    for y in 0..map.height {
        for x in 0..map.width {
            let mut node = Point::new(x, y);
            if visited.get(node).is_none() {
                continue;
            }
            let mut steps = 0;
            while let Some(from) = visited.get(node).0.and_then(|item| item.from) {
                node = from;
                steps += 1;
                assert!(steps <= limit, "cycle in predecessor map");
            }
            assert_eq!(node, start);
        }
    }
}
