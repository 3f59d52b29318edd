use crate::find::{
    EventQueue, MapTrait, PathFinderState, Search, SearchTree, VisitState, Visited,
};

/// Depth-first search with a LIFO frontier.
///
/// Gives no shortest path guarantee. When an already visited neighbor can be reached in fewer
/// steps through the node being expanded, its predecessor is moved over to that node, which
/// shortens the recorded path without expanding the neighbor again.
pub struct DepthFirst<M: MapTrait> {
    tree: SearchTree<M>,
    stack: Vec<M::Reference>,
}

impl<M: MapTrait> DepthFirst<M> {
    pub fn new(map: &M, start: M::Reference, goal: M::Reference) -> Self {
        Self {
            tree: SearchTree::new(map, start, goal),
            stack: vec![start],
        }
    }
}

impl<M: MapTrait> Search<M> for DepthFirst<M> {
    fn step(
        &mut self,
        map: &M,
        events: &mut EventQueue<M::Reference>,
    ) -> PathFinderState<M::Reference> {
        if self.tree.state.is_done() {
            return self.tree.state.clone();
        }
        self.tree.emit_seed(events);

        let Some(current) = self.stack.pop() else {
            return self.tree.exhausted();
        };

        if current == self.tree.goal {
            return self.tree.found();
        }

        let via = self.tree.cost(current).map(|c| c + 1);

        for neighbor in map.neighbors_of(current) {
            if !self.tree.observe(map, neighbor, events) {
                continue;
            }

            match self.tree.state_of(neighbor) {
                VisitState::Unvisited => {
                    self.tree.mark_visited(map, neighbor, current, events);
                    self.stack.push(neighbor);
                }
                VisitState::Visited => {
                    // costs only ever decrease along a parent chain, so this can not form a cycle
                    if let (Some(via), Some(known)) = (via, self.tree.cost(neighbor)) {
                        if via < known {
                            self.tree.record(map, neighbor, current);
                        }
                    }
                }
                VisitState::Frontier | VisitState::BlockedObserved => {}
            }
        }

        self.tree.state.clone()
    }

    fn state(&self) -> &PathFinderState<M::Reference> {
        &self.tree.state
    }

    fn visited(&self) -> &M::Storage<Visited<M::Reference>> {
        self.tree.visited()
    }

    fn start(&self) -> M::Reference {
        self.tree.start
    }

    fn goal(&self) -> M::Reference {
        self.tree.goal
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::bfs::BreadthFirst;
    use crate::find::MapStorage;
    use crate::grid::{GridMap, Point};
    use crate::path::reconstruct;
    use crate::testing::{
        assert_tree, assert_valid_path, brute_force_distance, random_map, Lcg,
    };

    #[test]
    fn test_finds_some_route() {
        let map: GridMap = "......
                            .XXXX.
                            .X..X.
                            .X..X.
                            ......"
            .parse()
            .unwrap();
        let (start, goal) = (Point::new(0, 0), Point::new(5, 4));

        let mut finder = DepthFirst::new(&map, start, goal);
        let PathFinderState::PathFound(result) = finder.finish(&map) else {
            panic!("expected a path");
        };

        assert_valid_path(&map, &result.path, start, goal);
        assert!(result.total_cost >= 9);
        assert_eq!(result.total_cost, result.path.len() - 1);
    }

    #[test]
    fn test_expands_last_discovered_first() {
        let map = GridMap::new(3, 3, crate::grid::Cell::Free);
        let mut finder = DepthFirst::new(&map, Point::new(1, 1), Point::new(0, 0));
        let mut events = EventQueue::new();

        finder.step(&map, &mut events);
        events.clear();
        // the right neighbor was pushed last, so it is expanded next
        finder.step(&map, &mut events);
        let discovered: Vec<Point> = events.iter().map(|e| e.node).collect();
        assert_eq!(discovered, vec![Point::new(2, 0), Point::new(2, 2)]);
    }

    #[test]
    fn test_relaxation_shortens_recorded_path() {
        // the wall makes the goal unreachable, so every free cell gets expanded
        let map: GridMap = "...X\n...X\n...X".parse().unwrap();
        let start = Point::new(0, 0);
        let mut finder = DepthFirst::new(&map, start, Point::new(3, 0));
        assert!(matches!(
            finder.finish(&map),
            PathFinderState::Unreachable { .. }
        ));

        // (0,2) is first reached the long way round the right column at 6 steps, expanding
        // (0,1) afterwards moves it over to 2 steps
        let cost = |p: Point| finder.visited().get(p).0.map(|item| item.cost);
        assert_eq!(cost(Point::new(0, 2)), Some(2));
        assert_eq!(cost(Point::new(1, 2)), Some(3));
        assert_eq!(
            reconstruct(finder.visited(), Point::new(0, 2)),
            Some(vec![start, Point::new(0, 1), Point::new(0, 2)])
        );
        assert_tree(&map, finder.visited(), start);
    }

    #[test]
    fn test_unreachable() {
        let map: GridMap = "..X..\n..X..\n..X..".parse().unwrap();
        let mut finder = DepthFirst::new(&map, Point::new(0, 1), Point::new(4, 1));
        assert_eq!(
            finder.finish(&map),
            PathFinderState::Unreachable {
                closest: Point::new(1, 1)
            }
        );
    }

    #[test]
    fn test_never_shorter_than_bfs() {
        let mut rng = Lcg::new(11);
        for _ in 0..300 {
            let (map, start, goal) = random_map(&mut rng);
            let mut dfs = DepthFirst::new(&map, start, goal);
            let mut bfs = BreadthFirst::new(&map, start, goal);

            match (dfs.finish(&map), bfs.finish(&map)) {
                (PathFinderState::PathFound(deep), PathFinderState::PathFound(wide)) => {
                    assert_valid_path(&map, &deep.path, start, goal);
                    assert!(deep.total_cost >= wide.total_cost);
                }
                (PathFinderState::Unreachable { .. }, PathFinderState::Unreachable { .. }) => {
                    assert_eq!(brute_force_distance(&map, start, goal), None);
                }
                (d, b) => panic!("dfs {d:?} disagrees with bfs {b:?} in\n{map}"),
            }
            assert_tree(&map, dfs.visited(), start);
        }
    }
}
