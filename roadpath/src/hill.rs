use crate::find::{
    EventQueue, MapTrait, PathFinderState, Search, SearchTree, VisitState, Visited,
};

/// Greedy hill climbing: always move to the unvisited neighbor closest to the goal.
///
/// There is no frontier to fall back on. When the best neighbor is not strictly closer to the
/// goal than the current node the search gives up with `NoPath`, even if the goal could be
/// reached by a detour. Equally close neighbors are resolved by neighbor order.
pub struct HillClimbing<M: MapTrait> {
    tree: SearchTree<M>,
    current: M::Reference,
}

impl<M: MapTrait> HillClimbing<M> {
    pub fn new(map: &M, start: M::Reference, goal: M::Reference) -> Self {
        Self {
            tree: SearchTree::new(map, start, goal),
            current: start,
        }
    }
}

impl<M: MapTrait> Search<M> for HillClimbing<M> {
    fn step(
        &mut self,
        map: &M,
        events: &mut EventQueue<M::Reference>,
    ) -> PathFinderState<M::Reference> {
        if self.tree.state.is_done() {
            return self.tree.state.clone();
        }
        self.tree.emit_seed(events);

        let current = self.current;
        if current == self.tree.goal {
            return self.tree.found();
        }

        let mut best: Option<(M::Reference, f64)> = None;
        for neighbor in map.neighbors_of(current) {
            if !self.tree.observe(map, neighbor, events)
                || self.tree.state_of(neighbor) != VisitState::Unvisited
            {
                continue;
            }
            let distance = map.distance(neighbor, self.tree.goal);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((neighbor, distance));
            }
        }

        let Some((next, distance)) = best else {
            return self.tree.exhausted();
        };

        if distance >= map.distance(current, self.tree.goal) {
            return self.tree.stalled(current);
        }

        self.tree.mark_visited(map, next, current, events);
        self.current = next;

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
