use std::collections::VecDeque;

use crate::find::{
    EventQueue, MapTrait, PathFinderState, Search, SearchTree, VisitState, Visited,
};

/// Breadth-first search. Nodes are expanded in order of their distance from the start, so the
/// first time the goal is dequeued it has been reached by a shortest path.
pub struct BreadthFirst<M: MapTrait> {
    tree: SearchTree<M>,
    queue: VecDeque<M::Reference>,
}

impl<M: MapTrait> BreadthFirst<M> {
    pub fn new(map: &M, start: M::Reference, goal: M::Reference) -> Self {
        Self {
            tree: SearchTree::new(map, start, goal),
            queue: VecDeque::from([start]),
        }
    }
}

impl<M: MapTrait> Search<M> for BreadthFirst<M> {
    fn step(
        &mut self,
        map: &M,
        events: &mut EventQueue<M::Reference>,
    ) -> PathFinderState<M::Reference> {
        if self.tree.state.is_done() {
            return self.tree.state.clone();
        }
        self.tree.emit_seed(events);

        let Some(current) = self.queue.pop_front() else {
            return self.tree.exhausted();
        };

        if current == self.tree.goal {
            return self.tree.found();
        }

        for neighbor in map.neighbors_of(current) {
            if self.tree.observe(map, neighbor, events)
                && self.tree.state_of(neighbor) == VisitState::Unvisited
            {
                self.tree.mark_visited(map, neighbor, current, events);
                self.queue.push_back(neighbor);
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
