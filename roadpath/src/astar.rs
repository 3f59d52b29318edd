use std::{cmp::Ordering, collections::BinaryHeap};

use log::trace;

use crate::find::{
    EventQueue, MapTrait, PathFinderState, Search, SearchTree, VisitState, Visited,
};

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit<R> {
    /// g + straight-line distance to the goal
    estimate: f64,
    cost: usize,
    /// insertion order, equal estimates are served first-pushed-first
    seq: u64,
    point: R,
}

impl<R> Ord for ToVisit<R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // reverse for BinaryHeap to be a min-heap
        self.estimate
            .total_cmp(&other.estimate)
            .then_with(|| self.seq.cmp(&other.seq))
            .reverse()
    }
}

impl<R> PartialOrd for ToVisit<R> {
    fn partial_cmp(&self, other: &ToVisit<R>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> PartialEq for ToVisit<R> {
    fn eq(&self, other: &ToVisit<R>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R> Eq for ToVisit<R> {}

/// A* over unit steps with the straight-line distance as heuristic.
///
/// Nodes are pushed again whenever a strictly cheaper way to them is found; the outdated heap
/// entries stay in the heap and are skipped when they surface.
pub struct AStar<M: MapTrait> {
    tree: SearchTree<M>,
    visit_list: BinaryHeap<ToVisit<M::Reference>>,
    pushed: u64,
}

impl<M: MapTrait> AStar<M> {
    pub fn new(map: &M, start: M::Reference, goal: M::Reference) -> Self {
        Self {
            tree: SearchTree::new(map, start, goal),
            visit_list: BinaryHeap::from([ToVisit {
                estimate: map.distance(start, goal),
                cost: 0,
                seq: 0,
                point: start,
            }]),
            pushed: 1,
        }
    }
}

impl<M: MapTrait> Search<M> for AStar<M> {
    fn step(
        &mut self,
        map: &M,
        events: &mut EventQueue<M::Reference>,
    ) -> PathFinderState<M::Reference> {
        if self.tree.state.is_done() {
            return self.tree.state.clone();
        }
        self.tree.emit_seed(events);

        let Some(visit) = self.visit_list.pop() else {
            return self.tree.exhausted();
        };

        if self.tree.cost(visit.point).is_some_and(|g| visit.cost > g) {
            trace!("skipping superseded entry for {:?}", visit.point);
            return self.tree.state.clone();
        }

        if visit.point == self.tree.goal {
            return self.tree.found();
        }

        if self.tree.state_of(visit.point) == VisitState::Frontier {
            self.tree.transition(visit.point, VisitState::Visited, events);
        }

        let tentative = visit.cost + 1;
        for neighbor in map.neighbors_of(visit.point) {
            if !self.tree.observe(map, neighbor, events) {
                continue;
            }

            if self.tree.cost(neighbor).map_or(true, |g| tentative < g) {
                self.tree.record(map, neighbor, visit.point);
                if self.tree.state_of(neighbor) == VisitState::Unvisited {
                    self.tree.transition(neighbor, VisitState::Frontier, events);
                }
                self.visit_list.push(ToVisit {
                    estimate: tentative as f64 + map.distance(neighbor, self.tree.goal),
                    cost: tentative,
                    seq: self.pushed,
                    point: neighbor,
                });
                self.pushed += 1;
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
