use std::{
    collections::VecDeque,
    fmt::{Debug, Display},
    ops::{Deref, DerefMut},
};

use log::debug;

use crate::grid::Cell;
use crate::path::reconstruct;

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided node reference is valid
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// The traversability of a node, `Cell::Unknown` for anything outside the map
    fn classify(&self, node: Self::Reference) -> Cell;

    /// Return an iterator over the neighbors of the provided node that lie inside the map,
    /// traversable or not, always in the order up, down, left, right
    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference>;

    /// Straight-line distance between two nodes
    fn distance(&self, a: Self::Reference, b: Self::Reference) -> f64;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn is_valid(&self, node: Self::Reference) -> bool;
    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// Predecessor map entry: the number of steps from the start and the node we came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisitedItem<R> {
    pub cost: usize,
    pub from: Option<R>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visited<R>(pub Option<VisitedItem<R>>);

impl<R> Default for Visited<R> {
    fn default() -> Self {
        Visited(None)
    }
}
impl<R> Deref for Visited<R> {
    type Target = Option<VisitedItem<R>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<R> DerefMut for Visited<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
impl<R> Display for Visited<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(item) => write!(f, "{:03} ", item.cost),
            None => write!(f, "{:03} ", ""),
        }
    }
}

/// Per-search state of a single node.
/// `Unvisited -> Frontier -> Visited` or `Unvisited -> BlockedObserved`, never backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisitState {
    #[default]
    Unvisited,
    Frontier,
    Visited,
    BlockedObserved,
}

/// What happened to a node, as seen by whoever renders the search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mark {
    Frontier,
    Visited,
    BlockedObserved,
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event<R> {
    pub node: R,
    pub mark: Mark,
}

pub type EventQueue<R> = VecDeque<Event<R>>;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    pub path: Vec<R>,
    pub start: R,
    pub goal: R,
    pub total_cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    PathFound(PathResult<R>),
    /// Every reachable node was expanded without meeting the goal
    Unreachable { closest: R },
    /// Greedy descent found no neighbor closer to the goal
    NoPath { stalled_at: R },
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }

    pub fn into_outcome(self) -> Option<PathOutcome<R>> {
        match self {
            PathFinderState::Computing => None,
            PathFinderState::PathFound(result) => Some(PathOutcome::Found(result)),
            PathFinderState::Unreachable { closest } => Some(PathOutcome::Unreachable { closest }),
            PathFinderState::NoPath { stalled_at } => Some(PathOutcome::NoPath { stalled_at }),
        }
    }
}

/// The final answer of a search, shared by every strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome<R> {
    Found(PathResult<R>),
    Unreachable { closest: R },
    NoPath { stalled_at: R },
}

impl<R> PathOutcome<R> {
    pub fn path(&self) -> Option<&[R]> {
        match self {
            PathOutcome::Found(result) => Some(&result.path),
            _ => None,
        }
    }
}

/// A search strategy driven one expansion at a time.
///
/// Every call to `step` appends the state transitions it caused to `events`, so the search can be
/// rendered without the strategy knowing anything about rendering.
pub trait Search<M: MapTrait> {
    fn step(
        &mut self,
        map: &M,
        events: &mut EventQueue<M::Reference>,
    ) -> PathFinderState<M::Reference>;

    fn state(&self) -> &PathFinderState<M::Reference>;

    /// The predecessor map built so far
    fn visited(&self) -> &M::Storage<Visited<M::Reference>>;

    fn start(&self) -> M::Reference;

    fn goal(&self) -> M::Reference;

    /// Run to completion, discarding the events
    fn finish(&mut self, map: &M) -> PathFinderState<M::Reference> {
        let mut events = EventQueue::new();
        loop {
            match self.step(map, &mut events) {
                PathFinderState::Computing => events.clear(),
                s => return s,
            }
        }
    }
}

/// Book-keeping shared by all strategies: visit states, the predecessor map and the node closest
/// to the goal seen so far.
pub(crate) struct SearchTree<M: MapTrait> {
    pub start: M::Reference,
    pub goal: M::Reference,
    pub state: PathFinderState<M::Reference>,
    states: M::Storage<VisitState>,
    visited: M::Storage<Visited<M::Reference>>,
    closest: (M::Reference, f64),
    seeded: bool,
}

impl<M: MapTrait> SearchTree<M> {
    /// The start is marked visited before any expansion happens
    pub fn new(map: &M, start: M::Reference, goal: M::Reference) -> Self {
        let mut states: M::Storage<VisitState> = map.create_storage();
        let mut visited: M::Storage<Visited<M::Reference>> = map.create_storage();
        *states.get_mut(start) = VisitState::Visited;
        *visited.get_mut(start) = Visited(Some(VisitedItem {
            cost: 0,
            from: None,
        }));

        Self {
            start,
            goal,
            state: PathFinderState::Computing,
            states,
            visited,
            closest: (start, map.distance(start, goal)),
            seeded: false,
        }
    }

    /// Announces the start node the first time it is called
    pub fn emit_seed(&mut self, events: &mut EventQueue<M::Reference>) {
        if !self.seeded {
            self.seeded = true;
            events.push_back(Event {
                node: self.start,
                mark: Mark::Visited,
            });
        }
    }

    pub fn state_of(&self, node: M::Reference) -> VisitState {
        self.states.get(node)
    }

    pub fn visited(&self) -> &M::Storage<Visited<M::Reference>> {
        &self.visited
    }

    pub fn cost(&self, node: M::Reference) -> Option<usize> {
        self.visited.get(node).0.map(|item| item.cost)
    }

    /// Returns true if the node can be entered. Non-traversable nodes are reported once as
    /// blocked the first time they are seen.
    pub fn observe(
        &mut self,
        map: &M,
        node: M::Reference,
        events: &mut EventQueue<M::Reference>,
    ) -> bool {
        if map.classify(node).is_free() {
            return true;
        }
        if self.states.get(node) == VisitState::Unvisited {
            self.transition(node, VisitState::BlockedObserved, events);
        }
        false
    }

    pub fn transition(
        &mut self,
        node: M::Reference,
        to: VisitState,
        events: &mut EventQueue<M::Reference>,
    ) {
        *self.states.get_mut(node) = to;
        let mark = match to {
            VisitState::Unvisited => return,
            VisitState::Frontier => Mark::Frontier,
            VisitState::Visited => Mark::Visited,
            VisitState::BlockedObserved => Mark::BlockedObserved,
        };
        events.push_back(Event { node, mark });
    }

    /// Point `node` at `from`, one step further from the start than `from` is
    pub fn record(&mut self, map: &M, node: M::Reference, from: M::Reference) {
        let cost = self.cost(from).map_or(0, |c| c + 1);
        *self.visited.get_mut(node) = Visited(Some(VisitedItem {
            cost,
            from: Some(from),
        }));

        let distance = map.distance(node, self.goal);
        if distance < self.closest.1 {
            self.closest = (node, distance);
        }
    }

    pub fn mark_visited(
        &mut self,
        map: &M,
        node: M::Reference,
        from: M::Reference,
        events: &mut EventQueue<M::Reference>,
    ) {
        self.record(map, node, from);
        self.transition(node, VisitState::Visited, events);
    }

    pub fn found(&mut self) -> PathFinderState<M::Reference> {
        self.state = match reconstruct(&self.visited, self.goal) {
            Some(path) => {
                debug!("found goal {:?}, {} steps", self.goal, path.len() - 1);
                PathFinderState::PathFound(PathResult {
                    total_cost: path.len() - 1,
                    path,
                    start: self.start,
                    goal: self.goal,
                })
            }
            None => PathFinderState::Unreachable {
                closest: self.closest.0,
            },
        };
        self.state.clone()
    }

    pub fn exhausted(&mut self) -> PathFinderState<M::Reference> {
        debug!(
            "frontier exhausted before reaching {:?}, closest {:?}",
            self.goal, self.closest.0
        );
        self.state = PathFinderState::Unreachable {
            closest: self.closest.0,
        };
        self.state.clone()
    }

    pub fn stalled(&mut self, at: M::Reference) -> PathFinderState<M::Reference> {
        debug!("no neighbor of {:?} is closer to {:?}", at, self.goal);
        self.state = PathFinderState::NoPath { stalled_at: at };
        self.state.clone()
    }
}

/// Lazily drives a search and yields the transitions it produces, one at a time
pub struct SearchEvents<'m, M: MapTrait> {
    map: &'m M,
    search: Box<dyn Search<M>>,
    pending: EventQueue<M::Reference>,
    state: PathFinderState<M::Reference>,
    steps: usize,
}

impl<'m, M: MapTrait> SearchEvents<'m, M> {
    pub fn new(map: &'m M, search: Box<dyn Search<M>>) -> Self {
        Self {
            map,
            search,
            pending: EventQueue::new(),
            state: PathFinderState::Computing,
            steps: 0,
        }
    }

    pub fn state(&self) -> &PathFinderState<M::Reference> {
        &self.state
    }

    /// Number of expansions performed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Drain the remaining events and return how the search ended
    pub fn into_outcome(mut self) -> PathOutcome<M::Reference> {
        loop {
            if let Some(outcome) = self.state.clone().into_outcome() {
                return outcome;
            }
            self.by_ref().for_each(drop);
        }
    }
}

impl<'m, M: MapTrait> Iterator for SearchEvents<'m, M> {
    type Item = Event<M::Reference>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.state.is_done() {
                return None;
            }
            self.state = self.search.step(self.map, &mut self.pending);
            self.steps += 1;
        }
    }
}
