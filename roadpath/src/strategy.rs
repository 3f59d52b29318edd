use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::astar::AStar;
use crate::bfs::BreadthFirst;
use crate::dfs::DepthFirst;
use crate::error::FindError;
use crate::find::{MapTrait, Search};
use crate::hill::HillClimbing;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
    AStar,
    HillClimbing,
}

impl Strategy {
    /// In the order they are compared
    pub const ALL: [Strategy; 4] = [
        Strategy::BreadthFirst,
        Strategy::AStar,
        Strategy::DepthFirst,
        Strategy::HillClimbing,
    ];

    /// Short name used in output file names
    pub fn label(self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "BFS",
            Strategy::DepthFirst => "DFS",
            Strategy::AStar => "AStar",
            Strategy::HillClimbing => "HillClimbing",
        }
    }

    /// `<label>_Visualization`, the base name of the recording
    pub fn recording_name(self) -> String {
        format!("{}_Visualization", self.label())
    }

    /// Whether the returned path is always a shortest one
    pub fn is_optimal(self) -> bool {
        matches!(self, Strategy::BreadthFirst | Strategy::AStar)
    }

    pub fn start<M: MapTrait + 'static>(
        self,
        map: &M,
        start: M::Reference,
        goal: M::Reference,
    ) -> Box<dyn Search<M>> {
        match self {
            Strategy::BreadthFirst => Box::new(BreadthFirst::new(map, start, goal)),
            Strategy::DepthFirst => Box::new(DepthFirst::new(map, start, goal)),
            Strategy::AStar => Box::new(AStar::new(map, start, goal)),
            Strategy::HillClimbing => Box::new(HillClimbing::new(map, start, goal)),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Strategy::BreadthFirst => "bfs",
                Strategy::DepthFirst => "dfs",
                Strategy::AStar => "astar",
                Strategy::HillClimbing => "hill-climbing",
            }
        )
    }
}

impl FromStr for Strategy {
    type Err = FindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "bfs" | "breadth-first" => Ok(Strategy::BreadthFirst),
            "dfs" | "depth-first" => Ok(Strategy::DepthFirst),
            "astar" | "a*" | "a-star" => Ok(Strategy::AStar),
            "hill-climbing" | "hillclimbing" | "hill" => Ok(Strategy::HillClimbing),
            _ => Err(FindError::UnknownStrategy(s.to_string())),
        }
    }
}
