//! Grid path finding on road masks, recorded frame by frame.

pub mod astar;
pub mod bfs;
pub mod config;
pub mod dataset;
pub mod dfs;
pub mod encode;
pub mod error;
pub mod find;
pub mod grid;
pub mod hill;
pub mod path;
pub mod record;
pub mod run;
pub mod strategy;
pub mod util;

#[cfg(test)]
mod testing;

pub use config::{Config, RecordConfig, SinkKind};
pub use dataset::Dataset;
pub use error::{Endpoint, FindError, Result};
pub use find::{
    Event, MapStorage, MapTrait, Mark, PathFinderState, PathOutcome, PathResult, Search,
    SearchEvents,
};
pub use grid::{Cell, GridMap, Point};
pub use record::{palette, FrameRecorder, FrameSink, MemorySink, NullSink};
pub use run::{compare, run, run_dataset, trace, RunReport};
pub use strategy::Strategy;
