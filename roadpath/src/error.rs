//! Error types for roadpath

use std::{fmt::Display, path::PathBuf};

use thiserror::Error;

use crate::grid::Point;

/// Which end of a route a validation error refers to
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Endpoint {
    Origin,
    Target,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Endpoint::Origin => "origin",
                Endpoint::Target => "target",
            }
        )
    }
}

#[derive(Error, Debug)]
pub enum FindError {
    #[error("{endpoint} {point} lies outside the {width}x{height} map")]
    OutOfBounds {
        endpoint: Endpoint,
        point: Point,
        width: usize,
        height: usize,
    },

    #[error("{endpoint} {point} is not on a road")]
    NotTraversable { endpoint: Endpoint, point: Point },

    #[error("failed to load image '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("background is {background:?} but mask is {mask:?}")]
    DimensionMismatch {
        mask: (u32, u32),
        background: (u32, u32),
    },

    #[error("'{}' is not a {expected} image", path.display())]
    DatasetNaming { path: PathBuf, expected: &'static str },

    #[error("unknown strategy '{0}' (expected bfs, dfs, astar or hill-climbing)")]
    UnknownStrategy(String),

    #[error("invalid point '{0}' (expected x,y)")]
    InvalidPoint(String),

    #[error("invalid map: {0}")]
    InvalidMap(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("encoding error: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl FindError {
    pub fn encode(msg: impl Into<String>) -> Self {
        FindError::Encode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        FindError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FindError>;
