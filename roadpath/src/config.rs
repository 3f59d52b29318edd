use std::{
    fmt::Display,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::{FindError, Result};

/// Where recorded frames go
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// `<label>.mp4` through the system ffmpeg
    #[default]
    Ffmpeg,
    /// numbered PNG files in a `<label>/` directory
    Png,
    /// frames are counted and dropped
    None,
}

impl Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SinkKind::Ffmpeg => "ffmpeg",
                SinkKind::Png => "png",
                SinkKind::None => "none",
            }
        )
    }
}

impl FromStr for SinkKind {
    type Err = FindError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ffmpeg" | "mp4" | "video" => Ok(SinkKind::Ffmpeg),
            "png" | "frames" => Ok(SinkKind::Png),
            "none" | "null" => Ok(SinkKind::None),
            _ => Err(FindError::config(format!("unknown sink '{s}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    pub fps: u32,
    /// Pixel changes per frame while searching
    pub search_throttle: u32,
    /// Pixel changes per frame while drawing the found path
    pub path_throttle: u32,
    pub sink: SinkKind,
    pub overwrite: bool,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            search_throttle: 100,
            path_throttle: 400,
            sink: SinkKind::default(),
            overwrite: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Holds `<id>_mask.png` and `<id>_sat.jpg` for every dataset
    pub images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub record: RecordConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("."),
            record: RecordConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.record.fps == 0 {
            return Err(FindError::config("fps must be at least 1"));
        }
        if self.record.search_throttle == 0 || self.record.path_throttle == 0 {
            return Err(FindError::config("throttles must be at least 1"));
        }
        Ok(())
    }

    /// Where the recording of `label` ends up, `None` if nothing is written to disk
    pub fn output_path(&self, label: &str) -> Option<PathBuf> {
        match self.record.sink {
            SinkKind::Ffmpeg => Some(self.output_dir.join(format!("{label}.mp4"))),
            SinkKind::Png => Some(self.output_dir.join(label)),
            SinkKind::None => None,
        }
    }
}
