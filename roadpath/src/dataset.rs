use std::path::{Path, PathBuf};

use image::RgbImage;
use log::info;

use crate::error::{FindError, Result};
use crate::grid::GridMap;
use crate::util::{load_rgb, parse_rgb};

pub fn mask_path(images_dir: &Path, id: &str) -> PathBuf {
    images_dir.join(format!("{id}_mask.png"))
}

pub fn background_path(images_dir: &Path, id: &str) -> PathBuf {
    images_dir.join(format!("{id}_sat.jpg"))
}

/// A road mask and the satellite image it was drawn from
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: String,
    pub map: GridMap,
    pub background: RgbImage,
}

impl Dataset {
    /// Loads `<id>_mask.png` and `<id>_sat.jpg` from `images_dir`
    pub fn open(images_dir: &Path, id: &str) -> Result<Self> {
        Self::load(
            id,
            &background_path(images_dir, id),
            &mask_path(images_dir, id),
        )
    }

    /// Loads an explicitly chosen pair. The file names have to say which is which.
    pub fn from_files(background: &Path, mask: &Path) -> Result<Self> {
        check_name(background, "sat")?;
        check_name(mask, "mask")?;

        let id = mask
            .file_stem()
            .map(|s| s.to_string_lossy().trim_end_matches("_mask").to_string())
            .unwrap_or_default();
        Self::load(&id, background, mask)
    }

    pub fn from_parts(id: impl Into<String>, map: GridMap, background: RgbImage) -> Result<Self> {
        let mask = (map.width as u32, map.height as u32);
        if background.dimensions() != mask {
            return Err(FindError::DimensionMismatch {
                mask,
                background: background.dimensions(),
            });
        }
        Ok(Self {
            id: id.into(),
            map,
            background,
        })
    }

    fn load(id: &str, background: &Path, mask: &Path) -> Result<Self> {
        let mask_img = load_rgb(mask)?;
        let background = load_rgb(background)?;
        let map = parse_rgb(&mask_img)?;

        info!(
            "dataset {id}: {}x{} cells, {} on roads",
            map.width,
            map.height,
            map.free_count()
        );
        Self::from_parts(id, map, background)
    }
}

fn check_name(path: &Path, expected: &'static str) -> Result<()> {
    let named = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().contains(expected));
    if named {
        Ok(())
    } else {
        Err(FindError::DatasetNaming {
            path: path.to_path_buf(),
            expected,
        })
    }
}
