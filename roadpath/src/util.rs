use std::path::Path;

use image::RgbImage;

use crate::error::{FindError, Result};
use crate::grid::{Cell, GridMap, Point};

pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| FindError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Classify every pixel of a mask: pure white is road, pure black is blocked, anything else is
/// unknown.
pub fn parse_rgb(img: &RgbImage) -> Result<GridMap> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    if width == 0 || height == 0 {
        return Err(FindError::InvalidMap("mask image is empty".to_string()));
    }

    let mut map = GridMap::new(width, height, Cell::Unknown);

    for (x, y, p) in img.enumerate_pixels() {
        map.set(Point::new(x as usize, y as usize), Cell::from_color(*p));
    }

    Ok(map)
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::record::palette;
    use image::Rgb;

    #[test]
    fn test_parse_mask() {
        let mut img = RgbImage::from_pixel(3, 2, palette::FREE);
        img.put_pixel(1, 0, palette::BLOCKED);
        img.put_pixel(2, 1, Rgb([250, 250, 250]));

        let map = parse_rgb(&img).unwrap();
        assert_eq!(map.width, 3);
        assert_eq!(map.height, 2);
        assert_eq!(map.to_string(), ".X.\n..?\n");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            parse_rgb(&RgbImage::new(0, 4)),
            Err(FindError::InvalidMap(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_rgb(Path::new("does/not/exist_mask.png")),
            Err(FindError::Load { .. })
        ));
    }
}
