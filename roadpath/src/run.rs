use std::path::PathBuf;

use image::Rgb;
use log::info;

use crate::config::{Config, SinkKind};
use crate::dataset::Dataset;
use crate::encode::{EncodeConfig, FfmpegSink, PngSequenceSink};
use crate::error::{Endpoint, FindError, Result};
use crate::find::{Event, Mark, PathOutcome, SearchEvents};
use crate::grid::{GridMap, Point};
use crate::path::highlight;
use crate::record::{palette, FrameRecorder, FrameSink, NullSink, RecordingSummary};
use crate::strategy::Strategy;

/// What one strategy produced on one dataset
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: Strategy,
    pub outcome: PathOutcome<Point>,
    pub recording: RecordingSummary,
    /// The video file or frame directory, if anything was written to disk
    pub output: Option<PathBuf>,
}

/// Both endpoints have to be inside the map and on a road
pub fn validate_endpoints(map: &GridMap, origin: Point, target: Point) -> Result<()> {
    for (endpoint, point) in [(Endpoint::Origin, origin), (Endpoint::Target, target)] {
        if !map.contains(point) {
            return Err(FindError::OutOfBounds {
                endpoint,
                point,
                width: map.width,
                height: map.height,
            });
        }
        if !map.classify(point).is_free() {
            return Err(FindError::NotTraversable { endpoint, point });
        }
    }
    Ok(())
}

fn color_of(mark: Mark) -> Option<Rgb<u8>> {
    match mark {
        // the frontier is not drawn
        Mark::Frontier => None,
        Mark::Visited => Some(palette::VISITED),
        Mark::BlockedObserved => Some(palette::BLOCKED_OBSERVED),
        Mark::Path => Some(palette::PATH),
    }
}

/// Draws every event into the recorder, returns how many pixels were changed
pub fn play<S: FrameSink>(
    events: impl IntoIterator<Item = Event<Point>>,
    recorder: &mut FrameRecorder<S>,
) -> Result<u64> {
    let mut marks = 0;
    for event in events {
        if let Some(color) = color_of(event.mark) {
            recorder.mark(event.node.x as u32, event.node.y as u32, color)?;
            marks += 1;
        }
    }
    Ok(marks)
}

/// Runs `strategy` from `origin` to `target` and records it.
///
/// The search is recorded with the recorder's current throttle. A found path is drawn afterwards
/// with `path_throttle`. The recorder is left open.
pub fn trace<S: FrameSink>(
    strategy: Strategy,
    map: &GridMap,
    origin: Point,
    target: Point,
    recorder: &mut FrameRecorder<S>,
    path_throttle: u32,
) -> Result<PathOutcome<Point>> {
    let map_size = (map.width as u32, map.height as u32);
    if recorder.dimensions() != map_size {
        return Err(FindError::DimensionMismatch {
            mask: map_size,
            background: recorder.dimensions(),
        });
    }
    validate_endpoints(map, origin, target)?;

    info!("{strategy}: searching from {origin} to {target}");

    let mut events = SearchEvents::new(map, strategy.start(map, origin, target));
    let marked = play(events.by_ref(), recorder)?;
    let steps = events.steps();
    let outcome = events.into_outcome();

    match &outcome {
        PathOutcome::Found(result) => {
            info!(
                "{strategy}: path of {} steps after {steps} expansions, {marked} cells drawn",
                result.total_cost
            );
            recorder.set_throttle(path_throttle)?;
            play(highlight(map, &result.path), recorder)?;
        }
        PathOutcome::Unreachable { closest } => {
            info!("{strategy}: {target} is unreachable, got as close as {closest}");
        }
        PathOutcome::NoPath { stalled_at } => {
            info!("{strategy}: no closer neighbor at {stalled_at}, giving up");
        }
    }

    Ok(outcome)
}

/// Opens the output configured for a recording named `label`
pub fn open_sink(
    config: &Config,
    label: &str,
    width: u32,
    height: u32,
) -> Result<Box<dyn FrameSink>> {
    let Some(path) = config.output_path(label) else {
        return Ok(Box::<NullSink>::default());
    };

    Ok(match config.record.sink {
        SinkKind::Ffmpeg => {
            let mut cfg = EncodeConfig::new(path, width, height, config.record.fps);
            cfg.overwrite = config.record.overwrite;
            Box::new(FfmpegSink::new(cfg)?)
        }
        SinkKind::Png => Box::new(PngSequenceSink::new(path, label)?),
        SinkKind::None => Box::<NullSink>::default(),
    })
}

/// Loads dataset `dataset_id` from the configured images directory and records one strategy on it
pub fn run(
    strategy: Strategy,
    origin: Point,
    target: Point,
    dataset_id: &str,
    config: &Config,
) -> Result<RunReport> {
    let dataset = Dataset::open(&config.images_dir, dataset_id)?;
    run_dataset(strategy, &dataset, origin, target, config)
}

pub fn run_dataset(
    strategy: Strategy,
    dataset: &Dataset,
    origin: Point,
    target: Point,
    config: &Config,
) -> Result<RunReport> {
    config.validate()?;
    validate_endpoints(&dataset.map, origin, target)?;

    let label = strategy.recording_name();
    let (width, height) = dataset.background.dimensions();
    let sink = open_sink(config, &label, width, height)?;
    let mut recorder = FrameRecorder::new(
        label.as_str(),
        dataset.background.clone(),
        sink,
        config.record.search_throttle,
    )?;

    // on error the recorder is dropped, which still finalizes the sink
    let outcome = trace(
        strategy,
        &dataset.map,
        origin,
        target,
        &mut recorder,
        config.record.path_throttle,
    )?;
    let recording = recorder.close()?;

    Ok(RunReport {
        strategy,
        outcome,
        recording: recording.summary,
        output: config.output_path(&label),
    })
}

/// Runs every strategy in turn. A failed search does not stop the others, an error does.
pub fn compare(
    dataset: &Dataset,
    origin: Point,
    target: Point,
    config: &Config,
) -> Result<Vec<RunReport>> {
    Strategy::ALL
        .into_iter()
        .map(|strategy| run_dataset(strategy, dataset, origin, target, config))
        .collect()
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::record::MemorySink;
    use crate::util::parse_rgb;

    fn background(map: &GridMap) -> image::RgbImage {
        image::RgbImage::from_fn(map.width as u32, map.height as u32, |x, y| {
            if map.classify(Point::new(x as usize, y as usize)).is_free() {
                palette::FREE
            } else {
                palette::BLOCKED
            }
        })
    }

    fn no_output() -> Config {
        let mut config = Config::default();
        config.record.sink = SinkKind::None;
        config
    }

    #[test]
    fn test_validate_endpoints() {
        let map: GridMap = "..X\n...".parse().unwrap();
        assert!(validate_endpoints(&map, Point::new(0, 0), Point::new(2, 1)).is_ok());
        assert!(matches!(
            validate_endpoints(&map, Point::new(0, 0), Point::new(3, 0)),
            Err(FindError::OutOfBounds {
                endpoint: Endpoint::Target,
                ..
            })
        ));
        assert!(matches!(
            validate_endpoints(&map, Point::new(2, 0), Point::new(0, 0)),
            Err(FindError::NotTraversable {
                endpoint: Endpoint::Origin,
                ..
            })
        ));
    }

    #[test]
    fn test_play_skips_frontier() {
        let mut recorder =
            FrameRecorder::new("play", image::RgbImage::new(2, 1), MemorySink::new(), 10).unwrap();
        let events = [
            Event {
                node: Point::new(0, 0),
                mark: Mark::Frontier,
            },
            Event {
                node: Point::new(1, 0),
                mark: Mark::BlockedObserved,
            },
        ];
        assert_eq!(play(events, &mut recorder).unwrap(), 1);
        assert_eq!(*recorder.frame().get_pixel(1, 0), palette::BLOCKED_OBSERVED);
        assert_eq!(*recorder.frame().get_pixel(0, 0), image::Rgb([0, 0, 0]));
    }

    #[test]
    fn test_trace_draws_path() {
        let map: GridMap = "....\n.XX.\n....".parse().unwrap();
        let mut recorder =
            FrameRecorder::new("trace", background(&map), MemorySink::new(), 3).unwrap();

        let outcome = trace(
            Strategy::BreadthFirst,
            &map,
            Point::new(0, 1),
            Point::new(3, 1),
            &mut recorder,
            5,
        )
        .unwrap();

        let path = outcome.path().unwrap().to_vec();
        assert_eq!(path.len(), 6);
        assert_eq!(recorder.throttle(), 5);
        let recording = recorder.close().unwrap();
        let last = recording.sink.frames.last().unwrap();
        for p in path {
            assert_eq!(*last.get_pixel(p.x as u32, p.y as u32), palette::PATH);
        }
        assert!(recording.sink.is_finished());
    }

    #[test]
    fn test_trace_rejects_wrong_background() {
        let map: GridMap = "...\n...".parse().unwrap();
        let mut recorder = FrameRecorder::new(
            "size",
            image::RgbImage::new(2, 2),
            MemorySink::new(),
            1,
        )
        .unwrap();
        assert!(matches!(
            trace(
                Strategy::AStar,
                &map,
                Point::new(0, 0),
                Point::new(1, 1),
                &mut recorder,
                1
            ),
            Err(FindError::DimensionMismatch { .. })
        ));
        assert_eq!(recorder.marks(), 0);
    }

    #[test]
    fn test_compare_runs_every_strategy() {
        let map: GridMap = ".....\n.XXX.\n.....".parse().unwrap();
        let dataset = Dataset::from_parts("cmp", map.clone(), background(&map)).unwrap();
        // the mask rendering parses back to the same map
        assert_eq!(parse_rgb(&dataset.background).unwrap(), map);

        let reports = compare(&dataset, Point::new(0, 1), Point::new(4, 1), &no_output()).unwrap();
        let strategies: Vec<_> = reports.iter().map(|r| r.strategy).collect();
        assert_eq!(strategies, Strategy::ALL.to_vec());

        for report in &reports {
            assert_eq!(report.output, None);
            assert!(report.recording.frames >= 1);
            assert_eq!(report.recording.label, report.strategy.recording_name());
        }
        assert_eq!(reports[0].outcome.path().map(|p| p.len()), Some(7));
    }

    #[test]
    fn test_run_rejects_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let map: GridMap = "...\n.X.".parse().unwrap();
        let dataset = Dataset::from_parts("bad", map.clone(), background(&map)).unwrap();

        let mut config = Config::default();
        config.output_dir = dir.path().to_path_buf();
        config.record.sink = SinkKind::Png;

        assert!(matches!(
            run_dataset(
                Strategy::DepthFirst,
                &dataset,
                Point::new(0, 0),
                Point::new(1, 1),
                &config
            ),
            Err(FindError::NotTraversable {
                endpoint: Endpoint::Target,
                ..
            })
        ));
        assert!(!dir.path().join("DFS_Visualization").exists());
    }

    #[test]
    fn test_run_writes_png_frames() {
        let dir = tempfile::tempdir().unwrap();
        let map: GridMap = "...\n...".parse().unwrap();
        let dataset = Dataset::from_parts("png", map.clone(), background(&map)).unwrap();

        let mut config = Config::default();
        config.output_dir = dir.path().to_path_buf();
        config.record.sink = SinkKind::Png;
        config.record.search_throttle = 2;

        let report = run_dataset(
            Strategy::HillClimbing,
            &dataset,
            Point::new(0, 0),
            Point::new(2, 1),
            &config,
        )
        .unwrap();

        let out = dir.path().join("HillClimbing_Visualization");
        assert_eq!(report.output, Some(out.clone()));
        let written = std::fs::read_dir(&out).unwrap().count() as u64;
        assert_eq!(written, report.recording.frames);
    }
}
