use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use roadpath::{Config, Dataset, PathOutcome, Point, RunReport, SinkKind, Strategy};

#[derive(Parser, Debug)]
#[command(name = "roadpath", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search one dataset with one strategy and record it.
    Run(RunArgs),
    /// Search one dataset with every strategy in turn.
    Compare(CompareArgs),
    /// Like `run`, with the satellite image and mask given as files.
    Files(FilesArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Start cell as `x,y`.
    #[arg(long)]
    origin: Point,

    /// Goal cell as `x,y`.
    #[arg(long)]
    target: Point,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// JSON configuration file; flags given here override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding `<id>_mask.png` and `<id>_sat.jpg`.
    #[arg(long)]
    images: Option<PathBuf>,

    /// Directory the recordings are written to.
    #[arg(long)]
    out: Option<PathBuf>,

    /// ffmpeg, png or none.
    #[arg(long)]
    sink: Option<SinkKind>,

    #[arg(long)]
    fps: Option<u32>,

    /// Pixel changes per frame while searching.
    #[arg(long)]
    search_throttle: Option<u32>,

    /// Pixel changes per frame while drawing the path.
    #[arg(long)]
    path_throttle: Option<u32>,
}

impl OutputArgs {
    fn load(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("load config '{}'", path.display()))?,
            None => Config::default(),
        };

        if let Some(images) = &self.images {
            config.images_dir = images.clone();
        }
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(sink) = self.sink {
            config.record.sink = sink;
        }
        if let Some(fps) = self.fps {
            config.record.fps = fps;
        }
        if let Some(throttle) = self.search_throttle {
            config.record.search_throttle = throttle;
        }
        if let Some(throttle) = self.path_throttle {
            config.record.path_throttle = throttle;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// bfs, dfs, astar or hill-climbing.
    #[arg(long)]
    strategy: Strategy,

    /// Dataset id, resolved inside the images directory.
    #[arg(long)]
    dataset: String,

    #[command(flatten)]
    route: RouteArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CompareArgs {
    #[arg(long)]
    dataset: String,

    #[command(flatten)]
    route: RouteArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct FilesArgs {
    #[arg(long)]
    strategy: Strategy,

    /// Satellite image, its file name must contain `sat`.
    #[arg(long)]
    sat: PathBuf,

    /// Road mask, its file name must contain `mask`.
    #[arg(long)]
    mask: PathBuf,

    #[command(flatten)]
    route: RouteArgs,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Compare(args) => cmd_compare(args),
        Command::Files(args) => cmd_files(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.output.load()?;
    let report = roadpath::run(
        args.strategy,
        args.route.origin,
        args.route.target,
        &args.dataset,
        &config,
    )
    .with_context(|| format!("{} on dataset '{}'", args.strategy, args.dataset))?;

    print_report(&report);
    Ok(())
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let config = args.output.load()?;
    let dataset = Dataset::open(&config.images_dir, &args.dataset)
        .with_context(|| format!("open dataset '{}'", args.dataset))?;

    for report in roadpath::compare(&dataset, args.route.origin, args.route.target, &config)? {
        print_report(&report);
    }
    Ok(())
}

fn cmd_files(args: FilesArgs) -> anyhow::Result<()> {
    let config = args.output.load()?;
    let dataset = Dataset::from_files(&args.sat, &args.mask)?;
    let report = roadpath::run_dataset(
        args.strategy,
        &dataset,
        args.route.origin,
        args.route.target,
        &config,
    )?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let result = match &report.outcome {
        PathOutcome::Found(path) => format!("path of {} steps", path.total_cost),
        PathOutcome::Unreachable { closest } => {
            format!("target unreachable, closest cell reached {closest}")
        }
        PathOutcome::NoPath { stalled_at } => format!("no path, stuck at {stalled_at}"),
    };
    let output = report
        .output
        .as_ref()
        .map(|p| format!(" -> {}", p.display()))
        .unwrap_or_default();

    println!(
        "{:<12} {result} ({} frames){output}",
        report.recording.label, report.recording.frames
    );
}
