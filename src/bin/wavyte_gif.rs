use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use wavyte_gif::{
    FrameTable, GifDecoder, GifPlayer, GifPlayerOpts, GifSource, GraphDef, ImageGifDecoder,
    NullPresenter, PngPresenter, TickReport, Transport,
};

#[derive(Parser, Debug)]
#[command(name = "wavyte-gif", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a GIF's frame table as JSON.
    Inspect(InspectArgs),
    /// Write the frame visible at a given time as a PNG.
    Frame(FrameArgs),
    /// Drive a graph JSON file with a transport and print one JSON line per tick.
    Timeline(TimelineArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input GIF.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Playback time in seconds.
    #[arg(long, allow_negative_numbers = true)]
    time: f64,

    /// Clamp to the last frame instead of wrapping around.
    #[arg(long)]
    no_loop: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Input graph JSON. Source paths are resolved relative to this file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of ticks to run (defaults to the graph duration).
    #[arg(long)]
    frames: Option<u64>,

    /// Pace ticks at the graph's refresh rate instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,
}

#[derive(serde::Serialize)]
struct InspectReport {
    source: String,
    width: u32,
    height: u32,
    frame_count: usize,
    duration_s: f64,
    frame_rate: Option<f64>,
    frames: Vec<InspectFrame>,
}

#[derive(serde::Serialize)]
struct InspectFrame {
    index: usize,
    delay_ms: u32,
    start_ms: u64,
    end_ms: u64,
}

#[derive(serde::Serialize)]
struct TickLine<'a> {
    tick: u64,
    time_s: f64,
    #[serde(flatten)]
    report: TickReport,
    sources: Vec<SourceLine<'a>>,
}

#[derive(serde::Serialize)]
struct SourceLine<'a> {
    id: &'a str,
    ready: bool,
    frame: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Timeline(args) => cmd_timeline(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let source = GifSource::from(args.in_path.as_path());
    let decoded = ImageGifDecoder::new().decode(&source)?;
    let table = FrameTable::from_decoded(decoded)?;

    let mut frames = Vec::with_capacity(table.len());
    for (index, frame) in table.frames().iter().enumerate() {
        frames.push(InspectFrame {
            index,
            delay_ms: frame.delay_ms,
            start_ms: table.start_ms(index).unwrap_or_default(),
            end_ms: table.end_ms(index).unwrap_or_default(),
        });
    }

    let report = InspectReport {
        source: source.label(),
        width: table.canvas().width,
        height: table.canvas().height,
        frame_count: table.len(),
        duration_s: table.duration_s(),
        frame_rate: table.frame_rate().ok(),
        frames,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize frame table")?
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut player = GifPlayer::new(
        GifPlayerOpts {
            looping: !args.no_loop,
        },
        Arc::new(ImageGifDecoder::new()),
        PngPresenter::new(&args.out),
    );
    player.load(args.in_path.as_path())?;
    player
        .wait_load()
        .with_context(|| format!("load gif '{}'", args.in_path.display()))?;
    player.seek(args.time)?;
    player.refresh()?;

    let index = player
        .presenter()
        .last_index()
        .context("no frame was presented")?;
    eprintln!("wrote {} (frame {index})", args.out.display());
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let def = GraphDef::from_path(&args.in_path)?;
    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut graph = def.build_with(assets_root, Arc::new(ImageGifDecoder::new()), |_| {
        Ok(NullPresenter)
    })?;

    let names: Vec<String> = graph
        .node_ids()
        .map(|id| graph.display_name(id).map(str::to_owned))
        .collect::<Result<_, _>>()?;

    let ticks = args.frames.unwrap_or_else(|| def.tick_count());
    let interval = Duration::from_secs_f64(def.fps.frame_duration_secs());
    let mut transport = Transport::new(def.fps);
    transport.play();

    let started = Instant::now();
    for tick in 0..ticks {
        let time_s = transport.time_s();
        let report = graph.tick(time_s)?;

        let mut sources = Vec::with_capacity(names.len());
        for (id, name) in graph.node_ids().zip(&names) {
            sources.push(SourceLine {
                id: name,
                ready: graph.is_ready(id)?,
                frame: graph.current_frame(id)?,
            });
        }
        let line = TickLine {
            tick,
            time_s,
            report,
            sources,
        };
        println!(
            "{}",
            serde_json::to_string(&line).context("serialize tick report")?
        );

        transport.step();
        if args.realtime {
            let due = interval.saturating_mul(u32::try_from(tick + 1).unwrap_or(u32::MAX));
            if let Some(wait) = due.checked_sub(started.elapsed()) {
                std::thread::sleep(wait);
            }
        }
    }
    Ok(())
}
