mod driver;

use anyhow::Context;
use beatframe::{AnalysisEngine, Band, Config, Frame};
use driver::input;
use driver::report;
use driver::simulate::Simulator;
use std::env;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SIMULATED_TICKS: usize = 600;

const USAGE: &str = "\
Usage: beatframe [OPTIONS]

Reads `t_ms low mid high all [bin ...]` lines from stdin and prints one
analysed frame per line.

Options:
  --db             Band values are compressor reductions in dB
  --simulate       Analyse a synthetic beat pattern instead of stdin
  --ticks N        Number of simulated ticks (default: 600)
  --seed N         Seed for the simulation
  --config PATH    Config file (default: ~/.beatframe.toml)
  -h, --help       Show this message";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.contains(&"--help".to_string()) || args.contains(&"-h".to_string()) {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = match flag_value(&args, "--config") {
        Some(path) => Config::load_from(Path::new(path))
            .with_context(|| format!("loading config from {}", path))?,
        None => Config::load(),
    };

    let mut engine = AnalysisEngine::new(config.analysis());
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", report::header(engine.config().spectrum_bins() > 0))?;

    let mut summary = Summary::default();

    if args.contains(&"--simulate".to_string()) {
        let ticks = match flag_value(&args, "--ticks") {
            Some(n) => n.parse().with_context(|| format!("invalid --ticks '{}'", n))?,
            None => DEFAULT_SIMULATED_TICKS,
        };
        let seed = match flag_value(&args, "--seed") {
            Some(n) => n.parse().with_context(|| format!("invalid --seed '{}'", n))?,
            None => rand::random(),
        };
        info!(ticks, seed, "simulating");

        let mut sim = Simulator::new(seed, config.tick_interval_ms(), config.level_mode());
        for _ in 0..ticks {
            let (readings, spectrum) = sim.next_tick();
            if let Some(frame) = engine.tick(&readings, Some(spectrum)) {
                summary.record(&frame);
                writeln!(out, "{}", report::format_frame(&frame))?;
            }
        }
    } else {
        let db = args.contains(&"--db".to_string());
        let stdin = io::stdin();
        for (i, line) in stdin.lock().lines().enumerate() {
            let line = line.context("reading stdin")?;
            let Some(tick) = input::parse_line(i + 1, &line, db)? else {
                continue;
            };
            let spectrum = (!tick.spectrum.is_empty()).then_some(tick.spectrum.as_slice());
            match engine.tick(&tick.readings, spectrum) {
                Some(frame) => {
                    summary.record(&frame);
                    writeln!(out, "{}", report::format_frame(&frame))?;
                }
                None => summary.skipped += 1,
            }
        }
    }

    out.flush()?;
    info!(
        frames = summary.frames,
        skipped = summary.skipped,
        low_hits = summary.hits[0],
        mid_hits = summary.hits[1],
        high_hits = summary.hits[2],
        all_hits = summary.hits[3],
        "done"
    );
    Ok(())
}

/// Value following `flag` on the command line
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[derive(Default)]
struct Summary {
    frames: usize,
    skipped: usize,
    hits: [usize; 4],
}

impl Summary {
    fn record(&mut self, frame: &Frame) {
        self.frames += 1;
        for (i, band) in Band::ALL.into_iter().enumerate() {
            if frame.hit(band) {
                self.hits[i] += 1;
            }
        }
    }
}
