use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use kmeans_perf::{
    config::default_speedup_output, run_schedule, run_speedup, AnalysisConfig, BaselineRule,
    ConsoleSummary, MetricSink, Outcome, ScheduleCsv, SpeedupCsv, TimeField,
};

#[derive(Parser)]
#[command(name = "kmeans-perf", about = "Speedup and schedule analysis for k-means benchmark runs")]
struct Cli {
    /// Log every grouping and baseline decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append speedup to a results table and summarize it
    Speedup {
        /// CSV with n_pontos, n_centroids, n_threads, tempo and optional serial_omp
        input: PathBuf,

        /// Where to write the table with the speedup column
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Baseline::ThreadCount)]
        baseline_rule: Baseline,
    },
    /// Compare schedule policies and chunk sizes from a sweep log
    Schedule {
        /// Text log of the schedule sweep
        input: PathBuf,

        /// Write one CSV row per run with its relative metrics
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Time::Seconds)]
        time: Time,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Baseline {
    /// The run with a single thread
    ThreadCount,
    /// Fall back to the run flagged serial_omp when no single-thread run exists
    SerialFlag,
}

impl From<Baseline> for BaselineRule {
    fn from(b: Baseline) -> Self {
        match b {
            Baseline::ThreadCount => BaselineRule::ThreadCount,
            Baseline::SerialFlag => BaselineRule::ThreadCountOrSerialFlag,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Time {
    Seconds,
    Millis,
}

impl From<Time> for TimeField {
    fn from(t: Time) -> Self {
        match t {
            Time::Seconds => TimeField::Seconds,
            Time::Millis => TimeField::Millis,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut console = ConsoleSummary::new(io::stdout());

    let outcome = match cli.command {
        Command::Speedup {
            input,
            output,
            baseline_rule,
        } => {
            let config = AnalysisConfig::default().with_baseline_rule(baseline_rule.into());
            let output = output.unwrap_or_else(|| default_speedup_output(&input));
            let mut csv = SpeedupCsv::new(output);
            run_speedup(&input, &config, &mut [&mut console, &mut csv])?
        }
        Command::Schedule {
            input,
            output,
            time,
        } => {
            let config = AnalysisConfig::default().with_schedule_time(time.into());
            let mut csv = output.map(ScheduleCsv::new);
            let mut sinks: Vec<&mut dyn MetricSink> = Vec::new();
            sinks.push(&mut console);
            if let Some(csv) = csv.as_mut() {
                sinks.push(csv);
            }
            run_schedule(&input, &config, &mut sinks)?
        }
    };

    match outcome {
        Outcome::NoResults => println!("No results found"),
        Outcome::Completed {
            sink_failures: 0, ..
        } => {}
        Outcome::Completed {
            records,
            sink_failures,
        } => log::warn!("{records} record(s) analyzed, {sink_failures} output(s) failed"),
    }
    Ok(())
}
