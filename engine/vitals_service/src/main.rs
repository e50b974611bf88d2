mod error;
mod server;
mod simulator;

use std::fs;
use std::io::{self, Read};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;
use vitals_core::{
    AnalysisResult, AssessmentCoordinator, AssessmentError, VitalsInput,
    DEFAULT_HISTORY_CAPACITY,
};
use vitals_model::ModelSummary;

use crate::server::{AppState, HrHistoryRequest};
use crate::simulator::{DeviceSample, DeviceSimulator};

#[derive(Debug, Parser)]
#[command(
    name = "vitals",
    version,
    about = "Risk assessment for remote patient vitals",
    long_about = "vitals classifies heart rate, SpO2 and temperature readings as normal or\n\
        abnormal, forecasts the heart-rate trend and scores clinical risk.\n\n\
        EXAMPLES:\n\
        \n  vitals serve --port 5001                     Start the HTTP service\n\
        \n  echo '{\"HR\": 125}' | vitals analyze           Analyze one reading\n\
        \n  vitals forecast history.json                 Forecast from {\"hr_history\": [...]}\n\
        \n  vitals simulate --count 20 --seed 7 --analyze  Replay a simulated device"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP assessment service
    Serve(ServeArgs),

    /// Classify one reading as Normal or Abnormal
    Status(InputArgs),

    /// Classify and risk-score one reading
    Analyze(InputArgs),

    /// Forecast the next ten heart-rate values from a history
    Forecast(InputArgs),

    /// Emit readings from a simulated bedside device
    Simulate(SimulateArgs),
}

#[derive(Debug, Args, Clone)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "VITALS_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "VITALS_PORT", default_value_t = 5001)]
    port: u16,

    /// Allowed CORS origin (any origin when unset)
    #[arg(long = "cors-origin", env = "VITALS_CORS_ORIGIN", value_name = "ORIGIN")]
    cors_origin: Option<String>,

    /// Heart-rate samples kept for `GET /predict/hr`
    #[arg(
        long = "history-capacity",
        env = "VITALS_HISTORY_CAPACITY",
        default_value_t = DEFAULT_HISTORY_CAPACITY
    )]
    history_capacity: usize,
}

#[derive(Debug, Args, Clone)]
struct InputArgs {
    /// JSON input file (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args, Clone)]
struct SimulateArgs {
    /// Number of readings to emit
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Seed for a reproducible walk
    #[arg(long)]
    seed: Option<u64>,

    /// Delay between readings in milliseconds
    #[arg(long = "interval-ms", default_value_t = 0)]
    interval_ms: u64,

    /// Attach the full analysis to every reading
    #[arg(long)]
    analyze: bool,
}

#[derive(Serialize)]
struct SimulatedReading<'a> {
    #[serde(flatten)]
    sample: &'a DeviceSample,
    #[serde(skip_serializing_if = "Option::is_none")]
    ml: Option<AnalysisResult>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Train the startup classifier and wrap it in a coordinator.
fn build_engine() -> Result<(AssessmentCoordinator, ModelSummary), AssessmentError> {
    let model = vitals_model::train_default()?;
    let summary = model.summary().clone();
    Ok((AssessmentCoordinator::new(Arc::new(model)), summary))
}

fn build_engine_or_report() -> Option<(AssessmentCoordinator, ModelSummary)> {
    match build_engine() {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            None
        }
    }
}

fn read_source_from_input(input: &Option<PathBuf>) -> io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn parse_input<T: serde::de::DeserializeOwned>(args: &InputArgs) -> Result<T, String> {
    let source =
        read_source_from_input(&args.input).map_err(|e| format!("cannot read input: {e}"))?;
    serde_json::from_str(&source).map_err(|e| format!("invalid JSON input: {e}"))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> i32 {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(s) => {
            println!("{s}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_serve(args: &ServeArgs) -> i32 {
    let Some((coordinator, summary)) = build_engine_or_report() else {
        return 1;
    };
    let cors = match server::cors_layer(args.cors_origin.as_deref()) {
        Ok(cors) => cors,
        Err(e) => {
            eprintln!("error: invalid --cors-origin: {e}");
            return 2;
        }
    };

    let app = server::build_router(
        AppState::new(coordinator, summary, args.history_capacity),
        cors,
    );
    let addr = SocketAddr::new(args.host, args.port);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: cannot start runtime: {e}");
            return 1;
        }
    };
    match runtime.block_on(server::serve(addr, app)) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("server stopped: {e}");
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_status(args: &InputArgs, full_analysis: bool) -> i32 {
    let input: VitalsInput = match parse_input(args) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let Some((coordinator, _)) = build_engine_or_report() else {
        return 1;
    };
    if full_analysis {
        print_json(&coordinator.analyze(&input), args.pretty)
    } else {
        print_json(&coordinator.predict_status(&input), args.pretty)
    }
}

fn run_forecast(args: &InputArgs) -> i32 {
    let request: HrHistoryRequest = match parse_input(args) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    match vitals_core::forecast(&request.hr_history) {
        Ok(result) => print_json(&result, args.pretty),
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_simulate(args: &SimulateArgs) -> i32 {
    let coordinator = if args.analyze {
        match build_engine_or_report() {
            Some((coordinator, _)) => Some(coordinator),
            None => return 1,
        }
    } else {
        None
    };

    let simulator = DeviceSimulator::new(args.seed);
    for (i, sample) in simulator.take(args.count).enumerate() {
        if i > 0 && args.interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(args.interval_ms));
        }
        let ml = coordinator
            .as_ref()
            .map(|c| c.analyze(&VitalsInput::from(sample.reading)));
        let rc = print_json(&SimulatedReading { sample: &sample, ml }, false);
        if rc != 0 {
            return rc;
        }
    }
    0
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Serve(args) => run_serve(&args),
        Command::Status(args) => run_status(&args, false),
        Command::Analyze(args) => run_status(&args, true),
        Command::Forecast(args) => run_forecast(&args),
        Command::Simulate(args) => run_simulate(&args),
    }
}

fn main() {
    std::process::exit(run_cli());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_verbose_flag() {
        let cli = Cli::try_parse_from(["vitals", "-vvv", "forecast"]).unwrap();
        assert_eq!(cli.verbose, 3, "verbose count should be 3 for -vvv");
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["vitals", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 5001);
        assert_eq!(args.history_capacity, 60);
        assert!(args.cors_origin.is_none());
    }

    #[test]
    fn serve_rejects_bad_host() {
        assert!(Cli::try_parse_from(["vitals", "serve", "--host", "not-an-ip"]).is_err());
    }

    #[test]
    fn simulate_flags() {
        let cli =
            Cli::try_parse_from(["vitals", "simulate", "--count", "3", "--seed", "9", "--analyze"])
                .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.count, 3);
        assert_eq!(args.seed, Some(9));
        assert!(args.analyze);
    }

    #[test]
    fn forecast_reads_history_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hr_history": [70, 70, 70, 70, 70]}}"#).unwrap();
        let args = InputArgs {
            input: Some(file.path().to_path_buf()),
            pretty: false,
        };
        assert_eq!(run_forecast(&args), 0);
    }

    #[test]
    fn short_forecast_history_exits_nonzero() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hr_history": [70, 70]}}"#).unwrap();
        let args = InputArgs {
            input: Some(file.path().to_path_buf()),
            pretty: false,
        };
        assert_eq!(run_forecast(&args), 1);
    }

    #[test]
    fn malformed_reading_is_an_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let args = InputArgs {
            input: Some(file.path().to_path_buf()),
            pretty: true,
        };
        assert_eq!(run_status(&args, true), 2);
    }

    #[test]
    fn status_reads_a_reading_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"HR": 121, "SpO2": 93, "Temp": 37.0}}"#).unwrap();
        let args = InputArgs {
            input: Some(file.path().to_path_buf()),
            pretty: false,
        };
        assert_eq!(run_status(&args, false), 0);
        assert_eq!(run_status(&args, true), 0);
    }

    #[test]
    fn simulate_with_analysis_runs_to_completion() {
        let args = SimulateArgs {
            count: 3,
            seed: Some(1),
            interval_ms: 0,
            analyze: true,
        };
        assert_eq!(run_simulate(&args), 0);
    }

    #[test]
    fn simulated_reading_carries_the_analysis() {
        let (coordinator, _) = build_engine().unwrap();
        let sample = DeviceSimulator::new(Some(1)).tick();
        let ml = Some(coordinator.analyze(&VitalsInput::from(sample.reading)));
        let json = serde_json::to_value(SimulatedReading { sample: &sample, ml }).unwrap();
        assert_eq!(json["Status"], "Normal");
        assert_eq!(json["ml"]["risk_level"], "Low");
        assert!(json.get("HR").is_some());

        let bare = serde_json::to_value(SimulatedReading {
            sample: &sample,
            ml: None,
        })
        .unwrap();
        assert!(bare.get("ml").is_none());
    }

    #[test]
    fn engine_builds_from_the_builtin_dataset() {
        let (coordinator, summary) = build_engine().unwrap();
        assert_eq!(coordinator.classifier_name(), "logistic_regression");
        assert_eq!(summary.samples, 15);
    }
}
