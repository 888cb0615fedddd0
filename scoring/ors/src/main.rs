use std::fmt::{self, Write as _};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use ors_engine::{ConfigError, RiskEngine, ScoringConfig};
use ors_types::{RiskAssessment, VitalSign};
use serde_json::Value as JsonValue;

const RULE_WIDTH: usize = 52;

#[derive(Debug, Parser)]
#[command(
    name = "ors",
    version,
    about = "Opioid respiratory risk assessment from a patient profile and bedside vitals",
    long_about = "ors scores the risk of opioid-induced respiratory depression.\n\n\
        A patient record is one JSON object holding the clinical profile (age, gender,\n\
        sleep_apnea, opioid_dosage, sedative_use and optionally bmi, copd, asa_status)\n\
        and the current vitals (recent_breathing_rate, current_breathing_rate,\n\
        heart_rate, breath_amplitude, spo2, etco2).\n\n\
        EXAMPLES:\n\
        \n  ors assess patient.json                    Print a risk report\n\
        \n  ors assess --json patient.json             Print the assessment as JSON\n\
        \n  ors assess --config site.json patient.json Use a local calibration\n\
        \n  cat patient.json | ors assess              Read the record from stdin\n\
        \n  ors config > calibration.json              Dump the shipped calibration\n\
        \n  ors config --check calibration.json        Validate a calibration file"
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
    /// Score one patient record
    #[command(
        about = "Score one patient record",
        long_about = "Validates a patient record and prints its PRODIGY score, per-vital\n\
            deviation sub-scores, overall risk score and risk band.\n\n\
            Reads from the specified file or stdin if no file is given.\n\
            Exit status: 0 scored, 1 invalid record, 2 unreadable input or configuration."
    )]
    Assess(AssessArgs),

    /// Print or validate a scoring calibration
    #[command(about = "Print the default calibration or validate a calibration file")]
    Config(ConfigArgs),
}

#[derive(Debug, Args, Clone)]
struct AssessArgs {
    /// Patient record as JSON (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// JSON calibration overriding the shipped coefficients
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the assessment (or the validation errors) as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args, Clone)]
struct ConfigArgs {
    /// Validate this calibration file instead of printing the defaults
    #[arg(long, value_name = "FILE")]
    check: Option<PathBuf>,
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

fn read_input(input: &Option<PathBuf>) -> Result<String, String> {
    if let Some(path) = input {
        fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read from stdin: {e}"))?;
        Ok(buf)
    }
}

fn load_engine(config: &Option<PathBuf>) -> Result<RiskEngine, String> {
    let config = match config {
        Some(path) => {
            log::info!("loading calibration from {}", path.display());
            ScoringConfig::load(path).map_err(|e| e.to_string())?
        }
        None => ScoringConfig::default(),
    };
    RiskEngine::new(config).map_err(|e| e.to_string())
}

fn run_assess(args: &AssessArgs, out: &mut impl Write) -> i32 {
    let engine = match load_engine(&args.config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let text = match read_input(&args.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let record: JsonValue = match serde_json::from_str(&text) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("error: patient record is not valid JSON: {e}");
            return 2;
        }
    };

    let (rendered, rc) = match engine.assess_record(&record) {
        Ok(assessment) if args.json => (serde_json::to_string_pretty(&assessment), 0),
        Ok(assessment) => (Ok(render_report(&assessment)), 0),
        Err(report) if args.json => (serde_json::to_string_pretty(&report), 1),
        Err(report) => {
            eprintln!("error: {report}");
            return 1;
        }
    };
    match rendered {
        Ok(rendered) => write_out(out, &rendered, rc),
        Err(e) => {
            eprintln!("error: {e}");
            2
        }
    }
}

fn run_config(args: &ConfigArgs, out: &mut impl Write) -> i32 {
    match &args.check {
        Some(path) => match ScoringConfig::load(path) {
            Ok(_) => write_out(out, &format!("{}: ok", path.display()), 0),
            Err(e @ ConfigError::Io { .. }) => {
                eprintln!("error: {e}");
                2
            }
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
        None => match ScoringConfig::default().to_json_pretty() {
            Ok(json) => write_out(out, &json, 0),
            Err(e) => {
                eprintln!("error: {e}");
                2
            }
        },
    }
}

fn write_out(out: &mut impl Write, text: &str, rc: i32) -> i32 {
    match writeln!(out, "{text}") {
        Ok(()) => rc,
        Err(e) => {
            eprintln!("error: cannot write output: {e}");
            2
        }
    }
}

fn render_report(a: &RiskAssessment) -> String {
    let mut s = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut s, a);
    s
}

fn write_report(s: &mut String, a: &RiskAssessment) -> fmt::Result {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    writeln!(s, "{heavy}")?;
    writeln!(s, " Opioid Respiratory Risk Assessment")?;
    writeln!(s, "{heavy}")?;
    writeln!(s, " {:<28}{:>8.1} / 100", "PRODIGY score", a.prodigy_score)?;
    writeln!(s, " Deviation sub-scores")?;
    for vital in VitalSign::ALL {
        writeln!(s, "   {:<26}{:>8.3}", label(vital), a.subscore(vital))?;
    }
    writeln!(s, "{light}")?;
    writeln!(s, " {:<28}{:>8.3}", "Overall risk score (ORS)", a.ors)?;
    writeln!(
        s,
        " {:<28}{} ({})",
        "Risk level",
        a.risk_level.as_str().to_uppercase(),
        a.risk_level.guidance()
    )?;
    write!(s, "{heavy}")
}

fn label(vital: VitalSign) -> &'static str {
    match vital {
        VitalSign::BreathingRate => "Breathing rate",
        VitalSign::HeartRate => "Heart rate",
        VitalSign::BreathAmplitude => "Breath amplitude",
        VitalSign::Spo2 => "SpO2",
        VitalSign::Etco2 => "EtCO2",
    }
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut stdout = io::stdout().lock();
    let rc = match &cli.command {
        Command::Assess(args) => run_assess(args, &mut stdout),
        Command::Config(args) => run_config(args, &mut stdout),
    };
    log::debug!("exiting with status {rc}");
    rc
}

fn main() {
    std::process::exit(run_cli());
}
