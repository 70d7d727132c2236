//! Kinesic CLI - Command-line interface for the Kinesic inference engine
//!
//! Commands:
//! - transform: Annotate a batch of frames (batch mode)
//! - run: Annotate streaming frames from stdin (streaming mode)
//! - validate: Validate frame observations against the input schema
//! - doctor: Diagnose engine health and configuration
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use kinesic::pipeline::FrameAnalyzer;
use kinesic::schema::{FrameAdapter, FrameObservation, ANNOTATION_SCHEMA_VERSION, FRAME_SCHEMA_VERSION};
use kinesic::tracker::TrackerConfig;
use kinesic::{KINESIC_VERSION, PRODUCER_NAME};

/// Kinesic - On-device inference engine for human action, intent, and gesture signals
#[derive(Parser)]
#[command(name = "kinesic")]
#[command(author = "Kinesic Labs")]
#[command(version = KINESIC_VERSION)]
#[command(about = "Annotate person detections with action, intent, and gesture labels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a batch of frames (batch mode)
    Transform {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Maximum centroid distance (pixels) for track association
        #[arg(long, default_value = "120")]
        association_distance: f64,

        /// Frames a track may go unseen before eviction
        #[arg(long, default_value = "30")]
        track_timeout: u32,

        /// Load tracker state from file
        #[arg(long)]
        load_state: Option<PathBuf>,

        /// Save tracker state to file after processing
        #[arg(long)]
        save_state: Option<PathBuf>,
    },

    /// Annotate streaming frames from stdin (streaming mode)
    Run {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Maximum centroid distance (pixels) for track association
        #[arg(long, default_value = "120")]
        association_distance: f64,

        /// Frames a track may go unseen before eviction
        #[arg(long, default_value = "30")]
        track_timeout: u32,

        /// Load tracker state from file
        #[arg(long)]
        load_state: Option<PathBuf>,

        /// Save tracker state to file on exit
        #[arg(long)]
        save_state: Option<PathBuf>,

        /// Flush output after each frame
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate frame observations against the input schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Check tracker state file
        #[arg(long)]
        state: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one frame per line)
    Ndjson,
    /// JSON array of frames
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one annotation payload per line)
    Ndjson,
    /// JSON array of annotation payloads
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (kinesic.frame.v1)
    Input,
    /// Output schema (kinesic.annotation.v1)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), KinesicCliError> {
    match cli.command {
        Commands::Transform {
            input,
            output,
            input_format,
            output_format,
            association_distance,
            track_timeout,
            load_state,
            save_state,
        } => cmd_transform(
            &input,
            &output,
            input_format,
            output_format,
            tracker_config(association_distance, track_timeout),
            load_state.as_deref(),
            save_state.as_deref(),
        ),

        Commands::Run {
            output_format,
            association_distance,
            track_timeout,
            load_state,
            save_state,
            flush,
        } => cmd_run(
            output_format,
            tracker_config(association_distance, track_timeout),
            load_state.as_deref(),
            save_state.as_deref(),
            flush,
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { state, json } => cmd_doctor(state.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn tracker_config(association_distance: f64, track_timeout: u32) -> TrackerConfig {
    TrackerConfig {
        max_association_distance: association_distance,
        max_missed_frames: track_timeout,
    }
}

fn cmd_transform(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: TrackerConfig,
    load_state: Option<&std::path::Path>,
    save_state: Option<&std::path::Path>,
) -> Result<(), KinesicCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Parse frames
    let frames = match input_format {
        InputFormat::Ndjson => FrameAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => FrameAdapter::parse_array(&input_data)?,
    };

    if frames.is_empty() {
        return Err(KinesicCliError::NoFrames);
    }

    let mut analyzer = FrameAnalyzer::with_config(config);

    // Load existing tracker state if provided
    if let Some(state_path) = load_state {
        let state_json = fs::read_to_string(state_path)?;
        analyzer.load_state(&state_json)?;
    }

    let payloads = analyzer.analyze_batch(&frames)?;

    // Save tracker state if requested
    if let Some(state_path) = save_state {
        let state_json = analyzer.save_state()?;
        fs::write(state_path, state_json)?;
    }

    // Write output
    let output_data = format_output(&payloads, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_run(
    output_format: OutputFormat,
    config: TrackerConfig,
    load_state: Option<&std::path::Path>,
    save_state: Option<&std::path::Path>,
    flush: bool,
) -> Result<(), KinesicCliError> {
    let mut analyzer = FrameAnalyzer::with_config(config);

    // Load existing tracker state if provided
    if let Some(state_path) = load_state {
        let state_json = fs::read_to_string(state_path)?;
        analyzer.load_state(&state_json)?;
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let frame: FrameObservation = serde_json::from_str(trimmed)
            .map_err(|e| KinesicCliError::ParseError(format!("Failed to parse frame: {}", e)))?;

        frame.validate()?;

        let payload = analyzer.analyze_to_json(&frame)?;
        let rendered = match output_format {
            OutputFormat::Ndjson | OutputFormat::Json => payload,
            OutputFormat::JsonPretty => {
                let value: serde_json::Value = serde_json::from_str(&payload)?;
                serde_json::to_string_pretty(&value)?
            }
        };

        writeln!(stdout, "{}", rendered)?;
        if flush {
            stdout.flush()?;
        }
    }

    // Save tracker state if requested
    if let Some(state_path) = save_state {
        let state_json = analyzer.save_state()?;
        fs::write(state_path, state_json)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &PathBuf,
    input_format: InputFormat,
    json: bool,
) -> Result<(), KinesicCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Parse frames
    let frames = match input_format {
        InputFormat::Ndjson => FrameAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => FrameAdapter::parse_array(&input_data)?,
    };

    let failures = FrameAdapter::validate_frames(&frames);

    let report = ValidationReport {
        total_frames: frames.len(),
        valid_frames: frames.len() - failures.len(),
        invalid_frames: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                frame_index: f.frame_index,
                error: f.error.clone(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total frames:   {}", report.total_frames);
        println!("Valid frames:   {}", report.valid_frames);
        println!("Invalid frames: {}", report.invalid_frames);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Frame {} (index {}): {}",
                    err.frame_index, err.index, err.error
                );
            }
        }
    }

    if report.invalid_frames > 0 {
        Err(KinesicCliError::ValidationFailed(report.invalid_frames))
    } else {
        Ok(())
    }
}

fn cmd_doctor(state: Option<&std::path::Path>, json: bool) -> Result<(), KinesicCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check Kinesic version
    checks.push(DoctorCheck {
        name: "kinesic_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Kinesic version {}", KINESIC_VERSION),
    });

    // Check schema versions
    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "Input schema: {}, output schema: {}",
            FRAME_SCHEMA_VERSION, ANNOTATION_SCHEMA_VERSION
        ),
    });

    // Check tracker state file if provided
    if let Some(state_path) = state {
        if state_path.exists() {
            match fs::read_to_string(state_path) {
                Ok(content) => {
                    let mut probe = FrameAnalyzer::new();
                    match probe.load_state(&content) {
                        Ok(()) => {
                            checks.push(DoctorCheck {
                                name: "tracker_state".to_string(),
                                status: CheckStatus::Ok,
                                message: format!(
                                    "Tracker state valid ({} live tracks)",
                                    probe.track_count()
                                ),
                            });
                        }
                        Err(e) => {
                            checks.push(DoctorCheck {
                                name: "tracker_state".to_string(),
                                status: CheckStatus::Error,
                                message: format!("Invalid tracker state: {}", e),
                            });
                        }
                    }
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "tracker_state".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read tracker state file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "tracker_state".to_string(),
                status: CheckStatus::Warning,
                message: "Tracker state file does not exist".to_string(),
            });
        }
    }

    // Check stdin is available (for streaming mode)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: KINESIC_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Kinesic Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(KinesicCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), KinesicCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schema: {}", FRAME_SCHEMA_VERSION);
            println!();
            println!("One frame observation per record:");
            println!();
            println!("- frame_index: monotonic frame counter");
            println!("- observed_at: optional RFC 3339 capture timestamp");
            println!("- source_id: optional capture source identifier");
            println!("- detections: array of detected people, each with:");
            println!("  - bbox: {{ x1, y1, x2, y2 }} pixel box, x1 < x2, y1 < y2");
            println!("  - body: exactly 33 normalized {{ x, y }} landmarks");
            println!("    (0 nose, 11/12 shoulders, 15/16 wrists)");
            println!("  - hand: optional, exactly 21 normalized {{ x, y }} landmarks");
        }
        SchemaType::Output => {
            println!("Output Schema: {}", ANNOTATION_SCHEMA_VERSION);
            println!();
            println!("One annotation payload per frame:");
            println!();
            println!("- schema_version: {}", ANNOTATION_SCHEMA_VERSION);
            println!("- producer: {{ name, version, instance_id }}");
            println!("- provenance: {{ source_id, observed_at_utc, computed_at_utc }}");
            println!("- quality: {{ people, mean_confidence, hands_detected }}");
            println!("- frame_index");
            println!("- people: array of per-person annotations:");
            println!("  - track_id: stable identity across frames");
            println!("  - action: {{ label, confidence }} (hysteresis-stabilized)");
            println!("  - intent: {{ label, confidence }}");
            println!("  - gesture: {{ label, confidence }}, absent without a hand");
            println!("  - primary: action | gesture (display selection)");
        }
    }

    Ok(())
}

// Helper functions

fn format_output(payloads: &[String], format: &OutputFormat) -> Result<String, KinesicCliError> {
    match format {
        OutputFormat::Ndjson => Ok(payloads.join("\n") + "\n"),
        OutputFormat::Json => Ok(format!("[{}]", payloads.join(","))),
        OutputFormat::JsonPretty => {
            let values: Vec<serde_json::Value> = payloads
                .iter()
                .map(|p| serde_json::from_str(p))
                .collect::<Result<_, _>>()?;
            Ok(serde_json::to_string_pretty(&values)?)
        }
    }
}

// Error types

#[derive(Debug)]
enum KinesicCliError {
    Io(io::Error),
    Engine(kinesic::InferenceError),
    Json(serde_json::Error),
    Validation(kinesic::schema::ValidationError),
    NoFrames,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for KinesicCliError {
    fn from(e: io::Error) -> Self {
        KinesicCliError::Io(e)
    }
}

impl From<kinesic::InferenceError> for KinesicCliError {
    fn from(e: kinesic::InferenceError) -> Self {
        KinesicCliError::Engine(e)
    }
}

impl From<serde_json::Error> for KinesicCliError {
    fn from(e: serde_json::Error) -> Self {
        KinesicCliError::Json(e)
    }
}

impl From<kinesic::schema::ValidationError> for KinesicCliError {
    fn from(e: kinesic::schema::ValidationError) -> Self {
        KinesicCliError::Validation(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<KinesicCliError> for CliError {
    fn from(e: KinesicCliError) -> Self {
        match e {
            KinesicCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            KinesicCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input matches the kinesic.frame.v1 schema".to_string()),
            },
            KinesicCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            KinesicCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'kinesic validate' for details".to_string()),
            },
            KinesicCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            KinesicCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} frames failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            KinesicCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            KinesicCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_frames: usize,
    valid_frames: usize,
    invalid_frames: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    frame_index: u64,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
