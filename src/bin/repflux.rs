//! Rep Flux CLI - Command-line interface for the Rep Flux engine
//!
//! Commands:
//! - run: Count repetitions from landmark frames on stdin (streaming mode)
//! - replay: Count repetitions from a recorded frames file (batch mode)
//! - validate: Validate an exercise definition file
//! - exercises: List the built-in exercises
//! - doctor: Diagnose engine health and configuration
//! - schema: Describe the frame and result formats

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rep_flux::{
    EngineError, ExerciseDefinition, ExerciseEngine, FrameResult, LandmarkFrame, Session,
    BUILTIN_EXERCISES, FLUX_VERSION, PERFECT_FORM_THRESHOLD, PRODUCER_NAME,
};

/// Rep Flux - On-device exercise repetition counting
#[derive(Parser)]
#[command(name = "repflux")]
#[command(version = FLUX_VERSION)]
#[command(about = "Count exercise repetitions from pose landmarks", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count repetitions from NDJSON frames on stdin (streaming mode)
    Run {
        #[command(flatten)]
        exercise: ExerciseArgs,

        /// Flush output after each frame
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Count repetitions from a recorded frames file (batch mode)
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        exercise: ExerciseArgs,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Write the final session snapshot to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Validate an exercise definition file
    Validate {
        /// Definition file (YAML, or JSON with a .json extension)
        definition: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in exercises
    Exercises {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Also check this definition file
        #[arg(long)]
        definition: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

/// Which exercise to count
#[derive(Args)]
struct ExerciseArgs {
    /// Built-in exercise key (squat, pushup, bicep_curl)
    #[arg(short, long, default_value = "squat", conflicts_with = "definition")]
    exercise: String,

    /// Exercise definition file instead of a built-in
    #[arg(short, long)]
    definition: Option<PathBuf>,
}

impl ExerciseArgs {
    fn engine(&self) -> Result<ExerciseEngine, RepfluxCliError> {
        let engine = match &self.definition {
            Some(path) => ExerciseEngine::from_file(path)?,
            None => ExerciseEngine::builtin(&self.exercise)?,
        };
        info!("{}", engine.start_announcement());
        Ok(engine)
    }
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
    /// Newline-delimited JSON (one result per line)
    Ndjson,
    /// JSON array of results
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Landmark frame input
    Input,
    /// Per-frame result output
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

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

fn run(cli: Cli) -> Result<(), RepfluxCliError> {
    match cli.command {
        Commands::Run { exercise, flush } => cmd_run(&exercise, flush),

        Commands::Replay {
            input,
            output,
            exercise,
            input_format,
            output_format,
            summary,
        } => cmd_replay(
            &input,
            &output,
            &exercise,
            input_format,
            output_format,
            summary.as_deref(),
        ),

        Commands::Validate { definition, json } => cmd_validate(&definition, json),

        Commands::Exercises { json } => cmd_exercises(json),

        Commands::Doctor { definition, json } => cmd_doctor(definition.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_run(exercise: &ExerciseArgs, flush: bool) -> Result<(), RepfluxCliError> {
    let mut session = Session::new(exercise.engine()?);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let frame = parse_frame(trimmed, index + 1)?;
        let result = session.process(&frame);

        writeln!(stdout, "{}", serde_json::to_string(&result)?)?;
        if flush {
            stdout.flush()?;
        }
    }

    stdout.flush()?;

    let snapshot = session.snapshot();
    info!(
        "{}: {} reps over {} frames",
        snapshot.exercise, snapshot.rep_count, snapshot.frames_processed
    );

    Ok(())
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    exercise: &ExerciseArgs,
    input_format: InputFormat,
    output_format: OutputFormat,
    summary: Option<&Path>,
) -> Result<(), RepfluxCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let frames = match input_format {
        InputFormat::Ndjson => parse_ndjson_frames(&input_data)?,
        InputFormat::Json => serde_json::from_str::<Vec<LandmarkFrame>>(&input_data)?,
    };

    if frames.is_empty() {
        return Err(RepfluxCliError::NoFrames);
    }

    let mut session = Session::new(exercise.engine()?);
    let results: Vec<FrameResult> = frames.iter().map(|frame| session.process(frame)).collect();

    let output_data = format_output(&results, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    let snapshot = session.snapshot();
    info!(
        "{}: {} reps over {} frames",
        snapshot.exercise, snapshot.rep_count, snapshot.frames_processed
    );

    if let Some(summary_path) = summary {
        fs::write(summary_path, serde_json::to_string_pretty(&*snapshot)?)?;
    }

    Ok(())
}

fn cmd_validate(path: &Path, json: bool) -> Result<(), RepfluxCliError> {
    let definition = ExerciseDefinition::from_file(path)?;
    let report = DefinitionReport::new(path, &definition);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Definition Report");
        println!("=================");
        println!("File:       {}", report.file);
        println!("Exercise:   {}", report.name);
        println!("Kind:       {}", report.kind);
        println!(
            "Landmarks:  {} / {} / {}",
            report.landmarks[0], report.landmarks[1], report.landmarks[2]
        );
        let t = definition.thresholds();
        println!(
            "Thresholds: start {} / down {} / up {} / feedback {}",
            t.start, t.down, t.up, t.feedback
        );
        println!("Feedback rules: {}", report.feedback_rules);
    }

    Ok(())
}

fn cmd_exercises(json: bool) -> Result<(), RepfluxCliError> {
    let entries = BUILTIN_EXERCISES
        .iter()
        .map(|exercise| {
            let definition = exercise.load()?;
            Ok(ExerciseEntry {
                key: exercise.key.to_string(),
                name: exercise.display_name.to_string(),
                description: exercise.description.to_string(),
                kind: definition.kind().as_str().to_string(),
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            println!("{:<12} {:<12} {}", entry.key, entry.name, entry.description);
        }
    }

    Ok(())
}

fn cmd_doctor(definition: Option<&Path>, json: bool) -> Result<(), RepfluxCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Rep Flux version {}", FLUX_VERSION),
    });

    checks.push(DoctorCheck {
        name: "form_gate".to_string(),
        status: CheckStatus::Ok,
        message: format!("Reps count at form score {} or above", PERFECT_FORM_THRESHOLD),
    });

    for exercise in BUILTIN_EXERCISES {
        let check = match exercise.load() {
            Ok(def) => DoctorCheck {
                name: format!("builtin:{}", exercise.key),
                status: CheckStatus::Ok,
                message: format!("{} ({} feedback rules)", def.name(), def.feedback_rules().len()),
            },
            Err(e) => DoctorCheck {
                name: format!("builtin:{}", exercise.key),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        };
        checks.push(check);
    }

    if let Some(path) = definition {
        let check = if path.exists() {
            match ExerciseDefinition::from_file(path) {
                Ok(def) => DoctorCheck {
                    name: "definition".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} loads as {}", def.name(), def.kind().as_str()),
                },
                Err(e) => DoctorCheck {
                    name: "definition".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            }
        } else {
            DoctorCheck {
                name: "definition".to_string(),
                status: CheckStatus::Warning,
                message: "Definition file does not exist".to_string(),
            }
        };
        checks.push(check);
    }

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
        version: FLUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Rep Flux Doctor Report");
        println!("======================");
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
        Err(RepfluxCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), RepfluxCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: one landmark frame per record");
                println!();
                println!("- timestamp: optional RFC 3339 capture time");
                println!("- landmarks: array of {{ id, x, y }}");
                println!("  - id: pose joint id (MediaPipe numbering, e.g. 23 left hip, 25 left knee)");
                println!("  - x, y: image coordinates, pixel or normalized");
                println!();
                println!("Only the three joints named by the exercise definition are read.");
                println!("When an id repeats, the last occurrence wins.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: one result per input frame");
                println!();
                println!("- rep_count: repetitions that passed the form gate");
                println!("- phase: START, DOWN or UP");
                println!("- feedback: text for display");
                println!("- voice_message: text to speak (empty means silence)");
                println!("- form_score: 0-100, 0 when the frame was not tracked");
                println!("- status: tracked, no_pose, missing_landmarks or angle_error");
                println!("- angle: measured joint angle in degrees, when tracked");
                println!("- rep_event: {{ type: counted | rejected, form_score, announcement, ... }}");
                println!("  present only on the frame that completes a repetition");
            }
        }
    }

    Ok(())
}

// Helper functions

fn parse_frame(line: &str, line_number: usize) -> Result<LandmarkFrame, RepfluxCliError> {
    serde_json::from_str(line).map_err(|e| {
        RepfluxCliError::ParseError(format!("Failed to parse frame on line {}: {}", line_number, e))
    })
}

fn parse_ndjson_frames(data: &str) -> Result<Vec<LandmarkFrame>, RepfluxCliError> {
    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_frame(line.trim(), index + 1))
        .collect()
}

fn format_output<T: Serialize>(records: &[T], format: &OutputFormat) -> Result<String, RepfluxCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "repflux.landmark_frame",
        "description": "Pose landmarks for one video frame",
        "type": "object",
        "required": ["landmarks"],
        "properties": {
            "timestamp": { "type": "string", "format": "date-time" },
            "landmarks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "x", "y"],
                    "properties": {
                        "id": { "type": "integer", "minimum": 0 },
                        "x": { "type": "number" },
                        "y": { "type": "number" }
                    }
                }
            }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "repflux.frame_result",
        "description": "Engine output for one frame",
        "type": "object",
        "required": ["rep_count", "phase", "feedback", "voice_message", "form_score", "status"],
        "properties": {
            "rep_count": { "type": "integer", "minimum": 0 },
            "phase": { "type": "string", "enum": ["START", "DOWN", "UP"] },
            "feedback": { "type": "string" },
            "voice_message": { "type": "string" },
            "form_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "status": {
                "type": "string",
                "enum": ["tracked", "no_pose", "missing_landmarks", "angle_error"]
            },
            "angle": { "type": "number" },
            "rep_event": {
                "type": "object",
                "required": ["type", "form_score", "announcement"],
                "properties": {
                    "type": { "type": "string", "enum": ["counted", "rejected"] },
                    "rep_count": { "type": "integer" },
                    "form_score": { "type": "integer" },
                    "announcement": { "type": "string" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum RepfluxCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    NoFrames,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for RepfluxCliError {
    fn from(e: io::Error) -> Self {
        RepfluxCliError::Io(e)
    }
}

impl From<EngineError> for RepfluxCliError {
    fn from(e: EngineError) -> Self {
        RepfluxCliError::Engine(e)
    }
}

impl From<serde_json::Error> for RepfluxCliError {
    fn from(e: serde_json::Error) -> Self {
        RepfluxCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RepfluxCliError> for CliError {
    fn from(e: RepfluxCliError) -> Self {
        match e {
            RepfluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RepfluxCliError::Engine(EngineError::UnknownExercise(key)) => CliError {
                code: "UNKNOWN_EXERCISE".to_string(),
                message: format!("Unknown exercise: {}", key),
                hint: Some("Run 'repflux exercises' to list built-in exercises".to_string()),
            },
            RepfluxCliError::Engine(e) => CliError {
                code: "DEFINITION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'repflux validate <file>' for details".to_string()),
            },
            RepfluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RepfluxCliError::NoFrames => CliError {
                code: "NO_FRAMES".to_string(),
                message: "No frames found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            RepfluxCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            RepfluxCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Run 'repflux schema input' for the frame format".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DefinitionReport {
    file: String,
    name: String,
    kind: String,
    landmarks: [u32; 3],
    feedback_rules: usize,
}

impl DefinitionReport {
    fn new(path: &Path, definition: &ExerciseDefinition) -> Self {
        let joints = definition.landmarks();
        Self {
            file: path.display().to_string(),
            name: definition.name().to_string(),
            kind: definition.kind().as_str().to_string(),
            landmarks: [joints.proximal, joints.vertex, joints.distal],
            feedback_rules: definition.feedback_rules().len(),
        }
    }
}

#[derive(Serialize)]
struct ExerciseEntry {
    key: String,
    name: String,
    description: String,
    kind: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

