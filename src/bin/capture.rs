//! AirChar capture utility
//!
//! Forwards operator commands to the device and stores downloaded sessions
//! as labelled sample files.
//!
//! Usage:
//!   airchar-capture --port /dev/ttyACM0 --dir samples/raw

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use airchar::capture::{self, CaptureSession, CharacterLabel, Step};
use airchar::config::CaptureConfig;
use airchar::naming::SampleName;
use airchar::{logging, DatasetError};

#[derive(Parser, Debug)]
#[command(name = "airchar-capture", about = "Record downloaded IMU sessions to dataset files")]
struct Args {
    /// YAML configuration file (port, baud_rate, directory, response_timeout_ms, imu)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Serial port of the device (overrides the config file)
    #[arg(short, long)]
    port: Option<String>,
    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,
    /// Output directory (overrides the config file)
    #[arg(short, long)]
    dir: Option<PathBuf>,
    /// Character drawn in the air (single character, IDLE, enter or backspace)
    #[arg(long)]
    character: Option<String>,
    /// Subject ID (up to 2 digits)
    #[arg(long)]
    subject: Option<String>,
    /// Version number (up to 2 digits)
    #[arg(long)]
    version_number: Option<String>,
    /// First sample number
    #[arg(long)]
    sample: Option<String>,
}

fn main() {
    logging::init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => CaptureConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => CaptureConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(baud) = args.baud {
        config.baud_rate = baud;
    }
    if let Some(dir) = args.dir {
        config.directory = dir;
    }

    let port = serialport::new(&config.port, config.baud_rate)
        .timeout(config.response_timeout())
        .open()
        .with_context(|| format!("Failed to open serial port at {}", config.port))?;
    println!(
        "Connected to port {} with baud rate {}",
        config.port, config.baud_rate
    );

    let label = prompt_until(
        args.character,
        "Enter the Character designed in-the-Air: ",
        CharacterLabel::parse,
    )?;
    let subject = prompt_until(args.subject, "Enter the subject ID: ", |s| {
        capture::parse_two_digit(s, "subject ID")
    })?;
    let version = prompt_until(args.version_number, "Enter the version number: ", |s| {
        capture::parse_two_digit(s, "version number")
    })?;
    let sample = prompt_until(
        args.sample,
        "Enter the sample number: ",
        capture::parse_sample_number,
    )?;

    let name = SampleName::raw(label.text.clone(), subject, version, sample);
    let mut session = CaptureSession::new(port, label, name, &config.directory, &config.imu)?;
    println!("The file will be saved as: {}", session.current_file().display());

    let stdin = io::stdin();
    loop {
        print!("Enter a command to send via serial port (\"S\" Start/stop, \"D\" - Download, or \"X\" to Exit): ");
        io::stdout().flush()?;

        let mut command = String::new();
        if stdin.lock().read_line(&mut command)? == 0 {
            info!("stdin closed, exiting");
            break;
        }
        let command = command.trim_end_matches(['\r', '\n']);

        let was_download = command.trim().eq_ignore_ascii_case("D");
        if was_download {
            println!("Starting to record data to the file.");
        }

        match session.execute(command)? {
            Step::Exit => {
                println!("Exiting the program.");
                break;
            }
            Step::Continue { responses } => {
                for line in &responses {
                    println!("Received: {line}");
                }
                if was_download {
                    println!("The next file will be saved at: {}", session.current_file().display());
                }
            }
        }
    }

    Ok(())
}

/// Use `preset` if it validates, otherwise ask until the input does.
fn prompt_until<T>(
    preset: Option<String>,
    prompt: &str,
    validate: impl Fn(&str) -> Result<T, DatasetError>,
) -> Result<T> {
    if let Some(value) = preset {
        return validate(&value).map_err(Into::into);
    }

    let stdin = io::stdin();
    loop {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            anyhow::bail!("stdin closed before input was complete");
        }
        match validate(&input) {
            Ok(value) => return Ok(value),
            Err(e) => println!("{e}"),
        }
    }
}
