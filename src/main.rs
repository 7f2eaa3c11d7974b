use std::io::{self, BufRead, Write};
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use airchar::config::{BAUD_RATE, LINK_POLL_TIMEOUT, SAMPLE_RATE_HZ};
use airchar::sensor::SYNTHETIC_ODR_HZ;
use airchar::{
    logging, ChannelLines, Device, DeviceError, LineSource, SamplingClock, SerialLines, StdDelay,
    SyntheticImu,
};

#[derive(Parser, Debug)]
#[command(
    name = "airchar-device",
    about = "Run the IMU acquisition loop and serve the S/D/X command protocol"
)]
struct Args {
    /// Serial port to serve the protocol on (stdin/stdout when omitted)
    #[arg(short, long)]
    port: Option<String>,
    /// Serial baud rate
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud: u32,
    /// Output data rate of the synthetic sensor in Hz
    #[arg(long, default_value_t = SYNTHETIC_ODR_HZ)]
    odr: u32,
    /// Log level (overrides AIRCHAR_LOG / RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let args = Args::parse();
    logging::init_logging_with(args.log_level.as_deref());

    if let Err(e) = run(args) {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    match &args.port {
        Some(path) => {
            let port = serialport::new(path, args.baud)
                .timeout(LINK_POLL_TIMEOUT)
                .open()
                .with_context(|| format!("Failed to open serial port at {}", path))?;
            let writer = port
                .try_clone()
                .context("Failed to clone serial port handle")?;
            info!("serving protocol on {} at {} baud", path, args.baud);
            serve(SerialLines::new(port), writer, args.odr, &running)
        }
        None => {
            info!("serving protocol on stdin/stdout");
            serve(stdin_lines(), io::stdout(), args.odr, &running)
        }
    }
}

fn serve<L: LineSource, W: Write>(lines: L, out: W, odr: u32, running: &AtomicBool) -> Result<()> {
    let mut device: Device<L, W, SyntheticImu, StdDelay> = match Device::boot(
        lines,
        out,
        SyntheticImu::new(odr),
        StdDelay,
        SamplingClock::new(SAMPLE_RATE_HZ),
    ) {
        Ok(device) => device,
        Err(e @ DeviceError::SensorInit(_)) => {
            // unrecoverable hardware fault: halt
            error!("{e}");
            exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    match device.run(running) {
        Err(DeviceError::LinkClosed) => {
            info!("command link closed");
            Ok(())
        }
        other => other.map_err(Into::into),
    }
}

/// Forward stdin lines over a channel so the loop never blocks on input.
fn stdin_lines() -> ChannelLines {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    ChannelLines::new(rx)
}
