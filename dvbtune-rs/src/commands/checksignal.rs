use std::error::Error;
use std::io::{self, Write};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use dvbtune::protocol::{FrontendStatus, TuningParams};
use dvbtune::tuner::DeviceConfig;
use log::warn;

use crate::commands::{interrupt_flag, open_tuned};
use crate::context::ChannelArgs;

const INTERVAL: Duration = Duration::from_secs(1);

fn percent(value: f64) -> String {
    format!("{:5.1}%", value * 100.0)
}

fn status_text(status: Option<FrontendStatus>) -> String {
    match status {
        Some(status) if status.has_lock() => status.to_string().green().to_string(),
        Some(status) => status.to_string().red().to_string(),
        None => "unknown".yellow().to_string(),
    }
}

pub(crate) fn checksignal(
    config: &DeviceConfig,
    channel: &ChannelArgs,
    file_channel: Option<&TuningParams>,
) -> Result<(), Box<dyn Error>> {
    let device = open_tuned(config, channel, file_channel)?;
    let stop = interrupt_flag()?;

    let mut stdout = io::stdout();
    while !stop.load(Ordering::SeqCst) {
        let status = match device.status() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };
        write!(
            stdout,
            "\rStrength {}  S/N {}  {}\x1b[K",
            percent(device.signal_strength()),
            percent(device.snr()),
            status_text(status)
        )?;
        stdout.flush()?;
        thread::sleep(INTERVAL);
    }
    writeln!(stdout)?;

    device.close();
    Ok(())
}
