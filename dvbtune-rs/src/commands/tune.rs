use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use dvbtune::protocol::TuningParams;
use dvbtune::tuner::{DeviceConfig, ReadOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{info, warn};

use crate::commands::{interrupt_flag, open_tuned};
use crate::context::ChannelArgs;

/// 1024 TS packets per read.
const BUFFER_SIZE: usize = 188 * 1024;

fn open_output(output: &str) -> io::Result<Box<dyn Write>> {
    if output == "-" {
        Ok(Box::new(BufWriter::new(io::stdout().lock())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(output)?)))
    }
}

/// `None` for a missing, zero or negative duration, and for one too long
/// to represent.
fn deadline(start: Instant, seconds: Option<f64>) -> Option<Instant> {
    let seconds = seconds.filter(|s| *s > 0.0)?;
    let duration = Duration::try_from_secs_f64(seconds).ok()?;
    start.checked_add(duration)
}

fn spinner() -> ProgressBar {
    let progress = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    let template = "{spinner} {elapsed_precise} {bytes} ({bytes_per_sec}) {msg}";
    if let Ok(style) = ProgressStyle::with_template(template) {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(200));
    progress
}

pub(crate) fn tune(
    config: &DeviceConfig,
    channel: &ChannelArgs,
    file_channel: Option<&TuningParams>,
    pids: &[u16],
    time: Option<f64>,
    output: &str,
) -> Result<(), Box<dyn Error>> {
    let mut device = open_tuned(config, channel, file_channel)?;
    info!("Capture mode: {}", device.capture_mode());
    for &pid in pids {
        device.add_pid(pid)?;
    }

    let mut out = open_output(output)?;
    let stop = interrupt_flag()?;
    let start = Instant::now();
    let deadline = deadline(start, time);
    let progress = spinner();
    let mut buf = vec![0u8; BUFFER_SIZE];

    let result: Result<(), Box<dyn Error>> = loop {
        if stop.load(Ordering::SeqCst) {
            info!("Interrupted");
            break Ok(());
        }
        if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            info!("Recording time elapsed");
            break Ok(());
        }

        match device.read(&mut buf) {
            Ok(ReadOutcome::Data(n)) => {
                if let Err(e) = out.write_all(&buf[..n]) {
                    break Err(e.into());
                }
                progress.inc(n as u64);
            }
            Ok(ReadOutcome::NoDataYet) => {}
            Ok(ReadOutcome::EndOfStream) => {
                info!("End of stream");
                break Ok(());
            }
            Err(e) if e.is_transient() => {
                progress.set_message("overrun");
                warn!("{}", e);
            }
            Err(e) => break Err(e.into()),
        }
    };

    progress.finish();
    out.flush()?;
    info!(
        "{} bytes recorded in {:.1}s",
        progress.position(),
        start.elapsed().as_secs_f64()
    );

    for &pid in pids {
        device.remove_pid(pid);
    }
    device.close();
    result
}
