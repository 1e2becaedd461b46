//! Subcommand handlers.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dvbtune::protocol::TuningParams;
use dvbtune::tuner::{CaptureMode, Device, DeviceConfig};
use log::info;

use crate::config::ConfigFile;
use crate::context::{ChannelArgs, DeviceArgs};

mod checksignal;
mod info;
mod tune;

pub(crate) use self::checksignal::checksignal;
pub(crate) use self::info::info;
pub(crate) use self::tune::tune;

/// Command line first, then the `[device]` section, then defaults.
pub(crate) fn device_config(
    args: &DeviceArgs,
    capture: Option<CaptureMode>,
    file: &ConfigFile,
) -> DeviceConfig {
    DeviceConfig {
        adapter: args.adapter.or(file.device.adapter).unwrap_or(0),
        device: args.device.or(file.device.device).unwrap_or(0),
        mode: capture.unwrap_or_else(|| file.device.capture_mode()),
        buffer_size: file.device.buffer_size(),
    }
}

/// Opens the frontend and, when a channel is known, tunes to it.
pub(crate) fn open_tuned(
    config: &DeviceConfig,
    channel: &ChannelArgs,
    file_channel: Option<&TuningParams>,
) -> Result<Device, Box<dyn Error>> {
    let mut device = Device::open(config, true)?;

    let params = match channel.tuning_params(device.guess_delivery_system())? {
        Some(params) => Some(params),
        None => file_channel.cloned(),
    };
    if let Some(params) = params {
        info!(
            "Tuning {} on adapter {} device {}",
            params.delivery_system(),
            config.adapter,
            config.device
        );
        device.set_tuning(&params)?;
        if let Some(inversion) = channel.inversion {
            device.set_inversion(inversion)?;
        }
        device.tune()?;
    }
    Ok(device)
}

/// Flag raised by Ctrl-C (or SIGTERM).
pub(crate) fn interrupt_flag() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })?;
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_overrides_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            [device]
            adapter = 2
            device = 1
            budget = true
            buffer_size = 4096
            "#,
        )
        .unwrap();

        let args = DeviceArgs {
            adapter: Some(0),
            device: None,
        };
        let config = device_config(&args, None, &file);
        assert_eq!(config.adapter, 0);
        assert_eq!(config.device, 1);
        assert_eq!(config.mode, CaptureMode::Budget);
        assert_eq!(config.buffer_size, 4096);

        let config = device_config(&args, Some(CaptureMode::Emulated), &file);
        assert_eq!(config.mode, CaptureMode::Emulated);
    }

    #[test]
    fn test_defaults() {
        let config = device_config(&DeviceArgs::default(), None, &ConfigFile::default());
        assert_eq!(config, DeviceConfig::default());
    }
}
