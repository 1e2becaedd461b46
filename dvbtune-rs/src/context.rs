use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_num::maybe_hex;
use dvbtune::protocol::{
    AtscParams, DeliverySystem, DvbcParams, Dvbs2Params, DvbsParams, DvbtParams, ProtocolError,
    TuningParams,
};
use dvbtune::tuner::CaptureMode;

#[derive(Debug, Parser)]
#[clap(name = "dvbtune")]
#[clap(about = "dvbtune tunes Linux DVB v5 adapters and taps their transport stream. ", long_about = None)]
#[clap(version)]
pub(crate) struct Cli {
    /// Configuration file path.{n}
    /// If not specified, `dvbtune.toml` in the working directory is used
    /// when it exists.
    #[clap(short = 'f', long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Directory where log files are stored.{n}
    /// Without it (and without `[logging] log_dir`), logs only go to stderr.
    #[clap(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Which adapter to use.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct DeviceArgs {
    /// The adapter number, as in `/dev/dvb/adapter<N>`.
    #[clap(short, long)]
    pub adapter: Option<u8>,

    /// The device number inside the adapter, as in `frontend<M>`.
    #[clap(short, long)]
    pub device: Option<u8>,
}

/// Channel to tune to. Without `--frequency`, the `[channel]` table of the
/// configuration file is used, if any.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ChannelArgs {
    /// Delivery system (dvbc, dvbs, dvbs2, dvbt, atsc).{n}
    /// If not specified, it is guessed from the frontend type.
    #[clap(long, value_name = "SYSTEM")]
    pub delivery: Option<DeliverySystem>,

    /// Frequency in Hz.
    #[clap(long, value_name = "Hz")]
    pub frequency: Option<u64>,

    /// Symbol rate in symbols per second (DVB-C, DVB-S, DVB-S2).
    #[clap(long, value_name = "Bd")]
    pub symbol_rate: Option<u32>,

    /// Modulation, e.g. QPSK, 8PSK, 64QAM, 256QAM, 8VSB.
    #[clap(long)]
    pub modulation: Option<String>,

    /// Inner FEC (or DVB-T high priority code rate), e.g. 3/4.
    #[clap(long)]
    pub fec: Option<String>,

    /// DVB-T low priority code rate.
    #[clap(long)]
    pub fec_lp: Option<String>,

    /// DVB-T bandwidth in MHz.
    #[clap(long, value_name = "MHz")]
    pub bandwidth: Option<u32>,

    /// DVB-T transmission mode: 2, 4 or 8 (k), -1 for auto.
    #[clap(long, allow_negative_numbers = true)]
    pub transmission_mode: Option<i32>,

    /// DVB-T guard interval, e.g. 1/32.
    #[clap(long)]
    pub guard: Option<String>,

    /// DVB-T hierarchy: 0 (none), 1, 2 or 4, -1 for auto.
    #[clap(long, allow_negative_numbers = true)]
    pub hierarchy: Option<i32>,

    /// DVB-S2 pilot: 0 (off), 1 (on), -1 for auto.
    #[clap(long, allow_negative_numbers = true)]
    pub pilot: Option<i32>,

    /// DVB-S2 roll-off in percent: 20, 25 or 35.
    #[clap(long)]
    pub rolloff: Option<i32>,

    /// Spectral inversion: 0 (off), 1 (on), -1 for auto.
    #[clap(long, allow_negative_numbers = true)]
    pub inversion: Option<i32>,
}

impl ChannelArgs {
    /// Builds the tuning request, or `None` when no frequency was given.
    /// `guessed` stands in for `--delivery` when it is absent.
    pub fn tuning_params(
        &self,
        guessed: Option<DeliverySystem>,
    ) -> Result<Option<TuningParams>, ProtocolError> {
        let Some(frequency) = self.frequency else {
            return Ok(None);
        };
        let system = self
            .delivery
            .or(guessed)
            .ok_or(ProtocolError::MissingParameter {
                system: "tuning",
                parameter: "delivery",
            })?;
        let symbol_rate = || {
            self.symbol_rate.ok_or(ProtocolError::MissingParameter {
                system: system.name(),
                parameter: "symbol-rate",
            })
        };
        let terrestrial_hz = || {
            u32::try_from(frequency)
                .map_err(|_| ProtocolError::FrequencyOutOfRange(frequency, system.name()))
        };

        let params = match system {
            DeliverySystem::DvbC => TuningParams::DvbC(DvbcParams {
                frequency: terrestrial_hz()?,
                modulation: self.modulation.clone(),
                symbol_rate: symbol_rate()?,
                fec: self.fec.clone(),
            }),
            DeliverySystem::DvbS => TuningParams::DvbS(DvbsParams {
                frequency,
                symbol_rate: symbol_rate()?,
                fec: self.fec.clone(),
            }),
            DeliverySystem::DvbS2 => TuningParams::DvbS2(Dvbs2Params {
                frequency,
                modulation: self.modulation.clone(),
                symbol_rate: symbol_rate()?,
                fec: self.fec.clone(),
                pilot: self.pilot.unwrap_or(-1),
                rolloff: self.rolloff.unwrap_or(-1),
            }),
            DeliverySystem::DvbT => {
                let defaults = DvbtParams::default();
                TuningParams::DvbT(DvbtParams {
                    frequency: terrestrial_hz()?,
                    modulation: self.modulation.clone(),
                    fec_hp: self.fec.clone(),
                    fec_lp: self.fec_lp.clone(),
                    bandwidth: self.bandwidth.unwrap_or(defaults.bandwidth),
                    transmission_mode: self
                        .transmission_mode
                        .unwrap_or(defaults.transmission_mode),
                    guard: self.guard.clone(),
                    hierarchy: self.hierarchy.unwrap_or(defaults.hierarchy),
                })
            }
            DeliverySystem::Atsc => TuningParams::Atsc(AtscParams {
                frequency: terrestrial_hz()?,
                modulation: self.modulation.clone(),
            }),
        };
        Ok(Some(params))
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Frontend information.{n}
    /// This subcommand opens the frontend and prints its name, type,
    /// capabilities and frequency ranges.
    #[clap(name = "info")]
    Info {
        #[clap(flatten)]
        device: DeviceArgs,
    },

    /// Signal test.{n}
    /// This subcommand optionally tunes to a channel, then prints the
    /// signal strength, the S/N ratio and the lock status once per second
    /// until interrupted.
    #[clap(name = "checksignal")]
    Checksignal {
        #[clap(flatten)]
        device: DeviceArgs,

        #[clap(flatten)]
        channel: ChannelArgs,
    },

    /// Tune to a channel.
    /// This subcommand tunes the frontend and starts recording.{n}
    /// The recording destination is passed as an argument.
    #[clap(name = "tune")]
    Tune {
        #[clap(flatten)]
        device: DeviceArgs,

        #[clap(flatten)]
        channel: ChannelArgs,

        /// PID to capture (decimal or 0x-prefixed hex). Repeatable.{n}
        /// Ignored in budget mode, which captures the whole stream.
        #[clap(long = "pid", value_parser = maybe_hex::<u16>)]
        pids: Vec<u16>,

        /// How the stream is filtered.{n}
        /// If not specified, the `[device]` section decides; emulated
        /// per-PID filtering is the default.
        #[clap(value_enum, long)]
        capture: Option<CaptureMode>,

        /// The duration of the recording in seconds.{n}
        /// If not specified, zero or negative, the recording continues
        /// until the user stops it or the stream ends.
        #[clap(short, long, value_name = "seconds")]
        time: Option<f64>,

        /// The location of the output.{n}
        /// If '-' is specified, the recording will be redirected to
        /// stdout.
        #[clap(required = true)]
        output: String,
    },
}
