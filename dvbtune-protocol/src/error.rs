//! Error types for the tuning vocabulary.

use thiserror::Error;

/// Errors raised while interpreting tuning configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The delivery system name is not one of dvbc/dvbs/dvbs2/dvbt/atsc.
    #[error("Unknown delivery system: {0:?} (expected dvbc, dvbs, dvbs2, dvbt or atsc)")]
    UnknownDeliverySystem(String),

    /// A parameter required by the selected delivery system is missing.
    #[error("{system} requires the {parameter} parameter")]
    MissingParameter {
        system: &'static str,
        parameter: &'static str,
    },

    /// The frequency does not fit the delivery system's property value.
    #[error("Frequency {0} Hz is out of range for {1}")]
    FrequencyOutOfRange(u64, &'static str),

    /// The channel bandwidth does not fit `DTV_BANDWIDTH_HZ`.
    #[error("Bandwidth {0} MHz is out of range")]
    BandwidthOutOfRange(u32),
}
