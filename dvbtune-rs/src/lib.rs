//! dvbtune library - Linux DVB v5 tuner and demultiplexer access
//!
//! This library opens the nodes of a `/dev/dvb/adapter<N>` directory, programs
//! the frontend for DVB-C, DVB-S, DVB-S2, DVB-T or ATSC reception, and reads
//! the filtered transport stream back with a bounded wait.

pub mod tuner;

// Re-export commonly used types
pub use dvbtune_protocol as protocol;
pub use tuner::{CaptureMode, Device, DeviceConfig, DeviceError, ReadOutcome};
