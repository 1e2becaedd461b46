//! Tuning vocabulary for Linux DVB v5 frontends.
//!
//! This crate holds everything about tuning that does not touch a device:
//! the kernel enumeration values, the lookup tables that translate
//! configuration strings into them, and the ordered property lists each
//! delivery system is programmed with.
//!
//! # Example
//!
//! ```rust
//! use dvbtune_protocol::{cmd, fec, DvbsParams, Property};
//!
//! let params = DvbsParams {
//!     frequency: 11_727_000_000,
//!     symbol_rate: 27_500_000,
//!     fec: Some("3/4".to_string()),
//! };
//! let props = params.properties().unwrap();
//! assert_eq!(props[0], Property::new(cmd::DTV_CLEAR, 0));
//! assert_eq!(props[2], Property::new(cmd::DTV_FREQUENCY, 11_727_000));
//! assert_eq!(props[4], Property::new(cmd::DTV_INNER_FEC, fec::FEC_3_4));
//! ```

pub mod error;
pub mod params;
pub mod tables;
pub mod types;

pub use error::ProtocolError;
pub use params::{
    inversion_properties, tune_properties, AtscParams, DvbcParams, Dvbs2Params, DvbsParams,
    DvbtParams, TuningParams,
};
pub use types::{
    caps, cmd, dmx, fec, guard, hierarchy, inversion, modulation, pilot, rolloff, sys,
    transmission, DeliverySystem, FrontendInfo, FrontendStatus, FrontendType, PesFilter, Property,
};
