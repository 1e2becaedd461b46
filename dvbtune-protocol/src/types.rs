//! Linux DVB v5 enumerations and descriptor types.
//!
//! The numeric values mirror `linux/dvb/frontend.h` and `linux/dvb/dmx.h`
//! so that they can be handed to the kernel unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// `DTV_*` property commands accepted by `FE_SET_PROPERTY`.
pub mod cmd {
    pub const DTV_TUNE: u32 = 1;
    pub const DTV_CLEAR: u32 = 2;
    pub const DTV_FREQUENCY: u32 = 3;
    pub const DTV_MODULATION: u32 = 4;
    pub const DTV_BANDWIDTH_HZ: u32 = 5;
    pub const DTV_INVERSION: u32 = 6;
    pub const DTV_SYMBOL_RATE: u32 = 8;
    pub const DTV_INNER_FEC: u32 = 9;
    pub const DTV_PILOT: u32 = 12;
    pub const DTV_ROLLOFF: u32 = 13;
    pub const DTV_DELIVERY_SYSTEM: u32 = 17;
    pub const DTV_CODE_RATE_HP: u32 = 36;
    pub const DTV_CODE_RATE_LP: u32 = 37;
    pub const DTV_GUARD_INTERVAL: u32 = 38;
    pub const DTV_TRANSMISSION_MODE: u32 = 39;
    pub const DTV_HIERARCHY: u32 = 40;

    /// Human-readable name of a property command, for diagnostics.
    pub fn name(cmd: u32) -> &'static str {
        match cmd {
            DTV_TUNE => "DTV_TUNE",
            DTV_CLEAR => "DTV_CLEAR",
            DTV_FREQUENCY => "DTV_FREQUENCY",
            DTV_MODULATION => "DTV_MODULATION",
            DTV_BANDWIDTH_HZ => "DTV_BANDWIDTH_HZ",
            DTV_INVERSION => "DTV_INVERSION",
            DTV_SYMBOL_RATE => "DTV_SYMBOL_RATE",
            DTV_INNER_FEC => "DTV_INNER_FEC",
            DTV_PILOT => "DTV_PILOT",
            DTV_ROLLOFF => "DTV_ROLLOFF",
            DTV_DELIVERY_SYSTEM => "DTV_DELIVERY_SYSTEM",
            DTV_CODE_RATE_HP => "DTV_CODE_RATE_HP",
            DTV_CODE_RATE_LP => "DTV_CODE_RATE_LP",
            DTV_GUARD_INTERVAL => "DTV_GUARD_INTERVAL",
            DTV_TRANSMISSION_MODE => "DTV_TRANSMISSION_MODE",
            DTV_HIERARCHY => "DTV_HIERARCHY",
            _ => "DTV_UNKNOWN",
        }
    }
}

/// `fe_delivery_system` values.
pub mod sys {
    pub const SYS_DVBC_ANNEX_AC: u32 = 1;
    pub const SYS_DVBT: u32 = 3;
    pub const SYS_DVBS: u32 = 5;
    pub const SYS_DVBS2: u32 = 6;
    pub const SYS_ATSC: u32 = 11;
}

/// `fe_modulation` values.
pub mod modulation {
    pub const QPSK: u32 = 0;
    pub const QAM_16: u32 = 1;
    pub const QAM_32: u32 = 2;
    pub const QAM_64: u32 = 3;
    pub const QAM_128: u32 = 4;
    pub const QAM_256: u32 = 5;
    pub const QAM_AUTO: u32 = 6;
    pub const VSB_8: u32 = 7;
    pub const VSB_16: u32 = 8;
    pub const PSK_8: u32 = 9;
    pub const APSK_16: u32 = 10;
    pub const APSK_32: u32 = 11;
    pub const DQPSK: u32 = 12;
}

/// `fe_code_rate` values.
pub mod fec {
    pub const FEC_NONE: u32 = 0;
    pub const FEC_1_2: u32 = 1;
    pub const FEC_2_3: u32 = 2;
    pub const FEC_3_4: u32 = 3;
    pub const FEC_4_5: u32 = 4;
    pub const FEC_5_6: u32 = 5;
    pub const FEC_6_7: u32 = 6;
    pub const FEC_7_8: u32 = 7;
    pub const FEC_8_9: u32 = 8;
    pub const FEC_AUTO: u32 = 9;
    pub const FEC_9_10: u32 = 11;
}

/// `fe_transmit_mode` values.
pub mod transmission {
    pub const TRANSMISSION_MODE_2K: u32 = 0;
    pub const TRANSMISSION_MODE_8K: u32 = 1;
    pub const TRANSMISSION_MODE_AUTO: u32 = 2;
    pub const TRANSMISSION_MODE_4K: u32 = 3;
}

/// `fe_guard_interval` values.
pub mod guard {
    pub const GUARD_INTERVAL_1_32: u32 = 0;
    pub const GUARD_INTERVAL_1_16: u32 = 1;
    pub const GUARD_INTERVAL_1_8: u32 = 2;
    pub const GUARD_INTERVAL_1_4: u32 = 3;
    pub const GUARD_INTERVAL_AUTO: u32 = 4;
}

/// `fe_hierarchy` values.
pub mod hierarchy {
    pub const HIERARCHY_NONE: u32 = 0;
    pub const HIERARCHY_1: u32 = 1;
    pub const HIERARCHY_2: u32 = 2;
    pub const HIERARCHY_4: u32 = 3;
    pub const HIERARCHY_AUTO: u32 = 4;
}

/// `fe_spectral_inversion` values.
pub mod inversion {
    pub const INVERSION_OFF: u32 = 0;
    pub const INVERSION_ON: u32 = 1;
    pub const INVERSION_AUTO: u32 = 2;
}

/// `fe_pilot` values.
pub mod pilot {
    pub const PILOT_ON: u32 = 0;
    pub const PILOT_OFF: u32 = 1;
    pub const PILOT_AUTO: u32 = 2;
}

/// `fe_rolloff` values.
pub mod rolloff {
    pub const ROLLOFF_35: u32 = 0;
    pub const ROLLOFF_20: u32 = 1;
    pub const ROLLOFF_25: u32 = 2;
    pub const ROLLOFF_AUTO: u32 = 3;
}

/// Demultiplexer filter constants from `linux/dvb/dmx.h`.
pub mod dmx {
    pub const DMX_IN_FRONTEND: u32 = 0;
    pub const DMX_OUT_TS_TAP: u32 = 2;
    pub const DMX_OUT_TSDEMUX_TAP: u32 = 3;
    pub const DMX_PES_OTHER: u32 = 20;
    pub const DMX_IMMEDIATE_START: u32 = 4;

    /// Pseudo PID selecting the whole transport stream.
    pub const PID_WHOLE_TS: u16 = 0x2000;
    /// Program association table PID.
    pub const PID_PAT: u16 = 0x0000;
}

/// A single `(command, value)` pair of a tuning parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Property {
    pub cmd: u32,
    pub value: u32,
}

impl Property {
    pub const fn new(cmd: u32, value: u32) -> Self {
        Self { cmd, value }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) = {}", cmd::name(self.cmd), self.cmd, self.value)
    }
}

/// Parameters of a demultiplexer PES filter (`struct dmx_pes_filter_params`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PesFilter {
    pub pid: u16,
    pub input: u32,
    pub output: u32,
    pub pes_type: u32,
    pub flags: u32,
}

impl PesFilter {
    /// Filter tapping `pid` from the frontend into the demux node itself.
    pub fn demux_tap(pid: u16) -> Self {
        Self::new(pid, dmx::DMX_OUT_TSDEMUX_TAP)
    }

    /// Filter tapping `pid` from the frontend into the shared DVR node.
    pub fn dvr_tap(pid: u16) -> Self {
        Self::new(pid, dmx::DMX_OUT_TS_TAP)
    }

    fn new(pid: u16, output: u32) -> Self {
        Self {
            pid,
            input: dmx::DMX_IN_FRONTEND,
            output,
            pes_type: dmx::DMX_PES_OTHER,
            flags: dmx::DMX_IMMEDIATE_START,
        }
    }
}

/// Hardware class reported by `FE_GET_INFO` (`enum fe_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontendType {
    /// `FE_QPSK`, satellite.
    Qpsk,
    /// `FE_QAM`, cable.
    Qam,
    /// `FE_OFDM`, terrestrial.
    Ofdm,
    /// `FE_ATSC`.
    Atsc,
    /// Any value this crate does not know about.
    Unknown(u32),
}

impl FrontendType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => FrontendType::Qpsk,
            1 => FrontendType::Qam,
            2 => FrontendType::Ofdm,
            3 => FrontendType::Atsc,
            other => FrontendType::Unknown(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            FrontendType::Qpsk => 0,
            FrontendType::Qam => 1,
            FrontendType::Ofdm => 2,
            FrontendType::Atsc => 3,
            FrontendType::Unknown(other) => other,
        }
    }

    /// Delivery system a frontend of this class is driven with.
    pub fn delivery_system(self) -> Option<DeliverySystem> {
        match self {
            FrontendType::Qpsk => Some(DeliverySystem::DvbS),
            FrontendType::Qam => Some(DeliverySystem::DvbC),
            FrontendType::Ofdm => Some(DeliverySystem::DvbT),
            FrontendType::Atsc => Some(DeliverySystem::Atsc),
            FrontendType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for FrontendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontendType::Qpsk => write!(f, "QPSK (satellite)"),
            FrontendType::Qam => write!(f, "QAM (cable)"),
            FrontendType::Ofdm => write!(f, "OFDM (terrestrial)"),
            FrontendType::Atsc => write!(f, "ATSC"),
            FrontendType::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}

/// `fe_caps` bits.
pub mod caps {
    pub const FE_CAN_INVERSION_AUTO: u32 = 0x1;
    pub const FE_CAN_FEC_AUTO: u32 = 0x200;
    pub const FE_CAN_QAM_AUTO: u32 = 0x10000;
    pub const FE_CAN_TRANSMISSION_MODE_AUTO: u32 = 0x20000;
    pub const FE_CAN_BANDWIDTH_AUTO: u32 = 0x40000;
    pub const FE_CAN_GUARD_INTERVAL_AUTO: u32 = 0x80000;
    pub const FE_CAN_HIERARCHY_AUTO: u32 = 0x100000;
    pub const FE_CAN_8VSB: u32 = 0x200000;
    pub const FE_CAN_16VSB: u32 = 0x400000;
    pub const FE_CAN_MULTISTREAM: u32 = 0x4000000;
    pub const FE_CAN_2G_MODULATION: u32 = 0x10000000;
}

/// Capability snapshot returned by `FE_GET_INFO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendInfo {
    pub name: String,
    pub frontend_type: FrontendType,
    pub frequency_min: u32,
    pub frequency_max: u32,
    pub frequency_stepsize: u32,
    pub frequency_tolerance: u32,
    pub symbol_rate_min: u32,
    pub symbol_rate_max: u32,
    pub symbol_rate_tolerance: u32,
    pub caps: u32,
}

impl FrontendInfo {
    pub fn has_cap(&self, cap: u32) -> bool {
        self.caps & cap == cap
    }

    /// Whether the frontend handles second generation systems (DVB-S2, DVB-T2...).
    pub fn supports_2g_modulation(&self) -> bool {
        self.has_cap(caps::FE_CAN_2G_MODULATION)
    }
}

/// Frontend lock state bits (`fe_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FrontendStatus(u32);

impl FrontendStatus {
    pub const HAS_SIGNAL: u32 = 0x01;
    pub const HAS_CARRIER: u32 = 0x02;
    pub const HAS_VITERBI: u32 = 0x04;
    pub const HAS_SYNC: u32 = 0x08;
    pub const HAS_LOCK: u32 = 0x10;
    pub const TIMEDOUT: u32 = 0x20;
    pub const REINIT: u32 = 0x40;

    const NAMES: [(u32, &'static str); 7] = [
        (Self::HAS_SIGNAL, "SIGNAL"),
        (Self::HAS_CARRIER, "CARRIER"),
        (Self::HAS_VITERBI, "VITERBI"),
        (Self::HAS_SYNC, "SYNC"),
        (Self::HAS_LOCK, "LOCK"),
        (Self::TIMEDOUT, "TIMEDOUT"),
        (Self::REINIT, "REINIT"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub fn has_lock(self) -> bool {
        self.contains(Self::HAS_LOCK)
    }
}

impl fmt::Display for FrontendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (bit, name) in Self::NAMES {
            if self.contains(bit) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        if first {
            f.write_str("NONE")?;
        }
        Ok(())
    }
}

/// Standardised physical-layer profile requiring its own parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySystem {
    DvbC,
    DvbS,
    DvbS2,
    DvbT,
    Atsc,
}

impl DeliverySystem {
    pub const ALL: [DeliverySystem; 5] = [
        DeliverySystem::DvbC,
        DeliverySystem::DvbS,
        DeliverySystem::DvbS2,
        DeliverySystem::DvbT,
        DeliverySystem::Atsc,
    ];

    /// `fe_delivery_system` value programmed with `DTV_DELIVERY_SYSTEM`.
    pub fn raw(self) -> u32 {
        match self {
            DeliverySystem::DvbC => sys::SYS_DVBC_ANNEX_AC,
            DeliverySystem::DvbS => sys::SYS_DVBS,
            DeliverySystem::DvbS2 => sys::SYS_DVBS2,
            DeliverySystem::DvbT => sys::SYS_DVBT,
            DeliverySystem::Atsc => sys::SYS_ATSC,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeliverySystem::DvbC => "DVB-C",
            DeliverySystem::DvbS => "DVB-S",
            DeliverySystem::DvbS2 => "DVB-S2",
            DeliverySystem::DvbT => "DVB-T",
            DeliverySystem::Atsc => "ATSC",
        }
    }
}

impl fmt::Display for DeliverySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeliverySystem {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "dvbc" => Ok(DeliverySystem::DvbC),
            "dvbs" => Ok(DeliverySystem::DvbS),
            "dvbs2" => Ok(DeliverySystem::DvbS2),
            "dvbt" => Ok(DeliverySystem::DvbT),
            "atsc" => Ok(DeliverySystem::Atsc),
            _ => Err(ProtocolError::UnknownDeliverySystem(s.to_string())),
        }
    }
}
