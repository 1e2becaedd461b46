//! Ordered tuning parameter sets, one per delivery system.
//!
//! Every set starts with `DTV_CLEAR` followed by `DTV_DELIVERY_SYSTEM`, and
//! is submitted to the frontend as a single `FE_SET_PROPERTY` call.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::tables::{
    parse_fec, parse_guard, parse_hierarchy, parse_inversion, parse_modulation, parse_pilot,
    parse_rolloff, parse_transmission_mode,
};
use crate::types::{cmd, modulation, DeliverySystem, Property};

fn auto() -> i32 {
    -1
}

fn default_bandwidth() -> u32 {
    8
}

fn clear_and_select(system: DeliverySystem) -> [Property; 2] {
    [
        Property::new(cmd::DTV_CLEAR, 0),
        Property::new(cmd::DTV_DELIVERY_SYSTEM, system.raw()),
    ]
}

/// Satellite frequencies are configured in Hz but programmed in kHz.
fn satellite_khz(frequency_hz: u64, system: DeliverySystem) -> Result<u32, ProtocolError> {
    u32::try_from(frequency_hz / 1000)
        .map_err(|_| ProtocolError::FrequencyOutOfRange(frequency_hz, system.name()))
}

/// DVB-C (annex A/C) parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvbcParams {
    /// Frequency in Hz.
    pub frequency: u32,
    /// Modulation name, QAM auto when unset.
    pub modulation: Option<String>,
    pub symbol_rate: u32,
    /// Inner FEC rate, auto when unset.
    pub fec: Option<String>,
}

impl DvbcParams {
    pub fn properties(&self) -> [Property; 6] {
        let [clear, system] = clear_and_select(DeliverySystem::DvbC);
        [
            clear,
            system,
            Property::new(cmd::DTV_FREQUENCY, self.frequency),
            Property::new(
                cmd::DTV_MODULATION,
                parse_modulation(self.modulation.as_deref(), modulation::QAM_AUTO),
            ),
            Property::new(cmd::DTV_SYMBOL_RATE, self.symbol_rate),
            Property::new(cmd::DTV_INNER_FEC, parse_fec(self.fec.as_deref())),
        ]
    }
}

/// DVB-S parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvbsParams {
    /// Frequency in Hz.
    pub frequency: u64,
    pub symbol_rate: u32,
    pub fec: Option<String>,
}

impl DvbsParams {
    /// Fails when the frequency does not fit a kHz `DTV_FREQUENCY`.
    pub fn properties(&self) -> Result<[Property; 5], ProtocolError> {
        let frequency = satellite_khz(self.frequency, DeliverySystem::DvbS)?;
        let [clear, system] = clear_and_select(DeliverySystem::DvbS);
        Ok([
            clear,
            system,
            Property::new(cmd::DTV_FREQUENCY, frequency),
            Property::new(cmd::DTV_SYMBOL_RATE, self.symbol_rate),
            Property::new(cmd::DTV_INNER_FEC, parse_fec(self.fec.as_deref())),
        ])
    }
}

/// DVB-S2 parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dvbs2Params {
    /// Frequency in Hz.
    pub frequency: u64,
    /// Modulation name, QPSK when unset.
    pub modulation: Option<String>,
    pub symbol_rate: u32,
    pub fec: Option<String>,
    /// 0 = off, 1 = on, anything else = auto.
    #[serde(default = "auto")]
    pub pilot: i32,
    /// Roll-off in percent: 20, 25 or 35. Anything else = auto.
    #[serde(default = "auto")]
    pub rolloff: i32,
}

impl Default for Dvbs2Params {
    fn default() -> Self {
        Self {
            frequency: 0,
            modulation: None,
            symbol_rate: 0,
            fec: None,
            pilot: auto(),
            rolloff: auto(),
        }
    }
}

impl Dvbs2Params {
    pub fn properties(&self) -> Result<[Property; 8], ProtocolError> {
        let frequency = satellite_khz(self.frequency, DeliverySystem::DvbS2)?;
        let [clear, system] = clear_and_select(DeliverySystem::DvbS2);
        Ok([
            clear,
            system,
            Property::new(cmd::DTV_FREQUENCY, frequency),
            Property::new(
                cmd::DTV_MODULATION,
                parse_modulation(self.modulation.as_deref(), modulation::QPSK),
            ),
            Property::new(cmd::DTV_SYMBOL_RATE, self.symbol_rate),
            Property::new(cmd::DTV_INNER_FEC, parse_fec(self.fec.as_deref())),
            Property::new(cmd::DTV_PILOT, parse_pilot(self.pilot)),
            Property::new(cmd::DTV_ROLLOFF, parse_rolloff(self.rolloff)),
        ])
    }
}

/// DVB-T parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvbtParams {
    /// Frequency in Hz.
    pub frequency: u32,
    pub modulation: Option<String>,
    /// High priority stream code rate.
    pub fec_hp: Option<String>,
    /// Low priority stream code rate.
    pub fec_lp: Option<String>,
    /// Channel bandwidth in MHz.
    #[serde(default = "default_bandwidth")]
    pub bandwidth: u32,
    /// 2, 4 or 8 (k carriers); -1 = auto.
    #[serde(default = "auto")]
    pub transmission_mode: i32,
    pub guard: Option<String>,
    /// 0 = none, 1/2/4 = hierarchy depth, -1 = auto.
    #[serde(default = "auto")]
    pub hierarchy: i32,
}

impl Default for DvbtParams {
    fn default() -> Self {
        Self {
            frequency: 0,
            modulation: None,
            fec_hp: None,
            fec_lp: None,
            bandwidth: default_bandwidth(),
            transmission_mode: auto(),
            guard: None,
            hierarchy: auto(),
        }
    }
}

impl DvbtParams {
    /// Fails when the bandwidth does not fit `DTV_BANDWIDTH_HZ`.
    pub fn properties(&self) -> Result<[Property; 10], ProtocolError> {
        let bandwidth_hz = self
            .bandwidth
            .checked_mul(1_000_000)
            .ok_or(ProtocolError::BandwidthOutOfRange(self.bandwidth))?;
        let [clear, system] = clear_and_select(DeliverySystem::DvbT);
        Ok([
            clear,
            system,
            Property::new(cmd::DTV_FREQUENCY, self.frequency),
            Property::new(
                cmd::DTV_MODULATION,
                parse_modulation(self.modulation.as_deref(), modulation::QAM_AUTO),
            ),
            Property::new(cmd::DTV_CODE_RATE_HP, parse_fec(self.fec_hp.as_deref())),
            Property::new(cmd::DTV_CODE_RATE_LP, parse_fec(self.fec_lp.as_deref())),
            Property::new(cmd::DTV_BANDWIDTH_HZ, bandwidth_hz),
            Property::new(
                cmd::DTV_TRANSMISSION_MODE,
                parse_transmission_mode(self.transmission_mode),
            ),
            Property::new(cmd::DTV_GUARD_INTERVAL, parse_guard(self.guard.as_deref())),
            Property::new(cmd::DTV_HIERARCHY, parse_hierarchy(self.hierarchy)),
        ])
    }
}

/// ATSC parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtscParams {
    /// Frequency in Hz.
    pub frequency: u32,
    /// Modulation name, 8VSB when unset.
    pub modulation: Option<String>,
}

impl AtscParams {
    pub fn properties(&self) -> [Property; 4] {
        let [clear, system] = clear_and_select(DeliverySystem::Atsc);
        [
            clear,
            system,
            Property::new(cmd::DTV_FREQUENCY, self.frequency),
            Property::new(
                cmd::DTV_MODULATION,
                parse_modulation(self.modulation.as_deref(), modulation::VSB_8),
            ),
        ]
    }
}

/// A complete tuning request for any supported delivery system.
///
/// Deserializes from a table tagged with `system` (`dvbc`, `dvbs`, `dvbs2`,
/// `dvbt` or `atsc`).
///
/// ```rust
/// use dvbtune_protocol::{DeliverySystem, DvbsParams, TuningParams};
///
/// let params = TuningParams::DvbS(DvbsParams {
///     frequency: 11_727_000_000,
///     symbol_rate: 27_500_000,
///     fec: Some("3/4".into()),
/// });
/// assert_eq!(params.delivery_system(), DeliverySystem::DvbS);
/// assert_eq!(params.properties().unwrap().len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum TuningParams {
    DvbC(DvbcParams),
    DvbS(DvbsParams),
    DvbS2(Dvbs2Params),
    DvbT(DvbtParams),
    Atsc(AtscParams),
}

impl TuningParams {
    pub fn delivery_system(&self) -> DeliverySystem {
        match self {
            TuningParams::DvbC(_) => DeliverySystem::DvbC,
            TuningParams::DvbS(_) => DeliverySystem::DvbS,
            TuningParams::DvbS2(_) => DeliverySystem::DvbS2,
            TuningParams::DvbT(_) => DeliverySystem::DvbT,
            TuningParams::Atsc(_) => DeliverySystem::Atsc,
        }
    }

    /// The ordered property list for this request.
    pub fn properties(&self) -> Result<Vec<Property>, ProtocolError> {
        Ok(match self {
            TuningParams::DvbC(p) => p.properties().to_vec(),
            TuningParams::DvbS(p) => p.properties()?.to_vec(),
            TuningParams::DvbS2(p) => p.properties()?.to_vec(),
            TuningParams::DvbT(p) => p.properties()?.to_vec(),
            TuningParams::Atsc(p) => p.properties().to_vec(),
        })
    }
}

/// `DTV_INVERSION` for 0 (off), 1 (on) or anything else (auto).
pub fn inversion_properties(mode: i32) -> [Property; 1] {
    [Property::new(cmd::DTV_INVERSION, parse_inversion(mode))]
}

/// `DTV_TUNE` commits the staged parameters; the value is ignored by the kernel.
pub fn tune_properties() -> [Property; 1] {
    [Property::new(cmd::DTV_TUNE, 0)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{fec, guard, hierarchy, inversion, pilot, rolloff, sys, transmission};

    fn cmds(props: &[Property]) -> Vec<u32> {
        props.iter().map(|p| p.cmd).collect()
    }

    #[test]
    fn test_dvbc_properties() {
        let p = DvbcParams {
            frequency: 346_000_000,
            modulation: Some("256QAM".into()),
            symbol_rate: 6_900_000,
            fec: None,
        };
        let props = p.properties();
        assert_eq!(
            cmds(&props),
            vec![
                cmd::DTV_CLEAR,
                cmd::DTV_DELIVERY_SYSTEM,
                cmd::DTV_FREQUENCY,
                cmd::DTV_MODULATION,
                cmd::DTV_SYMBOL_RATE,
                cmd::DTV_INNER_FEC
            ]
        );
        assert_eq!(props[1].value, sys::SYS_DVBC_ANNEX_AC);
        assert_eq!(props[2].value, 346_000_000);
        assert_eq!(props[3].value, modulation::QAM_256);
        assert_eq!(props[5].value, fec::FEC_AUTO);

        let defaulted = DvbcParams::default().properties();
        assert_eq!(defaulted[3].value, modulation::QAM_AUTO);
    }

    #[test]
    fn test_dvbs_converts_to_khz() {
        let p = DvbsParams {
            frequency: 11_727_000_000,
            symbol_rate: 27_500_000,
            fec: Some("3/4".into()),
        };
        let props = p.properties().unwrap();
        assert_eq!(props[0], Property::new(cmd::DTV_CLEAR, 0));
        assert_eq!(props[1], Property::new(cmd::DTV_DELIVERY_SYSTEM, sys::SYS_DVBS));
        assert_eq!(props[2], Property::new(cmd::DTV_FREQUENCY, 11_727_000));
        assert_eq!(props[3], Property::new(cmd::DTV_SYMBOL_RATE, 27_500_000));
        assert_eq!(props[4], Property::new(cmd::DTV_INNER_FEC, fec::FEC_3_4));
    }

    #[test]
    fn test_dvbs2_defaults_and_rolloff() {
        let mut p = Dvbs2Params {
            frequency: 12_187_500_000,
            symbol_rate: 27_500_000,
            ..Default::default()
        };
        let props = p.properties().unwrap();
        assert_eq!(props[1].value, sys::SYS_DVBS2);
        assert_eq!(props[2].value, 12_187_500);
        assert_eq!(props[3].value, modulation::QPSK);
        assert_eq!(props[6], Property::new(cmd::DTV_PILOT, pilot::PILOT_AUTO));
        assert_eq!(props[7], Property::new(cmd::DTV_ROLLOFF, rolloff::ROLLOFF_AUTO));

        p.modulation = Some("8PSK".into());
        p.pilot = 1;
        p.rolloff = 25;
        let props = p.properties().unwrap();
        assert_eq!(props[3].value, modulation::PSK_8);
        assert_eq!(props[6].value, pilot::PILOT_ON);
        assert_eq!(props[7].value, rolloff::ROLLOFF_25);

        p.rolloff = 50;
        assert_eq!(p.properties().unwrap()[7].value, rolloff::ROLLOFF_AUTO);
        p.rolloff = 0;
        assert_eq!(p.properties().unwrap()[7].value, rolloff::ROLLOFF_AUTO);
    }

    #[test]
    fn test_dvbt_properties() {
        let p = DvbtParams {
            frequency: 474_000_000,
            modulation: Some("64QAM".into()),
            fec_hp: Some("2/3".into()),
            fec_lp: None,
            bandwidth: 8,
            transmission_mode: 8,
            guard: Some("1/4".into()),
            hierarchy: 0,
        };
        let props = p.properties().unwrap();
        assert_eq!(
            cmds(&props),
            vec![
                cmd::DTV_CLEAR,
                cmd::DTV_DELIVERY_SYSTEM,
                cmd::DTV_FREQUENCY,
                cmd::DTV_MODULATION,
                cmd::DTV_CODE_RATE_HP,
                cmd::DTV_CODE_RATE_LP,
                cmd::DTV_BANDWIDTH_HZ,
                cmd::DTV_TRANSMISSION_MODE,
                cmd::DTV_GUARD_INTERVAL,
                cmd::DTV_HIERARCHY
            ]
        );
        assert_eq!(props[1].value, sys::SYS_DVBT);
        assert_eq!(props[3].value, modulation::QAM_64);
        assert_eq!(props[4].value, fec::FEC_2_3);
        assert_eq!(props[5].value, fec::FEC_AUTO);
        assert_eq!(props[6].value, 8_000_000);
        assert_eq!(props[7].value, transmission::TRANSMISSION_MODE_8K);
        assert_eq!(props[8].value, guard::GUARD_INTERVAL_1_4);
        assert_eq!(props[9].value, hierarchy::HIERARCHY_NONE);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let dvbs = DvbsParams {
            frequency: 5_000_000_000_000,
            symbol_rate: 27_500_000,
            fec: None,
        };
        assert_eq!(
            dvbs.properties(),
            Err(ProtocolError::FrequencyOutOfRange(5_000_000_000_000, "DVB-S"))
        );

        let dvbs2 = Dvbs2Params {
            frequency: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            TuningParams::DvbS2(dvbs2).properties(),
            Err(ProtocolError::FrequencyOutOfRange(u64::MAX, "DVB-S2"))
        );

        // 4294 MHz is the widest bandwidth DTV_BANDWIDTH_HZ can carry.
        let mut dvbt = DvbtParams {
            frequency: 474_000_000,
            bandwidth: 4294,
            ..Default::default()
        };
        assert_eq!(dvbt.properties().unwrap()[6].value, 4_294_000_000);
        dvbt.bandwidth = 5000;
        assert_eq!(dvbt.properties(), Err(ProtocolError::BandwidthOutOfRange(5000)));
        assert!(TuningParams::DvbT(dvbt).properties().is_err());
    }

    #[test]
    fn test_atsc_default_modulation() {
        let props = AtscParams {
            frequency: 57_000_000,
            modulation: None,
        }
        .properties();
        assert_eq!(props[1].value, sys::SYS_ATSC);
        assert_eq!(props[3].value, modulation::VSB_8);
    }

    #[test]
    fn test_inversion_and_tune() {
        assert_eq!(inversion_properties(0)[0].value, inversion::INVERSION_OFF);
        assert_eq!(inversion_properties(1)[0].value, inversion::INVERSION_ON);
        assert_eq!(inversion_properties(5)[0].value, inversion::INVERSION_AUTO);
        assert_eq!(tune_properties(), [Property::new(cmd::DTV_TUNE, 0)]);
    }

    #[test]
    fn test_tuning_params_from_toml() {
        let params: TuningParams = toml::from_str(
            r#"
system = "dvbs2"
frequency = 11727000000
symbol_rate = 27500000
fec = "3/4"
rolloff = 35
"#,
        )
        .unwrap();
        assert_eq!(params.delivery_system(), DeliverySystem::DvbS2);
        let props = params.properties().unwrap();
        assert_eq!(props.len(), 8);
        assert_eq!(props[6].value, pilot::PILOT_AUTO);
        assert_eq!(props[7].value, rolloff::ROLLOFF_35);

        let params: TuningParams = toml::from_str(
            r#"
system = "dvbt"
frequency = 474000000
bandwidth = 7
"#,
        )
        .unwrap();
        let props = params.properties().unwrap();
        assert_eq!(props[6].value, 7_000_000);
        assert_eq!(props[7].value, transmission::TRANSMISSION_MODE_AUTO);
        assert_eq!(props[9].value, hierarchy::HIERARCHY_AUTO);
    }
}
