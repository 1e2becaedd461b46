//! Programming the frontend with DVB v5 property lists.

use dvbtune_protocol::{
    inversion_properties, tune_properties, AtscParams, DeliverySystem, DvbcParams, Dvbs2Params,
    DvbsParams, DvbtParams, FrontendStatus, Property, TuningParams,
};
use log::{debug, error};

use crate::tuner::device::{Device, Frontend};
use crate::tuner::error::DeviceError;
use crate::tuner::sys::Platform;

/// Quality readings are 16-bit fractions of full scale.
fn normalize(raw: u16) -> f64 {
    f64::from(raw) / f64::from(u16::MAX)
}

impl<P: Platform> Device<P> {
    fn tuner(&self) -> Result<&Frontend<P>, DeviceError> {
        self.frontend.as_ref().ok_or(DeviceError::FrontendNotOpen)
    }

    /// Submits `props` in a single `FE_SET_PROPERTY` call.
    fn set_properties(&mut self, props: &[Property]) -> Result<(), DeviceError> {
        let frontend = self.tuner()?;
        for prop in props {
            debug!("setting property {}", prop);
        }
        self.platform
            .set_properties(&frontend.node, props)
            .map_err(|source| {
                error!("cannot set frontend tuning parameters: {}", source);
                DeviceError::ProtocolRejected {
                    operation: "set frontend tuning parameters",
                    source,
                }
            })
    }

    pub fn set_dvbc(&mut self, params: &DvbcParams) -> Result<(), DeviceError> {
        self.set_properties(&params.properties())
    }

    /// The frequency is given in Hz and programmed in kHz.
    pub fn set_dvbs(&mut self, params: &DvbsParams) -> Result<(), DeviceError> {
        self.set_properties(&params.properties()?)
    }

    pub fn set_dvbs2(&mut self, params: &Dvbs2Params) -> Result<(), DeviceError> {
        self.set_properties(&params.properties()?)
    }

    pub fn set_dvbt(&mut self, params: &DvbtParams) -> Result<(), DeviceError> {
        self.set_properties(&params.properties()?)
    }

    pub fn set_atsc(&mut self, params: &AtscParams) -> Result<(), DeviceError> {
        self.set_properties(&params.properties())
    }

    /// Programs whichever delivery system `params` describes.
    ///
    /// Out-of-range values fail with [`DeviceError::InvalidParameters`]
    /// before anything reaches the frontend.
    pub fn set_tuning(&mut self, params: &TuningParams) -> Result<(), DeviceError> {
        self.set_properties(&params.properties()?)
    }

    /// 0 = off, 1 = on, anything else = auto.
    pub fn set_inversion(&mut self, mode: i32) -> Result<(), DeviceError> {
        self.set_properties(&inversion_properties(mode))
    }

    /// Commits the staged parameters.
    pub fn tune(&mut self) -> Result<(), DeviceError> {
        self.set_properties(&tune_properties())
    }

    /// The delivery system matching the frontend hardware class.
    ///
    /// Satellite frontends always report DVB-S; check
    /// [`FrontendInfo::supports_2g_modulation`](dvbtune_protocol::FrontendInfo::supports_2g_modulation)
    /// for DVB-S2. `None` without a frontend or for unknown hardware.
    pub fn guess_delivery_system(&self) -> Option<DeliverySystem> {
        self.info()?.frontend_type.delivery_system()
    }

    /// Signal strength in `[0, 1]`, 0 when it cannot be read.
    pub fn signal_strength(&self) -> f64 {
        let Ok(frontend) = self.tuner() else {
            return 0.0;
        };
        match self.platform.signal_strength(&frontend.node) {
            Ok(raw) => normalize(raw),
            Err(e) => {
                debug!("cannot read signal strength: {}", e);
                0.0
            }
        }
    }

    /// Signal-to-noise ratio in `[0, 1]`, 0 when it cannot be read.
    pub fn snr(&self) -> f64 {
        let Ok(frontend) = self.tuner() else {
            return 0.0;
        };
        match self.platform.snr(&frontend.node) {
            Ok(raw) => normalize(raw),
            Err(e) => {
                debug!("cannot read SNR: {}", e);
                0.0
            }
        }
    }

    pub fn status(&self) -> Result<FrontendStatus, DeviceError> {
        let frontend = self.tuner()?;
        self.platform
            .read_status(&frontend.node)
            .map_err(|source| DeviceError::ProtocolRejected {
                operation: "read frontend status",
                source,
            })
    }
}
