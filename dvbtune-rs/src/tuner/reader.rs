use std::time::Duration;

use log::{debug, error};

use crate::tuner::device::Device;
use crate::tuner::error::{is_overflow, is_transient, Channel, DeviceError};
use crate::tuner::sys::Platform;

/// Longest a single [`Device::read`] call waits for the device.
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// What a successful read produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were copied into the buffer.
    Data(usize),
    /// The data node reported end of file.
    EndOfStream,
    /// Nothing arrived within the timeout; call again.
    NoDataYet,
}

impl<P: Platform> Device<P> {
    /// Waits up to [`READ_TIMEOUT`] for stream data, dequeuing a pending
    /// frontend event on the way.
    ///
    /// [`DeviceError::Overrun`] means data was lost but the device is still
    /// usable. Any other error ends the stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, DeviceError> {
        let frontend = self.frontend.as_ref().map(|frontend| &frontend.node);
        let ready = match self.platform.poll(&self.data, frontend, READ_TIMEOUT) {
            Ok(ready) => ready,
            Err(e) => {
                debug!("poll: {}", e);
                return Ok(ReadOutcome::NoDataYet);
            }
        };

        if let (true, Some(frontend)) = (ready.frontend, frontend) {
            match self.platform.next_event(frontend) {
                Ok(event) => debug!("frontend status: 0x{:02X}", event.status.bits()),
                Err(e) if is_transient(&e) => {}
                Err(e) if is_overflow(&e) => {
                    error!("cannot dequeue events fast enough!");
                    return Err(DeviceError::Overrun(Channel::Events));
                }
                Err(source) => {
                    error!("cannot dequeue frontend event: {}", source);
                    return Err(DeviceError::Stream {
                        channel: Channel::Events,
                        source,
                    });
                }
            }
        }

        // A zero-length read would look like end of file.
        if !ready.data || buf.is_empty() {
            return Ok(ReadOutcome::NoDataYet);
        }
        match self.platform.read(&self.data, buf) {
            Ok(0) => Ok(ReadOutcome::EndOfStream),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) if is_transient(&e) => Ok(ReadOutcome::NoDataYet),
            Err(e) if is_overflow(&e) => {
                error!("cannot demux data fast enough!");
                Err(DeviceError::Overrun(Channel::Data))
            }
            Err(source) => {
                error!("cannot demux: {}", source);
                Err(DeviceError::Stream {
                    channel: Channel::Data,
                    source,
                })
            }
        }
    }
}
