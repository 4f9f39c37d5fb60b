//! [Transport] implementation backed by the `hidapi` crate.

use std::ffi::CString;
use std::time::Duration;

use hidapi::{BusType, HidApi, HidDevice, HidError};

use crate::report::{
    INPUT_REPORT_BT_LEN, INPUT_REPORT_USB_LEN, OUTPUT_REPORT_BT_LEN, OUTPUT_REPORT_USB_LEN,
    PRODUCT_ID, VENDOR_ID,
};

use super::{DeviceDescriptor, HotplugFlag, ReportLengths, Transport, TransportError};

fn backend(err: HidError) -> TransportError {
    TransportError::Backend(Box::new(err))
}

/// HID transport for DualSense controllers.
///
/// `hidapi` has no device arrival/removal callbacks, so this transport cannot
/// raise the hot-plug flag on its own. The manager's flag starts raised (the
/// first tick always enumerates) and is re-armed whenever a device drops
/// mid-I/O; for prompt detection of new controllers, raise the flag from a
/// platform device watcher via [crate::Manager::hotplug].
pub struct HidTransport {
    api: HidApi,
    hotplug: Option<HotplugFlag>,
}

impl HidTransport {
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new().map_err(backend)?;
        Ok(Self { api, hotplug: None })
    }

    /// The flag registered by the manager, if any.
    pub fn hotplug(&self) -> Option<&HotplugFlag> {
        self.hotplug.as_ref()
    }
}

impl Transport for HidTransport {
    type Device = HidDevice;

    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        self.api.refresh_devices().map_err(backend)?;

        let mut found = Vec::new();
        for info in self.api.device_list() {
            if info.vendor_id() != VENDOR_ID || info.product_id() != PRODUCT_ID {
                continue;
            }
            // hidapi does not expose HID report descriptors portably; the
            // bus type decides the framing instead.
            let reports = match info.bus_type() {
                BusType::Bluetooth => ReportLengths {
                    input: INPUT_REPORT_BT_LEN as u16,
                    output: OUTPUT_REPORT_BT_LEN as u16,
                },
                _ => ReportLengths {
                    input: INPUT_REPORT_USB_LEN as u16,
                    output: OUTPUT_REPORT_USB_LEN as u16,
                },
            };
            found.push(DeviceDescriptor {
                path: info.path().to_string_lossy().into_owned(),
                reports,
            });
        }
        log::trace!("hidapi enumeration found {} controller(s)", found.len());

        Ok(found)
    }

    fn open(&mut self, path: &str) -> Result<HidDevice, TransportError> {
        let c_path =
            CString::new(path).map_err(|err| TransportError::Backend(Box::new(err)))?;
        self.api.open_path(&c_path).map_err(backend)
    }

    fn read(
        &mut self,
        device: &mut HidDevice,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError> {
        let millis = timeout.as_millis().min(i32::MAX as u128) as i32;
        match device.read_timeout(buf, millis) {
            Ok(0) => Err(TransportError::TimedOut),
            Ok(read) => Ok(read),
            Err(err) => {
                // A failed read on an open handle almost always means the
                // device went away; report it as such so the manager re-arms
                // enumeration.
                log::debug!("hid read failed: {err}");
                Err(TransportError::Disconnected)
            }
        }
    }

    fn write(&mut self, device: &mut HidDevice, buf: &[u8]) -> Result<(), TransportError> {
        match device.write(buf) {
            Ok(_written) => Ok(()),
            Err(err) => {
                log::debug!("hid write failed: {err}");
                Err(TransportError::Disconnected)
            }
        }
    }

    fn flush(&mut self, device: &mut HidDevice) -> Result<(), TransportError> {
        // Drain whatever the HID stack has queued; a zero-length read means
        // the queue is empty.
        let mut scratch = [0u8; INPUT_REPORT_BT_LEN];
        for _ in 0..8 {
            match device.read_timeout(&mut scratch, 0) {
                Ok(0) => break,
                Ok(_stale) => continue,
                Err(err) => {
                    log::debug!("hid flush failed: {err}");
                    return Err(TransportError::Disconnected);
                }
            }
        }
        Ok(())
    }

    fn watch(&mut self, hotplug: HotplugFlag) -> Result<(), TransportError> {
        self.hotplug = Some(hotplug);
        Ok(())
    }
}
