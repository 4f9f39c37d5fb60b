//! Device I/O boundary between the manager and the OS HID stack.

use std::error::Error as StdError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub mod hid;

pub use hid::HidTransport;

/// Failures produced by a [Transport] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The operation did not complete in time.
    #[error("operation timed out")]
    TimedOut,
    /// The device is no longer connected.
    #[error("device is no longer connected")]
    Disconnected,
    /// Anything else the backing HID stack reports.
    #[error(transparent)]
    Backend(Box<dyn StdError + Send + Sync>),
}

/// Input/output report byte lengths the HID stack advertises for a device.
///
/// The input length is what selects USB or Bluetooth framing for a
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLengths {
    pub input: u16,
    pub output: u16,
}

/// A candidate controller surfaced by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Stable identity across enumerations.
    pub path: String,
    pub reports: ReportLengths,
}

/// Coalescing re-enumeration request shared with hot-plug sources.
///
/// [HotplugFlag::raise] may be called from any thread; raises arriving
/// before the next manager tick collapse into a single reconciliation.
#[derive(Debug, Clone, Default)]
pub struct HotplugFlag(Arc<AtomicBool>);

impl HotplugFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that is already raised, so the first consumer run fires.
    pub(crate) fn armed() -> Self {
        let flag = Self::default();
        flag.raise();
        flag
    }

    /// Request a re-enumeration on the next manager tick.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the pending request, if any.
    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::Acquire)
    }
}

/// The OS-facing collaborator: device discovery, open, and raw report I/O.
///
/// Implementations do not track controller identity or framing; the manager
/// owns that. They only move bytes and surface candidates.
pub trait Transport {
    /// Open device handle. Dropping it must release the OS resources.
    type Device;

    /// List candidate controllers currently present.
    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open a candidate by its stable path.
    fn open(&mut self, path: &str) -> Result<Self::Device, TransportError>;

    /// Read one report into `buf`, waiting at most `timeout`.
    fn read(
        &mut self,
        device: &mut Self::Device,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, TransportError>;

    /// Send one report.
    fn write(&mut self, device: &mut Self::Device, buf: &[u8]) -> Result<(), TransportError>;

    /// Drop any input reports queued by the HID stack.
    fn flush(&mut self, device: &mut Self::Device) -> Result<(), TransportError>;

    /// Register the flag the transport should raise on device arrival or
    /// removal, if it can observe those events.
    fn watch(&mut self, hotplug: HotplugFlag) -> Result<(), TransportError>;
}
