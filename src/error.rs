use thiserror::Error;

use crate::transport::TransportError;

/// Failures surfaced by the manager and the wire codec.
///
/// None of these are fatal to the process; every operation returns a result
/// the caller is expected to inspect.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was out of range or otherwise unusable.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    /// Registering for hot-plug notifications failed during initialization.
    #[error("failed to register device notifications")]
    NotificationRegister(#[source] TransportError),
    /// Device enumeration failed during reconciliation.
    #[error("device enumeration failed")]
    DeviceEnumeration(#[source] TransportError),
    /// The handle is unknown, stale, or its controller has disconnected.
    #[error("controller not found")]
    ControllerNotFound,
    /// I/O against the device failed, on either transport.
    #[error("device communication failed")]
    Communication(#[source] TransportError),
    /// The report byte length matches no known framing.
    #[error("unrecognized input report length {0}")]
    UnknownInputReport(usize),
    /// The bounded read window ended without a usable report.
    #[error("report read timed out")]
    Timeout,
}
