//! Bounded-retry report reads and output writes.

use std::time::Duration;

use crate::error::Error;
use crate::registry::Handle;
use crate::report::{InputSnapshot, OutputReport, TransportKind, INPUT_REPORT_BT_LEN};
use crate::transport::{Transport, TransportError};

use super::Manager;

/// How many reads a single [Manager::controller_input] call may issue.
/// Bounding this keeps worst-case poll latency predictable.
const MAX_READ_ATTEMPTS: usize = 10;
/// Per-attempt read timeout.
const READ_TIMEOUT: Duration = Duration::from_millis(2);

impl<T: Transport, U> Manager<T, U> {
    /// Read and decode the controller's current input state.
    ///
    /// Bluetooth controllers interleave other report ids with real input
    /// state; attempts that surface a foreign id or time out are retried, up
    /// to [MAX_READ_ATTEMPTS]. When every attempt misses, the last good
    /// snapshot is returned instead, and [Error::Timeout] only when none has
    /// been captured yet. A fresh report always overwrites the cache.
    pub fn controller_input(&mut self, controller: Handle) -> Result<InputSnapshot, Error> {
        let record = self
            .connections
            .get_mut(controller)
            .ok_or(Error::ControllerNotFound)?;
        let kind = TransportKind::from_input_len(record.reports.input)
            .ok_or(Error::UnknownInputReport(record.reports.input as usize))?;

        let mut buf = [0u8; INPUT_REPORT_BT_LEN];
        let report = &mut buf[..kind.input_len()];
        for _ in 0..MAX_READ_ATTEMPTS {
            match self.transport.read(&mut record.device, report, READ_TIMEOUT) {
                Ok(_read) => {
                    if report[0] == kind.input_report_id() {
                        let snapshot = InputSnapshot::decode(report, kind)?;
                        record.cache = Some(snapshot);
                        return Ok(snapshot);
                    }
                    log::trace!("skipping report id {:#04x} from {controller}", report[0]);
                }
                Err(TransportError::TimedOut) => {
                    // Stale queued reports can wedge a Bluetooth controller
                    // that dropped without the OS noticing; flush before the
                    // next attempt.
                    let _ = self.transport.flush(&mut record.device);
                }
                Err(err) => {
                    if matches!(err, TransportError::Disconnected) {
                        let _ = self.transport.flush(&mut record.device);
                        self.hotplug.raise();
                    }
                    return Err(Error::Communication(err));
                }
            }
        }

        if let Some(snapshot) = record.cache {
            return Ok(snapshot);
        }
        Err(Error::Timeout)
    }

    /// Encode and send an output report to the controller.
    pub fn set_controller_output(
        &mut self,
        controller: Handle,
        output: &OutputReport,
    ) -> Result<(), Error> {
        let record = self
            .connections
            .get_mut(controller)
            .ok_or(Error::ControllerNotFound)?;
        let kind = TransportKind::from_input_len(record.reports.input)
            .ok_or(Error::UnknownInputReport(record.reports.input as usize))?;

        let buf = output.encode(kind);
        match self.transport.write(&mut record.device, &buf) {
            Ok(()) => Ok(()),
            Err(TransportError::Disconnected) => {
                // The record is stale; arm a re-enumeration so the next tick
                // drops it.
                self.hotplug.raise();
                Err(Error::Communication(TransportError::Disconnected))
            }
            Err(err) => Err(Error::Communication(err)),
        }
    }
}
