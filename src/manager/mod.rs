//! Connection lifecycle and the public controller facade.

mod exchange;

use crate::error::Error;
use crate::registry::{Handle, HandleMap};
use crate::report::output::{ChangeFlags2, ChangeFlags3, LightbarPulse, OutputReport};
use crate::report::InputSnapshot;
use crate::transport::{DeviceDescriptor, HotplugFlag, ReportLengths, Transport, TransportError};

type ConnectedCallback<U> = Box<dyn FnMut(Handle, &mut Option<U>)>;
type DisconnectedCallback<U> = Box<dyn FnMut(Handle, Option<U>)>;

/// Per-device state tracked across enumerations. The stable path is the
/// identity key; dropping the record closes the device handle.
struct ConnectionRecord<D, U> {
    path: String,
    device: D,
    reports: ReportLengths,
    cache: Option<InputSnapshot>,
    user_data: Option<U>,
}

/// Controller manager: owns the transport, the connection registry and the
/// connect/disconnect callbacks.
///
/// Single-owner by contract: one poll thread calls [Manager::tick],
/// [Manager::controller_input] and [Manager::set_controller_output] in a
/// loop. The only cross-thread interaction is [HotplugFlag::raise], which
/// may be called from anywhere, any number of times; pending raises collapse
/// into a single reconciliation on the next tick.
///
/// `U` is caller-owned per-controller data. It is seeded in the connect
/// callback (or via [Manager::set_user_data]) and handed back, owned, in the
/// disconnect callback.
///
/// Dropping the manager is shutdown: every open device handle and the
/// notification registration go with it. A new manager can be created
/// afterwards.
pub struct Manager<T: Transport, U = ()> {
    transport: T,
    connections: HandleMap<ConnectionRecord<T::Device, U>>,
    connected: Vec<Handle>,
    hotplug: HotplugFlag,
    on_connected: Option<ConnectedCallback<U>>,
    on_disconnected: Option<DisconnectedCallback<U>>,
}

impl<T: Transport, U> Manager<T, U> {
    /// Create a manager and register for hot-plug notifications.
    ///
    /// The flag starts raised, so the first [Manager::tick] always
    /// enumerates.
    pub fn new(mut transport: T) -> Result<Self, Error> {
        let hotplug = HotplugFlag::armed();
        transport
            .watch(hotplug.clone())
            .map_err(Error::NotificationRegister)?;

        Ok(Self {
            transport,
            connections: HandleMap::new(),
            connected: Vec::new(),
            hotplug,
            on_connected: None,
            on_disconnected: None,
        })
    }

    /// The shared re-enumeration request. Raise it from a platform device
    /// watcher to pick up connects and disconnects on the next tick.
    pub fn hotplug(&self) -> HotplugFlag {
        self.hotplug.clone()
    }

    /// Process a pending hot-plug notification, if any.
    ///
    /// Runs at most one reconciliation no matter how many notifications
    /// arrived since the last tick.
    pub fn tick(&mut self) -> Result<(), Error> {
        if self.hotplug.take() {
            self.reconcile()?;
        }
        Ok(())
    }

    /// Currently connected controllers, in connection order. Handles stay
    /// valid until the disconnect callback for them returns.
    pub fn available_controllers(&self) -> &[Handle] {
        &self.connected
    }

    pub fn user_data(&self, controller: Handle) -> Result<Option<&U>, Error> {
        let record = self
            .connections
            .get(controller)
            .ok_or(Error::ControllerNotFound)?;
        Ok(record.user_data.as_ref())
    }

    pub fn user_data_mut(&mut self, controller: Handle) -> Result<Option<&mut U>, Error> {
        let record = self
            .connections
            .get_mut(controller)
            .ok_or(Error::ControllerNotFound)?;
        Ok(record.user_data.as_mut())
    }

    /// Attach caller data to a controller, returning the previous value.
    pub fn set_user_data(&mut self, controller: Handle, user_data: U) -> Result<Option<U>, Error> {
        let record = self
            .connections
            .get_mut(controller)
            .ok_or(Error::ControllerNotFound)?;
        Ok(record.user_data.replace(user_data))
    }

    /// Set the callback invoked synchronously when a controller connects.
    /// The second argument is the connection's user-data slot.
    pub fn on_controller_connected(
        &mut self,
        callback: impl FnMut(Handle, &mut Option<U>) + 'static,
    ) {
        self.on_connected = Some(Box::new(callback));
    }

    pub fn clear_controller_connected(&mut self) {
        self.on_connected = None;
    }

    /// Set the callback invoked synchronously when a controller disconnects.
    /// Receives ownership of whatever user data was set for the connection.
    pub fn on_controller_disconnected(
        &mut self,
        callback: impl FnMut(Handle, Option<U>) + 'static,
    ) {
        self.on_disconnected = Some(Box::new(callback));
    }

    pub fn clear_controller_disconnected(&mut self) {
        self.on_disconnected = None;
    }

    /// Reconcile the tracked set against a fresh enumeration: open and
    /// announce new candidates, then drop and announce everything that
    /// disappeared. Notifications never overlap, and no operation on a
    /// handle follows its disconnect notification.
    fn reconcile(&mut self) -> Result<(), Error> {
        let candidates = self
            .transport
            .enumerate()
            .map_err(Error::DeviceEnumeration)?;
        log::trace!("enumeration found {} candidate(s)", candidates.len());

        let mut kept: Vec<Handle> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(handle) = self.find_by_path(&candidate.path) {
                kept.push(handle);
                continue;
            }
            match self.connect(candidate) {
                Ok(handle) => kept.push(handle),
                // Unopenable candidates are skipped; the next enumeration
                // retries them.
                Err(err) => log::warn!("failed to open candidate device: {err}"),
            }
        }

        let stale: Vec<Handle> = self
            .connections
            .iter()
            .map(|(handle, _)| handle)
            .filter(|handle| !kept.contains(handle))
            .collect();
        for handle in stale {
            self.disconnect(handle);
        }

        Ok(())
    }

    fn find_by_path(&self, path: &str) -> Option<Handle> {
        self.connections
            .iter()
            .find(|(_, record)| record.path == path)
            .map(|(handle, _)| handle)
    }

    fn connect(&mut self, candidate: DeviceDescriptor) -> Result<Handle, TransportError> {
        let device = self.transport.open(&candidate.path)?;
        let handle = self.connections.insert(ConnectionRecord {
            path: candidate.path,
            device,
            reports: candidate.reports,
            cache: None,
            user_data: None,
        });
        self.connected.push(handle);
        log::debug!("controller {handle} connected");

        // Take over LED control from the wireless firmware. The device
        // rejects this during the pairing animation, which is fine; the
        // caller can resend LED state later.
        if let Err(err) = self.set_controller_output(handle, &initial_report()) {
            log::warn!("initial report for {handle} failed: {err}");
        }

        if let Some(callback) = self.on_connected.as_mut() {
            if let Some(record) = self.connections.get_mut(handle) {
                callback(handle, &mut record.user_data);
            }
        }
        Ok(handle)
    }

    fn disconnect(&mut self, handle: Handle) {
        let user_data = self
            .connections
            .get_mut(handle)
            .and_then(|record| record.user_data.take());
        if let Some(callback) = self.on_disconnected.as_mut() {
            callback(handle, user_data);
        }

        self.connected.retain(|connected| *connected != handle);
        // Dropping the record closes the device handle.
        self.connections.remove(handle);
        log::debug!("controller {handle} disconnected");
    }
}

/// First report sent to a fresh connection: release the LEDs from firmware
/// control and fade out the pairing-blue pulse.
fn initial_report() -> OutputReport {
    let mut report = OutputReport::default();
    report.flags2 = ChangeFlags2::MIC_LED_TOGGLE | ChangeFlags2::LED_STRIP_TOGGLE;
    report.flags3 = ChangeFlags3::UNINTERRUPTABLE_LED;
    report.lightbar_pulse = LightbarPulse::FadeOutBlue;
    report
}
