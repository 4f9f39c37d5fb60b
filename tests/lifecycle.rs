//! End-to-end exercise of the public facade with a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use sensewire::{
    DeviceDescriptor, Error, Manager, OutputReport, ReportLengths, Rgb, Transport, TransportError,
    TriggerEffect,
};

const BT_REPORTS: ReportLengths = ReportLengths {
    input: 78,
    output: 574,
};

#[derive(Default)]
struct ScriptState {
    devices: Vec<DeviceDescriptor>,
    reads: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
}

#[derive(Clone, Default)]
struct ScriptedTransport {
    state: Rc<RefCell<ScriptState>>,
}

impl Transport for ScriptedTransport {
    type Device = String;

    fn enumerate(&mut self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        Ok(self.state.borrow().devices.clone())
    }

    fn open(&mut self, path: &str) -> Result<String, TransportError> {
        Ok(path.to_string())
    }

    fn read(
        &mut self,
        _device: &mut String,
        buf: &mut [u8],
        _timeout: Duration,
    ) -> Result<usize, TransportError> {
        match self.state.borrow_mut().reads.pop_front() {
            Some(report) => {
                let len = report.len().min(buf.len());
                buf[..len].copy_from_slice(&report[..len]);
                Ok(len)
            }
            None => Err(TransportError::TimedOut),
        }
    }

    fn write(&mut self, _device: &mut String, buf: &[u8]) -> Result<(), TransportError> {
        self.state.borrow_mut().writes.push(buf.to_vec());
        Ok(())
    }

    fn flush(&mut self, _device: &mut String) -> Result<(), TransportError> {
        Ok(())
    }

    fn watch(&mut self, _hotplug: sensewire::HotplugFlag) -> Result<(), TransportError> {
        Ok(())
    }
}

fn bt_input_report(left_stick_x: u8) -> Vec<u8> {
    let mut buf = vec![0u8; 78];
    buf[0] = 0x31;
    buf[2] = left_stick_x;
    buf[2 + 7] = 0x08; // hat released
    buf
}

#[test]
fn connect_read_write_disconnect_roundtrip() -> Result<(), Error> {
    let transport = ScriptedTransport::default();
    transport.state.borrow_mut().devices = vec![DeviceDescriptor {
        path: "bt-0".to_string(),
        reports: BT_REPORTS,
    }];

    let mut manager: Manager<ScriptedTransport, String> = Manager::new(transport.clone())?;

    let disconnected: Rc<RefCell<Vec<Option<String>>>> = Rc::new(RefCell::new(Vec::new()));
    let probe = disconnected.clone();
    manager.on_controller_connected(|_handle, user_data| {
        *user_data = Some("player one".to_string());
    });
    manager.on_controller_disconnected(move |_handle, user_data| {
        probe.borrow_mut().push(user_data);
    });

    // the manager starts armed; the first tick connects the controller
    manager.tick()?;
    assert_eq!(manager.available_controllers().len(), 1);
    let controller = manager.available_controllers()[0];
    assert_eq!(
        manager.user_data(controller)?,
        Some(&"player one".to_string())
    );

    // read decodes the queued report and caches it
    transport.state.borrow_mut().reads.push_back(bt_input_report(99));
    let input = manager.controller_input(controller)?;
    assert_eq!(input.left_stick.x, 99);

    // an empty queue falls back to the cached snapshot
    let cached = manager.controller_input(controller)?;
    assert_eq!(cached, input);

    // output writes carry the Bluetooth framing
    let mut output = OutputReport::new();
    output
        .set_led_color(Rgb { r: 1, g: 2, b: 3 })
        .set_right_trigger(TriggerEffect::feedback(3, 4)?);
    manager.set_controller_output(controller, &output)?;
    let last_write = transport.state.borrow().writes.last().unwrap().clone();
    assert_eq!(last_write.len(), 574);
    assert_eq!(last_write[0], 0x31);

    // unplug: the next armed tick hands the user data back
    transport.state.borrow_mut().devices.clear();
    manager.hotplug().raise();
    manager.tick()?;
    assert!(manager.available_controllers().is_empty());
    assert_eq!(*disconnected.borrow(), vec![Some("player one".to_string())]);
    assert!(matches!(
        manager.controller_input(controller),
        Err(Error::ControllerNotFound)
    ));

    Ok(())
}
