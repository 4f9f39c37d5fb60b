//! Host-side driver for Sony DualSense controllers over USB and Bluetooth
//! HID.
//!
//! sensewire decodes the controller's bit-packed input reports into typed
//! [InputSnapshot]s, builds rumble / adaptive-trigger / LED / audio
//! [OutputReport]s back into the same wire protocol (including the checksum
//! Bluetooth framing requires), and tracks any number of simultaneously
//! connected controllers across hot-plug events.
//!
//! The [Manager] is the entry point. It is driven cooperatively: call
//! [Manager::tick] from a poll loop, then read and write through the handles
//! it hands out. OS device I/O sits behind the [Transport] trait;
//! [HidTransport] is the shipped `hidapi`-backed implementation.
//!
//! ```no_run
//! use sensewire::{HidTransport, Manager, OutputReport, Rgb};
//!
//! fn main() -> Result<(), sensewire::Error> {
//!     let transport = HidTransport::new().expect("hidapi should initialize");
//!     let mut manager: Manager<_, ()> = Manager::new(transport)?;
//!     manager.on_controller_connected(|handle, _user_data| {
//!         println!("controller {handle} connected");
//!     });
//!
//!     loop {
//!         manager.tick()?;
//!         for handle in manager.available_controllers().to_vec() {
//!             let input = manager.controller_input(handle)?;
//!             let mut output = OutputReport::new();
//!             output.set_led_color(Rgb {
//!                 r: input.l2,
//!                 g: 255,
//!                 b: input.r2,
//!             });
//!             manager.set_controller_output(handle, &output)?;
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod registry;
pub mod report;
pub mod transport;

pub use error::Error;
pub use manager::Manager;
pub use registry::{Handle, HandleMap};
pub use report::input::{
    Battery, Buttons, DeviceFlags, HatSwitch, InputSnapshot, Rotation, StickPos, TouchPoint,
    TriggerFeedback, Vector3,
};
pub use report::output::{
    AudioFlags, AudioMute, ChangeFlags1, ChangeFlags2, ChangeFlags3, LightbarPulse, MicLedMode,
    OutputReport, PlayerLedBrightness, PlayerLedFlags, Rgb,
};
pub use report::{TransportKind, TriggerEffect, TriggerMode, PRODUCT_ID, VENDOR_ID};
pub use transport::{
    DeviceDescriptor, HidTransport, HotplugFlag, ReportLengths, Transport, TransportError,
};
