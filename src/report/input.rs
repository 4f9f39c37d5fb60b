//! Input report structures and the decoded controller snapshot.

use bitflags::bitflags;
use packed_struct::prelude::*;

use crate::error::Error;

use super::{TransportKind, INPUT_REPORT_BT, INPUT_REPORT_BT_LEN, INPUT_REPORT_USB, INPUT_REPORT_USB_LEN};

bitflags! {
    /// Currently pressed buttons.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const SQUARE = 1 << 0;
        const CROSS = 1 << 1;
        const CIRCLE = 1 << 2;
        const TRIANGLE = 1 << 3;
        const L1 = 1 << 4;
        const R1 = 1 << 5;
        const L2 = 1 << 6;
        const R2 = 1 << 7;
        const CREATE = 1 << 8;
        const OPTIONS = 1 << 9;
        const L3 = 1 << 10;
        const R3 = 1 << 11;
        const PS = 1 << 12;
        const TOUCHPAD = 1 << 13;
        const MUTE = 1 << 14;
    }

    /// Directional pad state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HatSwitch: u8 {
        const UP = 1 << 0;
        const RIGHT = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
    }

    /// Peripheral and charge status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceFlags: u8 {
        const HEADPHONES_CONNECTED = 1 << 0;
        const MIC_CONNECTED = 1 << 1;
        const BATTERY_CHARGING = 1 << 2;
    }
}

/// Hat codes 0..=7 run clockwise from north; 8..=15 mean released.
const HAT_DIRECTIONS: [HatSwitch; 8] = [
    HatSwitch::UP,
    HatSwitch::UP.union(HatSwitch::RIGHT),
    HatSwitch::RIGHT,
    HatSwitch::RIGHT.union(HatSwitch::DOWN),
    HatSwitch::DOWN,
    HatSwitch::DOWN.union(HatSwitch::LEFT),
    HatSwitch::LEFT,
    HatSwitch::LEFT.union(HatSwitch::UP),
];

/// Stick position, 0..=255 per axis with 128 roughly centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StickPos {
    pub x: u8,
    pub y: u8,
}

/// Gyroscope reading in device-native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rotation {
    pub pitch: i16,
    pub yaw: i16,
    pub roll: i16,
}

/// Accelerometer reading in device-native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

/// One touchpad contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchPoint {
    pub touching: bool,
    /// Increments on every new press, wraps within 7 bits.
    pub id: u8,
    /// 0..=1919
    pub x: u16,
    /// 0..=1079
    pub y: u16,
}

/// Positions reported back by active adaptive-trigger effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerFeedback {
    pub l2: u8,
    pub r2: u8,
}

/// Battery charge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Battery {
    /// 0..=100 in steps of 10.
    pub percent: u8,
    pub fully_charged: bool,
}

/// Decoded per-tick controller state.
///
/// Produced fresh by every successful read; the manager also keeps the most
/// recent one per connection as a fallback for reads that come up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub left_stick: StickPos,
    pub right_stick: StickPos,
    pub l2: u8,
    pub r2: u8,
    pub buttons: Buttons,
    pub hat: HatSwitch,
    pub gyro: Rotation,
    pub accel: Vector3,
    pub touch: [TouchPoint; 2],
    pub trigger_feedback: TriggerFeedback,
    pub battery: Battery,
    pub flags: DeviceFlags,
}

impl InputSnapshot {
    /// Decode a raw input report for the given framing.
    ///
    /// Fails with [Error::UnknownInputReport] when the buffer length matches
    /// neither known framing.
    pub fn decode(buf: &[u8], kind: TransportKind) -> Result<Self, Error> {
        match kind {
            TransportKind::Usb => {
                let bytes: &[u8; INPUT_REPORT_USB_LEN] = buf
                    .try_into()
                    .map_err(|_| Error::UnknownInputReport(buf.len()))?;
                let report = UsbInputReport::unpack(bytes)
                    .map_err(|_| Error::UnknownInputReport(buf.len()))?;
                Ok(Self::from_payload(&report.payload))
            }
            TransportKind::Bluetooth => {
                let bytes: &[u8; INPUT_REPORT_BT_LEN] = buf
                    .try_into()
                    .map_err(|_| Error::UnknownInputReport(buf.len()))?;
                let report = BluetoothInputReport::unpack(bytes)
                    .map_err(|_| Error::UnknownInputReport(buf.len()))?;
                Ok(Self::from_payload(&report.payload))
            }
        }
    }

    fn from_payload(payload: &InputPayload) -> Self {
        let mut buttons = Buttons::empty();
        buttons.set(Buttons::SQUARE, payload.square);
        buttons.set(Buttons::CROSS, payload.cross);
        buttons.set(Buttons::CIRCLE, payload.circle);
        buttons.set(Buttons::TRIANGLE, payload.triangle);
        buttons.set(Buttons::L1, payload.l1);
        buttons.set(Buttons::R1, payload.r1);
        buttons.set(Buttons::L2, payload.l2_pressed);
        buttons.set(Buttons::R2, payload.r2_pressed);
        buttons.set(Buttons::CREATE, payload.create);
        buttons.set(Buttons::OPTIONS, payload.options);
        buttons.set(Buttons::L3, payload.l3);
        buttons.set(Buttons::R3, payload.r3);
        buttons.set(Buttons::PS, payload.ps);
        buttons.set(Buttons::TOUCHPAD, payload.touchpad);
        buttons.set(Buttons::MUTE, payload.mute);

        let hat = HAT_DIRECTIONS
            .get(payload.hat_code.to_primitive() as usize)
            .copied()
            .unwrap_or(HatSwitch::empty());

        let mut flags = DeviceFlags::empty();
        flags.set(DeviceFlags::HEADPHONES_CONNECTED, payload.headphones_connected);
        flags.set(DeviceFlags::MIC_CONNECTED, payload.mic_connected);
        flags.set(DeviceFlags::BATTERY_CHARGING, payload.battery_charging);

        Self {
            left_stick: StickPos {
                x: payload.left_stick_x,
                y: payload.left_stick_y,
            },
            right_stick: StickPos {
                x: payload.right_stick_x,
                y: payload.right_stick_y,
            },
            l2: payload.l2_axis,
            r2: payload.r2_axis,
            buttons,
            hat,
            gyro: Rotation {
                pitch: payload.gyro_pitch.to_primitive(),
                yaw: payload.gyro_yaw.to_primitive(),
                roll: payload.gyro_roll.to_primitive(),
            },
            accel: Vector3 {
                x: payload.accel_x.to_primitive(),
                y: payload.accel_y.to_primitive(),
                z: payload.accel_z.to_primitive(),
            },
            touch: [
                decode_touch_point(&payload.touch.points[0]),
                decode_touch_point(&payload.touch.points[1]),
            ],
            trigger_feedback: TriggerFeedback {
                l2: payload.left_trigger_feedback,
                r2: payload.right_trigger_feedback,
            },
            battery: Battery {
                percent: payload.battery_level.to_primitive() * 10,
                fully_charged: payload.charge_complete,
            },
            flags,
        }
    }
}

fn decode_touch_point(data: &TouchPointData) -> TouchPoint {
    TouchPoint {
        touching: data.is_touching(),
        id: data.press_id.to_primitive(),
        x: data.x(),
        y: data.y(),
    }
}

/// One 4-byte touchpad contact as carried on the wire. The 12-bit X and Y
/// coordinates share the middle byte.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct TouchPointData {
    #[packed_field(bits = "0")]
    pub released: bool,
    #[packed_field(bits = "1..=7")]
    pub press_id: Integer<u8, packed_bits::Bits<7>>,
    #[packed_field(bytes = "1")]
    pub x_lo: u8,
    #[packed_field(bits = "16..=19")]
    pub y_lo: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "20..=23")]
    pub x_hi: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bytes = "3")]
    pub y_hi: u8,
}

impl Default for TouchPointData {
    fn default() -> Self {
        Self {
            released: true,
            press_id: Default::default(),
            x_lo: Default::default(),
            y_lo: Default::default(),
            x_hi: Default::default(),
            y_hi: Default::default(),
        }
    }
}

impl TouchPointData {
    pub fn is_touching(&self) -> bool {
        !self.released
    }

    pub fn x(&self) -> u16 {
        (self.x_hi.to_primitive() as u16) << 8 | self.x_lo as u16
    }

    pub fn y(&self) -> u16 {
        (self.y_hi as u16) << 4 | self.y_lo.to_primitive() as u16
    }
}

#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "8")]
pub struct TouchData {
    #[packed_field(element_size_bytes = "4")]
    pub points: [TouchPointData; 2],
}

/// The 63-byte input state block shared by both framings.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq, Default)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "63")]
pub struct InputPayload {
    // byte 0-5
    #[packed_field(bytes = "0")]
    pub left_stick_x: u8,
    #[packed_field(bytes = "1")]
    pub left_stick_y: u8,
    #[packed_field(bytes = "2")]
    pub right_stick_x: u8,
    #[packed_field(bytes = "3")]
    pub right_stick_y: u8,
    #[packed_field(bytes = "4")]
    pub l2_axis: u8,
    #[packed_field(bytes = "5")]
    pub r2_axis: u8,

    // byte 6
    #[packed_field(bytes = "6")]
    pub vendor_defined: u8,

    // byte 7
    #[packed_field(bits = "56")]
    pub triangle: bool,
    #[packed_field(bits = "57")]
    pub circle: bool,
    #[packed_field(bits = "58")]
    pub cross: bool,
    #[packed_field(bits = "59")]
    pub square: bool,
    #[packed_field(bits = "60..=63")]
    pub hat_code: Integer<u8, packed_bits::Bits<4>>,

    // byte 8
    #[packed_field(bits = "64")]
    pub r3: bool,
    #[packed_field(bits = "65")]
    pub l3: bool,
    #[packed_field(bits = "66")]
    pub options: bool,
    #[packed_field(bits = "67")]
    pub create: bool,
    #[packed_field(bits = "68")]
    pub r2_pressed: bool,
    #[packed_field(bits = "69")]
    pub l2_pressed: bool,
    #[packed_field(bits = "70")]
    pub r1: bool,
    #[packed_field(bits = "71")]
    pub l1: bool,

    // byte 9
    #[packed_field(bits = "72..=76")]
    pub _reserved_buttons: Integer<u8, packed_bits::Bits<5>>,
    #[packed_field(bits = "77")]
    pub mute: bool,
    #[packed_field(bits = "78")]
    pub touchpad: bool,
    #[packed_field(bits = "79")]
    pub ps: bool,

    // byte 10
    #[packed_field(bytes = "10")]
    pub _reserved0: u8,

    // byte 11-14
    #[packed_field(bytes = "11..=14", endian = "lsb")]
    pub timestamp: Integer<u32, packed_bits::Bits<32>>,

    // byte 15-26
    #[packed_field(bytes = "15..=16", endian = "lsb")]
    pub gyro_pitch: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "17..=18", endian = "lsb")]
    pub gyro_yaw: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "19..=20", endian = "lsb")]
    pub gyro_roll: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "21..=22", endian = "lsb")]
    pub accel_x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "23..=24", endian = "lsb")]
    pub accel_y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "25..=26", endian = "lsb")]
    pub accel_z: Integer<i16, packed_bits::Bits<16>>,

    // byte 27-30
    #[packed_field(bytes = "27..=30", endian = "lsb")]
    pub sensor_timestamp: Integer<u32, packed_bits::Bits<32>>,

    // byte 31
    #[packed_field(bytes = "31")]
    pub _reserved1: u8,

    // byte 32-39
    #[packed_field(bytes = "32..=39")]
    pub touch: TouchData,

    // byte 40
    #[packed_field(bytes = "40")]
    pub _reserved2: u8,

    // byte 41-42
    #[packed_field(bytes = "41")]
    pub left_trigger_feedback: u8,
    #[packed_field(bytes = "42")]
    pub right_trigger_feedback: u8,

    // byte 43-51
    #[packed_field(bytes = "43..=46", endian = "lsb")]
    pub _reserved_timestamp0: Integer<u32, packed_bits::Bits<32>>,
    #[packed_field(bytes = "47")]
    pub _reserved3: u8,
    #[packed_field(bytes = "48..=51", endian = "lsb")]
    pub _reserved_timestamp1: Integer<u32, packed_bits::Bits<32>>,

    // byte 52
    #[packed_field(bits = "416..=417")]
    pub _reserved_battery: Integer<u8, packed_bits::Bits<2>>,
    #[packed_field(bits = "418")]
    pub charge_complete: bool,
    #[packed_field(bits = "419")]
    pub _reserved_battery1: bool,
    #[packed_field(bits = "420..=423")]
    pub battery_level: Integer<u8, packed_bits::Bits<4>>,

    // byte 53
    #[packed_field(bits = "424..=427")]
    pub _reserved_flags: Integer<u8, packed_bits::Bits<4>>,
    #[packed_field(bits = "428")]
    pub battery_charging: bool,
    #[packed_field(bits = "429")]
    pub _reserved_flags1: bool,
    #[packed_field(bits = "430")]
    pub mic_connected: bool,
    #[packed_field(bits = "431")]
    pub headphones_connected: bool,

    // byte 54-62
    #[packed_field(bytes = "54..=62")]
    pub _reserved_tail: [u8; 9],
}

/// USB input report: id byte + state block.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "64")]
pub struct UsbInputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8, // always 0x01
    #[packed_field(bytes = "1..=63")]
    pub payload: InputPayload,
}

impl Default for UsbInputReport {
    fn default() -> Self {
        Self {
            report_id: INPUT_REPORT_USB,
            payload: Default::default(),
        }
    }
}

/// Bluetooth input report: id byte, sequence counter, state block, reserved
/// framing tail.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "78")]
pub struct BluetoothInputReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8, // always 0x31
    #[packed_field(bytes = "1")]
    pub sequence: u8,
    #[packed_field(bytes = "2..=64")]
    pub payload: InputPayload,
    #[packed_field(bytes = "65..=77")]
    pub _reserved: [u8; 13],
}

impl Default for BluetoothInputReport {
    fn default() -> Self {
        Self {
            report_id: INPUT_REPORT_BT,
            sequence: 0,
            payload: Default::default(),
            _reserved: [0; 13],
        }
    }
}
