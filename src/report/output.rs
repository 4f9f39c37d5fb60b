//! Output report intent and its wire encodings.
//!
//! The device applies only the fields whose change bits are raised; a byte
//! that still holds a value from an earlier report is ignored unless its
//! group's bit is set again. Every setter here raises the matching bits
//! itself, so built intents are always self-consistent.

use bitflags::bitflags;

use super::crc32::{crc32, BT_CRC_SEED};
use super::trigger::TriggerEffect;
use super::{
    TransportKind, BT_CRC_OFFSET, BT_OUTPUT_MODE_DS5, OUTPUT_PAYLOAD_LEN, OUTPUT_REPORT_BT,
    OUTPUT_REPORT_BT_LEN, OUTPUT_REPORT_USB, OUTPUT_REPORT_USB_LEN,
};

bitflags! {
    /// First change-flag group: haptics, trigger effects and audio routing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags1: u8 {
        /// Both motor-enable bits. With only the low bit the rumble fades out
        /// gracefully before audio haptics resume; with neither bit the motor
        /// values are ignored entirely.
        const ENABLE_HAPTICS = 0x01 | 0x02;
        const RIGHT_TRIGGER_EFFECT = 0x04;
        const LEFT_TRIGGER_EFFECT = 0x08;
        const AUDIO_VOLUME_CHANGE = 0x10;
        const SPEAKER_TOGGLE = 0x20;
        const MIC_VOLUME_CHANGE = 0x40;
    }

    /// Second change-flag group: LEDs, mute and motor power.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags2: u8 {
        const MIC_LED_TOGGLE = 0x01;
        const FULL_MUTE_TOGGLE = 0x02;
        const LED_STRIP_TOGGLE = 0x04;
        const ALL_LEDS_OFF = 0x08;
        const PLAYER_INDICATOR_TOGGLE = 0x10;
        const MOTOR_POWER_CHANGE = 0x40;
    }

    /// Third change-flag group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeFlags3: u8 {
        const LED_BRIGHTNESS = 0x01;
        /// Uninterruptable blue LED pulse; required for
        /// [LightbarPulse::FadeOutBlue].
        const UNINTERRUPTABLE_LED = 0x02;
        /// Improved rumble emulation, firmware 2.24 or newer.
        const IMPROVED_RUMBLE = 0x04;
    }

    /// Audio routing flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AudioFlags: u8 {
        /// Force the internal mic; without either force bit an attached
        /// headset takes precedence.
        const FORCE_INTERNAL_MIC = 0x01;
        /// Force the mic attached to the controller (headset).
        const FORCE_HEADSET_MIC = 0x02;
        const PAD_LEFT_HEADSET_MIC = 0x04;
        const PAD_LEFT_INTERNAL_MIC = 0x08;
        /// Only honored together with [Self::ENABLE_SPEAKER].
        const DISABLE_HEADPHONES = 0x10;
        /// Play on the internal speaker in addition to a connected headset;
        /// the headset gets a stereo upmix of the left channel, the speaker
        /// plays the right.
        const ENABLE_SPEAKER = 0x20;
    }

    /// Mute targets for the full-mute toggle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AudioMute: u8 {
        const MIC = 0x10;
        const AUDIO = 0x40;
    }

    /// Player indicator LEDs below the touchpad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlayerLedFlags: u8 {
        const CENTER = 0b00100;
        const INNER = 0b01010;
        const OUTER = 0b10001;
    }
}

/// Mute button LED behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MicLedMode {
    #[default]
    Off = 0,
    On = 1,
    Pulsating = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum PlayerLedBrightness {
    #[default]
    High = 0,
    Medium = 1,
    Low = 2,
}

/// Lightbar pulse animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum LightbarPulse {
    #[default]
    Off = 0,
    /// Fade in the blue color over roughly two seconds.
    FadeInBlue = 1,
    /// Fade out and switch back to the configured lightbar color. Needs
    /// [ChangeFlags3::UNINTERRUPTABLE_LED] to take effect.
    FadeOutBlue = 2,
}

/// Lightbar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Accumulated output state for one controller.
///
/// Built incrementally; unset fields keep their zero bytes and stay
/// unflagged, so the device leaves the corresponding hardware state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputReport {
    pub flags1: ChangeFlags1,
    pub flags2: ChangeFlags2,
    pub right_motor: u8,
    pub left_motor: u8,
    pub headphone_volume: u8,
    pub speaker_volume: u8,
    pub mic_volume: u8,
    pub audio_flags: AudioFlags,
    pub mic_led: MicLedMode,
    pub audio_mute: AudioMute,
    pub right_trigger: TriggerEffect,
    pub left_trigger: TriggerEffect,
    /// High nibble muffles trigger effects, low nibble the main motors, in
    /// 12.5% increments.
    pub haptics_muffle: u8,
    pub flags3: ChangeFlags3,
    pub lightbar_pulse: LightbarPulse,
    pub led_brightness: PlayerLedBrightness,
    pub player_leds: PlayerLedFlags,
    pub lightbar_color: Rgb,
}

impl OutputReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rumble level for the right (light) motor.
    pub fn set_right_motor(&mut self, value: u8) -> &mut Self {
        self.flags1 |= ChangeFlags1::ENABLE_HAPTICS;
        self.flags2 |= ChangeFlags2::MOTOR_POWER_CHANGE;
        self.right_motor = value;
        self
    }

    /// Rumble level for the left (heavy) motor.
    pub fn set_left_motor(&mut self, value: u8) -> &mut Self {
        self.flags1 |= ChangeFlags1::ENABLE_HAPTICS;
        self.flags2 |= ChangeFlags2::MOTOR_POWER_CHANGE;
        self.left_motor = value;
        self
    }

    pub fn set_left_trigger(&mut self, effect: TriggerEffect) -> &mut Self {
        self.flags1 |= ChangeFlags1::LEFT_TRIGGER_EFFECT;
        self.left_trigger = effect;
        self
    }

    pub fn set_right_trigger(&mut self, effect: TriggerEffect) -> &mut Self {
        self.flags1 |= ChangeFlags1::RIGHT_TRIGGER_EFFECT;
        self.right_trigger = effect;
        self
    }

    pub fn set_headphone_volume(&mut self, volume: u8) -> &mut Self {
        self.flags1 |= ChangeFlags1::AUDIO_VOLUME_CHANGE;
        self.headphone_volume = volume;
        self
    }

    pub fn set_speaker_volume(&mut self, volume: u8) -> &mut Self {
        self.flags1 |= ChangeFlags1::AUDIO_VOLUME_CHANGE;
        self.speaker_volume = volume;
        self
    }

    /// Mic gain. Not linear; saturates at 0x40. Zero is not fully muted, use
    /// [Self::mute_mic] for that.
    pub fn set_mic_volume(&mut self, volume: u8) -> &mut Self {
        self.flags1 |= ChangeFlags1::AUDIO_VOLUME_CHANGE | ChangeFlags1::MIC_VOLUME_CHANGE;
        self.mic_volume = volume;
        self
    }

    pub fn set_audio_flags(&mut self, flags: AudioFlags) -> &mut Self {
        self.flags1 |= ChangeFlags1::AUDIO_VOLUME_CHANGE
            | ChangeFlags1::MIC_VOLUME_CHANGE
            | ChangeFlags1::SPEAKER_TOGGLE;
        self.audio_flags = flags;
        self
    }

    pub fn set_mic_led(&mut self, mode: MicLedMode) -> &mut Self {
        self.flags2 |= ChangeFlags2::MIC_LED_TOGGLE;
        self.mic_led = mode;
        self
    }

    /// Mute the active mic, built-in or headset.
    pub fn mute_mic(&mut self, mute: bool) -> &mut Self {
        self.flags1 |= ChangeFlags1::MIC_VOLUME_CHANGE;
        self.flags2 |= ChangeFlags2::FULL_MUTE_TOGGLE;
        self.audio_mute.set(AudioMute::MIC, mute);
        self
    }

    /// Mute audio output, speaker or headphones.
    pub fn mute_audio(&mut self, mute: bool) -> &mut Self {
        self.flags1 |= ChangeFlags1::AUDIO_VOLUME_CHANGE;
        self.flags2 |= ChangeFlags2::FULL_MUTE_TOGGLE;
        self.audio_mute.set(AudioMute::AUDIO, mute);
        self
    }

    pub fn set_led_brightness(&mut self, brightness: PlayerLedBrightness) -> &mut Self {
        self.flags2 |= ChangeFlags2::LED_STRIP_TOGGLE;
        self.led_brightness = brightness;
        self
    }

    pub fn set_player_leds(&mut self, leds: PlayerLedFlags) -> &mut Self {
        self.flags2 |= ChangeFlags2::PLAYER_INDICATOR_TOGGLE;
        self.player_leds = leds;
        self
    }

    pub fn set_led_color(&mut self, color: Rgb) -> &mut Self {
        self.flags2 |= ChangeFlags2::LED_STRIP_TOGGLE | ChangeFlags2::PLAYER_INDICATOR_TOGGLE;
        self.lightbar_color = color;
        self
    }

    /// Build the transport-specific report buffer, sized exactly for `kind`.
    pub fn encode(&self, kind: TransportKind) -> Vec<u8> {
        let payload = self.pack_payload();
        match kind {
            TransportKind::Usb => {
                let mut buf = Vec::with_capacity(OUTPUT_REPORT_USB_LEN);
                buf.push(OUTPUT_REPORT_USB);
                buf.extend_from_slice(&payload);
                buf
            }
            TransportKind::Bluetooth => {
                let mut buf = vec![0u8; OUTPUT_REPORT_BT_LEN];
                buf[0] = OUTPUT_REPORT_BT;
                buf[1] = BT_OUTPUT_MODE_DS5;
                buf[2..2 + OUTPUT_PAYLOAD_LEN].copy_from_slice(&payload);
                let crc = crc32(BT_CRC_SEED, &buf[..BT_CRC_OFFSET]);
                buf[BT_CRC_OFFSET..BT_CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());
                buf
            }
        }
    }

    fn pack_payload(&self) -> [u8; OUTPUT_PAYLOAD_LEN] {
        let mut buf = [0u8; OUTPUT_PAYLOAD_LEN];
        buf[0] = self.flags1.bits();
        buf[1] = self.flags2.bits();
        buf[2] = self.right_motor;
        buf[3] = self.left_motor;
        buf[4] = self.headphone_volume;
        buf[5] = self.speaker_volume;
        buf[6] = self.mic_volume;
        buf[7] = self.audio_flags.bits();
        buf[8] = self.mic_led as u8;
        buf[9] = self.audio_mute.bits();
        self.right_trigger.pack_into(&mut buf[10..21]);
        self.left_trigger.pack_into(&mut buf[21..32]);
        // bytes 32-35 reserved
        buf[36] = self.haptics_muffle;
        // byte 37 reserved
        buf[38] = self.flags3.bits();
        // bytes 39-40 reserved
        buf[41] = self.lightbar_pulse as u8;
        buf[42] = self.led_brightness as u8;
        buf[43] = self.player_leds.bits();
        buf[44] = self.lightbar_color.r;
        buf[45] = self.lightbar_color.g;
        buf[46] = self.lightbar_color.b;
        buf
    }
}
