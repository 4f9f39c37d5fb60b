use super::crc32::{crc32, BT_CRC_SEED};
use super::output::{
    AudioFlags, AudioMute, ChangeFlags1, ChangeFlags2, ChangeFlags3, MicLedMode, OutputReport,
    PlayerLedBrightness, PlayerLedFlags, Rgb,
};
use super::trigger::TriggerEffect;
use super::{TransportKind, OUTPUT_REPORT_BT_LEN, OUTPUT_REPORT_USB_LEN};

#[test]
fn default_report_encodes_all_zero_payload() {
    let report = OutputReport::default();
    assert!(report.flags1.is_empty());
    assert!(report.flags2.is_empty());

    let buf = report.encode(TransportKind::Usb);
    assert_eq!(buf.len(), OUTPUT_REPORT_USB_LEN);
    assert_eq!(buf[0], 0x02);
    assert!(buf[1..].iter().all(|&b| b == 0));
}

#[test]
fn motor_setters_raise_haptics_and_power_bits() {
    let mut report = OutputReport::default();
    report.set_left_motor(0x40).set_right_motor(0x80);

    assert_eq!(report.flags1, ChangeFlags1::ENABLE_HAPTICS);
    assert_eq!(report.flags2, ChangeFlags2::MOTOR_POWER_CHANGE);

    let buf = report.encode(TransportKind::Usb);
    assert_eq!(buf[1], 0x03);
    assert_eq!(buf[2], 0x40);
    assert_eq!(buf[3], 0x80);
    assert_eq!(buf[4], 0x40);
}

#[test]
fn volume_setters_raise_volume_bits() {
    let mut report = OutputReport::default();
    report.set_headphone_volume(0x30);
    assert_eq!(report.flags1, ChangeFlags1::AUDIO_VOLUME_CHANGE);

    let mut report = OutputReport::default();
    report.set_speaker_volume(0x30);
    assert_eq!(report.flags1, ChangeFlags1::AUDIO_VOLUME_CHANGE);

    // mic volume additionally marks its own bit
    let mut report = OutputReport::default();
    report.set_mic_volume(0x30);
    assert_eq!(
        report.flags1,
        ChangeFlags1::AUDIO_VOLUME_CHANGE | ChangeFlags1::MIC_VOLUME_CHANGE
    );
    assert_eq!(report.encode(TransportKind::Usb)[7], 0x30);
}

#[test]
fn audio_flag_setter_raises_all_three_routing_bits() {
    let mut report = OutputReport::default();
    report.set_audio_flags(AudioFlags::ENABLE_SPEAKER | AudioFlags::DISABLE_HEADPHONES);
    assert_eq!(
        report.flags1,
        ChangeFlags1::AUDIO_VOLUME_CHANGE
            | ChangeFlags1::MIC_VOLUME_CHANGE
            | ChangeFlags1::SPEAKER_TOGGLE
    );
    assert_eq!(report.encode(TransportKind::Usb)[8], 0x30);
}

#[test]
fn mic_led_setter_raises_its_toggle_bit() {
    let mut report = OutputReport::default();
    report.set_mic_led(MicLedMode::Pulsating);
    assert_eq!(report.flags2, ChangeFlags2::MIC_LED_TOGGLE);
    assert_eq!(report.encode(TransportKind::Usb)[9], 0x02);
}

#[test]
fn mute_setters_toggle_only_their_flag() {
    let mut report = OutputReport::default();
    report.mute_mic(true).mute_audio(true);
    assert_eq!(report.audio_mute, AudioMute::MIC | AudioMute::AUDIO);
    assert_eq!(
        report.flags1,
        ChangeFlags1::MIC_VOLUME_CHANGE | ChangeFlags1::AUDIO_VOLUME_CHANGE
    );
    assert_eq!(report.flags2, ChangeFlags2::FULL_MUTE_TOGGLE);

    // un-muting audio must leave the mic mute untouched
    report.mute_audio(false);
    assert_eq!(report.audio_mute, AudioMute::MIC);
    assert_eq!(report.encode(TransportKind::Usb)[10], 0x10);
}

#[test]
fn led_setters_raise_toggle_bits() {
    let mut report = OutputReport::default();
    report.set_led_brightness(PlayerLedBrightness::Low);
    assert_eq!(report.flags2, ChangeFlags2::LED_STRIP_TOGGLE);

    let mut report = OutputReport::default();
    report.set_player_leds(PlayerLedFlags::OUTER | PlayerLedFlags::CENTER);
    assert_eq!(report.flags2, ChangeFlags2::PLAYER_INDICATOR_TOGGLE);
    assert_eq!(report.encode(TransportKind::Usb)[44], 0b10101);

    let mut report = OutputReport::default();
    report.set_led_color(Rgb { r: 1, g: 2, b: 3 });
    assert_eq!(
        report.flags2,
        ChangeFlags2::LED_STRIP_TOGGLE | ChangeFlags2::PLAYER_INDICATOR_TOGGLE
    );
    let buf = report.encode(TransportKind::Usb);
    assert_eq!(&buf[45..48], &[1, 2, 3]);
}

#[test]
fn trigger_setters_mark_their_own_effect_bit() {
    let mut report = OutputReport::default();
    report.set_left_trigger(TriggerEffect::feedback(2, 5).unwrap());
    assert_eq!(report.flags1, ChangeFlags1::LEFT_TRIGGER_EFFECT);

    let buf = report.encode(TransportKind::Usb);
    // right trigger block starts at payload byte 10, left at 21
    assert_eq!(buf[11], 0x00);
    assert_eq!(buf[22], 0x21);

    let mut report = OutputReport::default();
    report.set_right_trigger(TriggerEffect::off());
    assert_eq!(report.flags1, ChangeFlags1::RIGHT_TRIGGER_EFFECT);
    assert_eq!(report.encode(TransportKind::Usb)[11], 0x05);
}

#[test]
fn flags3_and_pulse_options_land_on_their_bytes() {
    let mut report = OutputReport::default();
    report.flags3 = ChangeFlags3::UNINTERRUPTABLE_LED;
    report.lightbar_pulse = super::output::LightbarPulse::FadeOutBlue;
    report.haptics_muffle = 0x21;

    let buf = report.encode(TransportKind::Usb);
    assert_eq!(buf[37], 0x21);
    assert_eq!(buf[39], 0x02);
    assert_eq!(buf[42], 0x02);
}

#[test]
fn bluetooth_encode_embeds_a_valid_checksum() {
    let mut report = OutputReport::default();
    report.set_led_color(Rgb {
        r: 255,
        g: 0,
        b: 126,
    });
    let buf = report.encode(TransportKind::Bluetooth);

    assert_eq!(buf.len(), OUTPUT_REPORT_BT_LEN);
    assert_eq!(buf[0], 0x31);
    assert_eq!(buf[1], 0x02);
    // payload sits at 2..49, then 25 bytes of padding before the checksum
    assert_eq!(&buf[46..49], &[255, 0, 126]);
    assert!(buf[49..74].iter().all(|&b| b == 0));

    let embedded = u32::from_le_bytes(buf[74..78].try_into().unwrap());
    assert_eq!(embedded, crc32(BT_CRC_SEED, &buf[..74]));
    assert!(buf[78..].iter().all(|&b| b == 0));
}

#[test]
fn default_bluetooth_checksum_is_stable() {
    let buf = OutputReport::default().encode(TransportKind::Bluetooth);
    let embedded = u32::from_le_bytes(buf[74..78].try_into().unwrap());
    assert_eq!(embedded, 0x6200_E9C9);
}
