//! Adaptive trigger effect descriptors.
//!
//! Effect factories credit: https://gist.github.com/Nielk1/6d54cc2c00d2201ccb8c2720ad7538db

use crate::error::Error;

/// Trigger effect mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TriggerMode {
    /// No effect data; the device leaves the trigger untouched.
    #[default]
    None = 0x00,
    /// Clears a previously programmed effect.
    Off = 0x05,
    /// Constant resistance across the active zones.
    Feedback = 0x21,
    /// Resistance between two zones, released with a snap.
    Weapon = 0x25,
    /// Automatic cycling action past the start zone.
    Vibration = 0x26,
}

/// Highest zone index along the trigger's pull range.
const MAX_ZONE: u8 = 9;
/// Highest accepted force/strength value.
const MAX_FORCE: u8 = 8;

/// One adaptive trigger descriptor, as carried in output reports.
///
/// Force bits for zones outside the active-zone mask are ignored by the
/// device; the builders still zero them so identical inputs produce
/// identical descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerEffect {
    mode: TriggerMode,
    active_zones: u16,
    force_zones: [u8; 6],
    frequency: u8,
}

impl TriggerEffect {
    /// Clears any programmed effect.
    pub fn off() -> Self {
        Self {
            mode: TriggerMode::Off,
            ..Default::default()
        }
    }

    /// Resist movement beyond `start_zone` with a constant `force`.
    ///
    /// Zones are 0..=9, force 0..=8; zero force clears the effect. The
    /// trigger feedback value reports 1 while the effect engages.
    pub fn feedback(start_zone: u8, force: u8) -> Result<Self, Error> {
        check_zone(start_zone)?;
        check_force(force)?;
        if force == 0 {
            return Ok(Self::off());
        }

        let mut active_zones = 0u16;
        let mut forces = 0u64;
        for zone in start_zone..=MAX_ZONE {
            forces |= (force as u64) << (3 * zone as u64);
            active_zones |= 1 << zone as u16;
        }
        Ok(Self {
            mode: TriggerMode::Feedback,
            active_zones,
            force_zones: split_force_zones(forces),
            frequency: 0,
        })
    }

    /// Resist movement between `start_zone` and `end_zone`, with a release
    /// snap past the end. Feedback reports 2 once the end zone is passed.
    pub fn weapon(start_zone: u8, end_zone: u8, force: u8) -> Result<Self, Error> {
        check_zone(start_zone)?;
        check_zone(end_zone)?;
        check_force(force)?;
        if end_zone <= start_zone {
            return Err(Error::InvalidParameter("end zone must come after start zone"));
        }
        if force == 0 {
            return Ok(Self::off());
        }

        let mut force_zones = [0u8; 6];
        force_zones[0] = force - 1;
        Ok(Self {
            mode: TriggerMode::Weapon,
            active_zones: (1 << start_zone as u16) | (1 << end_zone as u16),
            force_zones,
            frequency: 0,
        })
    }

    /// Vibrate beyond `start_zone` with the given `amplitude` (0..=8) at
    /// `frequency` hertz. Zero amplitude or frequency clears the effect.
    pub fn vibration(start_zone: u8, amplitude: u8, frequency: u8) -> Result<Self, Error> {
        check_zone(start_zone)?;
        check_force(amplitude)?;
        if amplitude == 0 || frequency == 0 {
            return Ok(Self::off());
        }

        let strength = ((amplitude - 1) & 0x07) as u64;
        let mut active_zones = 0u16;
        let mut forces = 0u64;
        for zone in start_zone..=MAX_ZONE {
            forces |= strength << (3 * zone as u64);
            active_zones |= 1 << zone as u16;
        }
        Ok(Self {
            mode: TriggerMode::Vibration,
            active_zones,
            force_zones: split_force_zones(forces),
            frequency,
        })
    }

    /// Per-zone resistance; `strengths[i]` (0..=8) applies to zone `i`, zero
    /// leaves the zone inactive. All zeroes clears the effect.
    pub fn multiple_position_feedback(strengths: [u8; 10]) -> Result<Self, Error> {
        let mut active_zones = 0u16;
        let mut forces = 0u64;
        for (zone, &strength) in strengths.iter().enumerate() {
            check_force(strength)?;
            if strength == 0 {
                continue;
            }
            forces |= (((strength - 1) & 0x07) as u64) << (3 * zone as u64);
            active_zones |= 1 << zone as u16;
        }
        if active_zones == 0 {
            return Ok(Self::off());
        }
        Ok(Self {
            mode: TriggerMode::Feedback,
            active_zones,
            force_zones: split_force_zones(forces),
            frequency: 0,
        })
    }

    /// Resistance ramping linearly from `start_strength` at `start_zone` to
    /// `end_strength` at `end_zone`.
    pub fn slope_feedback(
        start_zone: u8,
        end_zone: u8,
        start_strength: u8,
        end_strength: u8,
    ) -> Result<Self, Error> {
        check_zone(start_zone)?;
        check_zone(end_zone)?;
        check_force(start_strength)?;
        check_force(end_strength)?;
        if end_zone <= start_zone {
            return Err(Error::InvalidParameter("end zone must come after start zone"));
        }

        let slope =
            (end_strength as f32 - start_strength as f32) / (end_zone - start_zone) as f32;
        let mut strengths = [0u8; 10];
        for zone in start_zone..=end_zone {
            let ramped = start_strength as f32 + slope * (zone - start_zone) as f32;
            strengths[zone as usize] = ramped.round() as u8;
        }
        Self::multiple_position_feedback(strengths)
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    /// Bit `i` marks zone `i` as active.
    pub fn active_zones(&self) -> u16 {
        self.active_zones
    }

    pub fn force_zones(&self) -> [u8; 6] {
        self.force_zones
    }

    pub fn frequency(&self) -> u8 {
        self.frequency
    }

    /// Pack into the 11-byte wire block.
    pub(crate) fn pack_into(&self, buf: &mut [u8]) {
        buf[0] = self.mode as u8;
        buf[1..3].copy_from_slice(&self.active_zones.to_le_bytes());
        buf[3..9].copy_from_slice(&self.force_zones);
        buf[9] = self.frequency;
        buf[10] = 0;
    }
}

/// Split the 3-bit-per-zone accumulator into its wire bytes. Byte 5 carries
/// accumulator bits 48..=55; bits 40..=47 never reach the wire.
pub(crate) fn split_force_zones(forces: u64) -> [u8; 6] {
    [
        forces as u8,
        (forces >> 8) as u8,
        (forces >> 16) as u8,
        (forces >> 24) as u8,
        (forces >> 32) as u8,
        (forces >> 48) as u8,
    ]
}

/// Zone index for a normalized 0.0..=1.0 trigger position.
pub fn zone(value: f32) -> u8 {
    (value * MAX_ZONE as f32).round() as u8
}

/// Strength for a normalized 0.0..=1.0 force.
pub fn strength(value: f32) -> u8 {
    (value * MAX_FORCE as f32).round() as u8
}

fn check_zone(zone: u8) -> Result<(), Error> {
    if zone > MAX_ZONE {
        return Err(Error::InvalidParameter("trigger zone out of range"));
    }
    Ok(())
}

fn check_force(force: u8) -> Result<(), Error> {
    if force > MAX_FORCE {
        return Err(Error::InvalidParameter("trigger force out of range"));
    }
    Ok(())
}
