// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! LED colors, brightness, and white balance.
//!
//! LEDs are not colored directly. Instead each LED refers to an entry of
//! a color palette with 128 entries. Changed palette entries only become
//! visible after the palette has been reapplied.

use strum::{EnumCount, EnumIter, FromRepr};

use super::Push;
use crate::{
    codec::{
        pack11, pack21, pack7, pwm_correction, u7_pair_to_u14, U11_MASK, U7_MASK,
        MAX_LED_PWM_FREQ_HZ, MIN_LED_PWM_FREQ_HZ,
    },
    display::DisplayConnection,
    ensure_reply_len,
    input::{button_cc_number, Button},
    midi::{MidiMessageKind, MidiOutputConnection},
    sysex::command,
    Error, Result,
};

pub const MAX_LED_COLOR_INDEX: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct LedColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl LedColor {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    fn to_args(self) -> [u8; 8] {
        let Self {
            red,
            green,
            blue,
            white,
        } = self;
        let [r0, r1] = pack7(u16::from(red));
        let [g0, g1] = pack7(u16::from(green));
        let [b0, b1] = pack7(u16::from(blue));
        let [w0, w1] = pack7(u16::from(white));
        [r0, r1, g0, g1, b0, b1, w0, w1]
    }

    fn from_args(args: &[u8]) -> Self {
        debug_assert!(args.len() >= 8);
        let component = |index: usize| {
            let value = u7_pair_to_u14(args[index], args[index + 1]);
            u8::try_from(value).unwrap_or(u8::MAX)
        };
        Self {
            red: component(0),
            green: component(2),
            blue: component(4),
            white: component(6),
        }
    }
}

/// Groups of LEDs with a common white balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter, EnumCount)]
#[repr(u8)]
pub enum LedColorGroup {
    RgbButtonRed = 0,
    RgbButtonGreen = 1,
    RgbButtonBlue = 2,
    PadRed = 3,
    PadGreen = 4,
    PadBlue = 5,
    DisplayButtonRed = 6,
    DisplayButtonGreen = 7,
    DisplayButtonBlue = 8,
    WhiteButtons = 9,
    TouchStrip = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum LedAnimationKind {
    /// Turn the LED off after the duration
    OneShot = 1,
    /// Triangle wave
    Pulse = 6,
    /// Square wave
    Blink = 11,
}

/// Fraction of a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum LedAnimationDuration {
    TwentyFourth = 0,
    Sixteenth = 1,
    Eighth = 2,
    Quarter = 3,
    Half = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct LedAnimation {
    pub kind: LedAnimationKind,
    pub duration: LedAnimationDuration,
}

impl LedAnimation {
    /// The MIDI channel that selects this animation.
    #[must_use]
    pub const fn midi_channel(self) -> u8 {
        self.kind as u8 + self.duration as u8
    }
}

/// Build the MIDI message that sets an LED color.
///
/// Without an animation the color is applied immediately.
#[must_use]
pub(super) fn led_color_message(
    kind: MidiMessageKind,
    number: u8,
    color_index: u8,
    animation: Option<LedAnimation>,
) -> [u8; 3] {
    debug_assert!(matches!(
        kind,
        MidiMessageKind::NoteOn | MidiMessageKind::ControlChange
    ));
    let channel = animation.map_or(0, LedAnimation::midi_channel);
    [kind.status() | channel, number & U7_MASK, color_index & U7_MASK]
}

fn ensure_color_index(color_index: u8) -> Result<()> {
    if color_index > MAX_LED_COLOR_INDEX {
        return Err(Error::invalid_argument(format!(
            "color index {color_index} out of range"
        )));
    }
    Ok(())
}

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    /// Only visible after [`Self::reapply_color_palette()`].
    pub fn set_led_color_palette_entry(&self, color_index: u8, color: LedColor) -> Result<()> {
        ensure_color_index(color_index)?;
        let mut args = [0; 9];
        args[0] = color_index;
        args[1..].copy_from_slice(&color.to_args());
        self.call(command::SET_LED_COLOR_PALETTE_ENTRY, &args)
            .map(drop)
    }

    pub fn led_color_palette_entry(&self, color_index: u8) -> Result<LedColor> {
        ensure_color_index(color_index)?;
        let reply = self.call(command::GET_LED_COLOR_PALETTE_ENTRY, &[color_index])?;
        ensure_reply_len(command::GET_LED_COLOR_PALETTE_ENTRY, &reply, 9)?;
        Ok(LedColor::from_args(&reply[1..]))
    }

    pub fn reapply_color_palette(&self) -> Result<()> {
        self.call(command::REAPPLY_COLOR_PALETTE, &[]).map(drop)
    }

    /// Brightness of all LEDs in the range [0, 127].
    pub fn set_global_led_brightness(&self, brightness: u8) -> Result<()> {
        self.call(command::SET_LED_BRIGHTNESS, &[brightness & U7_MASK])
            .map(drop)
    }

    pub fn global_led_brightness(&self) -> Result<u8> {
        let reply = self.call(command::GET_LED_BRIGHTNESS, &[])?;
        ensure_reply_len(command::GET_LED_BRIGHTNESS, &reply, 1)?;
        Ok(reply[0])
    }

    /// Frequencies outside of the supported range are clamped.
    pub fn set_led_pwm_frequency(&self, freq_hz: u32) -> Result<()> {
        let clamped_freq_hz = freq_hz.clamp(MIN_LED_PWM_FREQ_HZ, MAX_LED_PWM_FREQ_HZ);
        if clamped_freq_hz != freq_hz {
            log::warn!("Clamped LED PWM frequency from {freq_hz} Hz to {clamped_freq_hz} Hz");
        }
        let args = pack21(pwm_correction(clamped_freq_hz));
        self.call(command::SET_LED_PWM_FREQ_CORRECTION, &args)
            .map(drop)
    }

    /// White balance factor in the range [0, 1024].
    pub fn set_led_white_balance(&self, group: LedColorGroup, factor: u16) -> Result<()> {
        let [lo, hi] = pack11(factor);
        self.call(command::SET_LED_WHITE_BALANCE, &[group as u8, lo, hi])
            .map(drop)
    }

    pub fn led_white_balance(&self, group: LedColorGroup) -> Result<u16> {
        let reply = self.call(command::GET_LED_WHITE_BALANCE, &[group as u8])?;
        ensure_reply_len(command::GET_LED_WHITE_BALANCE, &reply, 3)?;
        Ok(u7_pair_to_u14(reply[1], reply[2]) & U11_MASK)
    }

    /// Color a single button or a button in a row or column.
    ///
    /// Only buttons in rows and columns need an `index`.
    pub fn set_button_color(
        &self,
        button: Button,
        index: Option<u8>,
        color_index: u8,
        animation: Option<LedAnimation>,
    ) -> Result<()> {
        ensure_color_index(color_index)?;
        let Some(cc_number) = button_cc_number(button, index) else {
            return Err(Error::invalid_argument(format!(
                "no LED for button {button:?} at index {index:?}"
            )));
        };
        self.send_midi_output(&led_color_message(
            MidiMessageKind::ControlChange,
            cc_number,
            color_index,
            animation,
        ))
    }
}
