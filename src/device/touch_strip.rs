// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::Push;
use crate::{
    display::DisplayConnection, ensure_reply_len, midi::MidiOutputConnection, sysex::command,
    Result,
};

pub const TOUCH_STRIP_LEDS: usize = 30;

const MAX_LED_BRIGHTNESS: u8 = 0x07;

const LED_BRIGHTNESS_BITS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TouchStripConfig {
    /// LEDs are controlled by the host instead of the device
    pub controlled_by_host: bool,
    /// Display a single point instead of a bar
    pub led_point: bool,
    pub bar_starts_at_center: bool,
    pub autoreturn: bool,
    /// Return to the center instead of the bottom
    pub autoreturn_to_center: bool,
}

impl TouchStripConfig {
    const CONTROLLED_BY_HOST: u8 = 1 << 0;
    const LED_POINT: u8 = 1 << 3;
    const BAR_STARTS_AT_CENTER: u8 = 1 << 4;
    const AUTORETURN: u8 = 1 << 5;
    const AUTORETURN_TO_CENTER: u8 = 1 << 6;

    #[must_use]
    pub const fn to_u7(self) -> u8 {
        let Self {
            controlled_by_host,
            led_point,
            bar_starts_at_center,
            autoreturn,
            autoreturn_to_center,
        } = self;
        let mut flags = 0;
        if controlled_by_host {
            flags |= Self::CONTROLLED_BY_HOST;
        }
        if led_point {
            flags |= Self::LED_POINT;
        }
        if bar_starts_at_center {
            flags |= Self::BAR_STARTS_AT_CENTER;
        }
        if autoreturn {
            flags |= Self::AUTORETURN;
        }
        if autoreturn_to_center {
            flags |= Self::AUTORETURN_TO_CENTER;
        }
        flags
    }

    #[must_use]
    pub const fn from_u7(flags: u8) -> Self {
        Self {
            controlled_by_host: flags & Self::CONTROLLED_BY_HOST != 0,
            led_point: flags & Self::LED_POINT != 0,
            bar_starts_at_center: flags & Self::BAR_STARTS_AT_CENTER != 0,
            autoreturn: flags & Self::AUTORETURN != 0,
            autoreturn_to_center: flags & Self::AUTORETURN_TO_CENTER != 0,
        }
    }
}

/// Two 3-bit brightness values per byte, the first LED in the lower bits.
fn pack_touch_strip_leds(brightness: &[u8; TOUCH_STRIP_LEDS]) -> [u8; TOUCH_STRIP_LEDS / 2] {
    let mut packed = [0; TOUCH_STRIP_LEDS / 2];
    for (byte, pair) in packed.iter_mut().zip(brightness.chunks_exact(2)) {
        *byte = (pair[0] & MAX_LED_BRIGHTNESS)
            | ((pair[1] & MAX_LED_BRIGHTNESS) << LED_BRIGHTNESS_BITS);
    }
    packed
}

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    pub fn set_touch_strip_config(&self, config: TouchStripConfig) -> Result<()> {
        self.call(command::SET_TOUCH_STRIP_CONFIGURATION, &[config.to_u7()])
            .map(drop)
    }

    pub fn touch_strip_config(&self) -> Result<TouchStripConfig> {
        let reply = self.call(command::GET_TOUCH_STRIP_CONFIGURATION, &[])?;
        ensure_reply_len(command::GET_TOUCH_STRIP_CONFIGURATION, &reply, 1)?;
        Ok(TouchStripConfig::from_u7(reply[0]))
    }

    /// Brightness of each LED in the range [0, 7], bottom to top.
    ///
    /// Only effective if the LEDs are controlled by the host.
    pub fn set_touch_strip_leds(&self, brightness: &[u8; TOUCH_STRIP_LEDS]) -> Result<()> {
        self.call(
            command::SET_TOUCH_STRIP_LEDS,
            &pack_touch_strip_leds(brightness),
        )
        .map(drop)
    }
}
