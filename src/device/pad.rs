// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use strum::{EnumIter, FromRepr};

use super::{led::led_color_message, LedAnimation, Push};
use crate::{
    codec::{curve_chunks, pack7},
    display::DisplayConnection,
    ensure_reply_len,
    input::{pad_coordinates_to_number, PAD_MATRIX_DIM},
    midi::{MidiMessageKind, MidiOutputConnection},
    sysex::command,
    Error, Result,
};

pub const PAD_VELOCITY_CURVE_ENTRIES: usize = 128;

const PAD_VELOCITY_CURVE_CHUNKS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum AftertouchMode {
    /// A single pressure value for all pads
    ///
    /// Channel pressure does not identify a pad and is not decoded into
    /// [`PadEvent`](crate::PadEvent)s.
    Channel = 0,
    Polyphonic = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum PadSensitivity {
    Regular = 0,
    Reduced = 1,
    Low = 2,
}

// Pad settings address rows bottom-up and both rows and columns 1-based.
// Zero addresses all pads.
const fn pad_settings_address(x: u8, y: u8) -> [u8; 2] {
    [PAD_MATRIX_DIM - y, x + 1]
}

const GLOBAL_PAD_SETTINGS_ADDRESS: [u8; 2] = [0, 0];

fn ensure_pad_coordinates(x: u8, y: u8) -> Result<u8> {
    pad_coordinates_to_number(x, y)
        .ok_or_else(|| Error::invalid_argument(format!("no pad at ({x}, {y})")))
}

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    /// Pressure thresholds that trigger aftertouch for all pads.
    pub fn set_global_aftertouch_range(&self, low: u16, high: u16) -> Result<()> {
        let [low_lo, low_hi] = pack7(low);
        let [high_lo, high_hi] = pack7(high);
        let args = [0, 0, 0, 0, low_lo, low_hi, high_lo, high_hi];
        self.call(command::SET_PAD_PARAMETERS, &args).map(drop)
    }

    pub fn set_global_aftertouch_mode(&self, mode: AftertouchMode) -> Result<()> {
        self.call(command::SET_AFTERTOUCH_MODE, &[mode as u8])
            .map(drop)
    }

    pub fn global_aftertouch_mode(&self) -> Result<AftertouchMode> {
        let reply = self.call(command::GET_AFTERTOUCH_MODE, &[])?;
        ensure_reply_len(command::GET_AFTERTOUCH_MODE, &reply, 1)?;
        AftertouchMode::from_repr(reply[0]).ok_or(Error::InvalidReply {
            command: command::GET_AFTERTOUCH_MODE,
            value: reply[0],
        })
    }

    /// Maps the pressure of a pad press onto its velocity.
    pub fn set_global_pad_velocity_curve(
        &self,
        entries: &[u8; PAD_VELOCITY_CURVE_ENTRIES],
    ) -> Result<()> {
        let entries_per_chunk = PAD_VELOCITY_CURVE_ENTRIES / PAD_VELOCITY_CURVE_CHUNKS;
        for chunk in curve_chunks(entries, entries_per_chunk) {
            let mut args = Vec::with_capacity(1 + chunk.entries.len());
            args.push(chunk.start);
            args.extend_from_slice(chunk.entries);
            self.call(command::SET_PAD_VELOCITY_CURVE_ENTRY, &args)?;
        }
        Ok(())
    }

    pub fn set_pad_sensitivity(&self, x: u8, y: u8, sensitivity: PadSensitivity) -> Result<()> {
        ensure_pad_coordinates(x, y)?;
        let [row, column] = pad_settings_address(x, y);
        self.call(command::SELECT_PAD_SETTINGS, &[row, column, sensitivity as u8])
            .map(drop)
    }

    pub fn set_global_pad_sensitivity(&self, sensitivity: PadSensitivity) -> Result<()> {
        let [row, column] = GLOBAL_PAD_SETTINGS_ADDRESS;
        self.call(command::SELECT_PAD_SETTINGS, &[row, column, sensitivity as u8])
            .map(drop)
    }

    pub fn pad_sensitivity(&self, x: u8, y: u8) -> Result<PadSensitivity> {
        ensure_pad_coordinates(x, y)?;
        let reply = self.call(
            command::GET_SELECTED_PAD_SETTINGS,
            &pad_settings_address(x, y),
        )?;
        ensure_reply_len(command::GET_SELECTED_PAD_SETTINGS, &reply, 3)?;
        PadSensitivity::from_repr(reply[2]).ok_or(Error::InvalidReply {
            command: command::GET_SELECTED_PAD_SETTINGS,
            value: reply[2],
        })
    }

    pub fn set_pad_color(&self, x: u8, y: u8, color_index: u8) -> Result<()> {
        self.set_pad_animation(x, y, color_index, None)
    }

    pub fn set_global_pad_color(&self, color_index: u8) -> Result<()> {
        for y in 0..PAD_MATRIX_DIM {
            for x in 0..PAD_MATRIX_DIM {
                self.set_pad_color(x, y, color_index)?;
            }
        }
        Ok(())
    }

    pub fn set_pad_animation(
        &self,
        x: u8,
        y: u8,
        color_index: u8,
        animation: Option<LedAnimation>,
    ) -> Result<()> {
        let number = ensure_pad_coordinates(x, y)?;
        if color_index > super::MAX_LED_COLOR_INDEX {
            return Err(Error::invalid_argument(format!(
                "color index {color_index} out of range"
            )));
        }
        self.send_midi_output(&led_color_message(
            MidiMessageKind::NoteOn,
            number,
            color_index,
            animation,
        ))
    }
}
