// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::{PadEvent, PadEventKind};
use crate::midi::{ChannelMessage, MidiMessageKind};

pub const PAD_MATRIX_DIM: u8 = 8;

/// Note number of the lower left pad.
pub const FIRST_PAD_NUMBER: u8 = 36;

const PAD_COUNT: u8 = PAD_MATRIX_DIM * PAD_MATRIX_DIM;

/// Column and row of a pad, with row 0 at the top.
///
/// Returns `None` if the note number does not belong to a pad.
#[must_use]
pub const fn pad_number_to_coordinates(number: u8) -> Option<(u8, u8)> {
    if number < FIRST_PAD_NUMBER || number >= FIRST_PAD_NUMBER + PAD_COUNT {
        return None;
    }
    let offset = number - FIRST_PAD_NUMBER;
    let x = offset % PAD_MATRIX_DIM;
    let y = PAD_MATRIX_DIM - 1 - offset / PAD_MATRIX_DIM;
    Some((x, y))
}

/// Inverse of [`pad_number_to_coordinates`].
#[must_use]
pub const fn pad_coordinates_to_number(x: u8, y: u8) -> Option<u8> {
    if x >= PAD_MATRIX_DIM || y >= PAD_MATRIX_DIM {
        return None;
    }
    Some((PAD_MATRIX_DIM - 1 - y) * PAD_MATRIX_DIM + x + FIRST_PAD_NUMBER)
}

pub(super) fn decode_pad(msg: &ChannelMessage) -> Option<PadEvent> {
    let kind = match msg.kind {
        MidiMessageKind::NoteOn => PadEventKind::Pressed,
        MidiMessageKind::NoteOff => PadEventKind::Released,
        MidiMessageKind::PolyAftertouch => PadEventKind::Aftertouch,
        // Channel pressure does not tell which pad is pressed.
        _ => return None,
    };
    let (x, y) = pad_number_to_coordinates(msg.number()?)?;
    Some(PadEvent {
        kind,
        x,
        y,
        velocity: msg.value(),
    })
}
