// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::{TouchStripEvent, TouchStripEventKind};
use crate::midi::{ChannelMessage, MidiMessageKind};

pub const TOUCH_STRIP_CC_NUMBER: u8 = 1;

/// Sent when the touch strip is touched or released.
pub const TOUCH_STRIP_NOTE_NUMBER: u8 = 12;

const CC_CENTER: f64 = 64.0;

const PITCH_BEND_CENTER: f64 = 128.0;

pub(super) fn decode_touch_strip(msg: &ChannelMessage) -> Option<TouchStripEvent> {
    let (kind, position) = match msg.kind {
        MidiMessageKind::NoteOn if msg.data1 == TOUCH_STRIP_NOTE_NUMBER => {
            let kind = if msg.data2 == 0 {
                TouchStripEventKind::Released
            } else {
                TouchStripEventKind::Pressed
            };
            (kind, 0.0)
        }
        MidiMessageKind::ControlChange if msg.data1 == TOUCH_STRIP_CC_NUMBER => (
            TouchStripEventKind::Moved,
            (f64::from(msg.data2) - CC_CENTER) / CC_CENTER,
        ),
        MidiMessageKind::PitchBend => {
            // 8 bits of resolution: the upper bit of the LSB byte
            // followed by the 7 bits of the MSB byte.
            let lsb = u16::from(msg.data1 >> 6);
            let value = lsb | (u16::from(msg.data2) << 1);
            (
                TouchStripEventKind::Moved,
                (f64::from(value) - PITCH_BEND_CENTER) / PITCH_BEND_CENTER,
            )
        }
        _ => return None,
    };
    Some(TouchStripEvent { kind, position })
}
