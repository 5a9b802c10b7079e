// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::PedalEvent;
use crate::{
    midi::{ChannelMessage, MidiMessageKind},
    pedal::{PedalAssignments, PEDAL_CC_NUMBERS},
};

pub(super) fn decode_pedal(
    msg: &ChannelMessage,
    assignments: &PedalAssignments,
) -> Option<PedalEvent> {
    if msg.kind != MidiMessageKind::ControlChange || !PEDAL_CC_NUMBERS.contains(&msg.data1) {
        return None;
    }
    let Some(contact) = assignments.contact(msg.data1) else {
        log::debug!(
            "Ignoring input of unassigned pedal control change number {cc_number}",
            cc_number = msg.data1
        );
        return None;
    };
    Some(PedalEvent {
        contact,
        value: f64::from(msg.data2) / 127.0,
    })
}
