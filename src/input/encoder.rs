// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::{EncoderEvent, EncoderEventKind};
use crate::midi::{ChannelMessage, MidiMessageKind};

/// Tempo and swing encoder, followed by the main row.
pub const ENCODER_COUNT: u8 = 11;

const TEMPO_ENCODER_INDEX: u8 = 0;

/// Number of ticks of one full rotation of the tempo encoder.
pub const TEMPO_ENCODER_FULL_TURN: f64 = 18.0;

/// Number of ticks of one full rotation of all other encoders.
pub const ENCODER_FULL_TURN: f64 = 210.0;

const TEMPO_ENCODER_CC_NUMBERS: std::ops::RangeInclusive<u8> = 14..=15;
const MAIN_ROW_CC_NUMBERS: std::ops::RangeInclusive<u8> = 71..=79;

// The touch notes of tempo and swing are numbered in reverse.
const TEMPO_ENCODER_TOUCH_NOTE: u8 = 10;
const SWING_ENCODER_TOUCH_NOTE: u8 = 9;
const MAIN_ROW_TOUCH_NOTES: std::ops::RangeInclusive<u8> = 0..=8;

const MAIN_ROW_INDEX_OFFSET: u8 = 2;

const SIGN_BIT: u8 = 0x40;

/// Normalized rotation of an encoder that sent the given 7-bit two's complement value.
#[must_use]
pub fn encoder_delta(value: u8, index: u8) -> f64 {
    let (sign, ticks) = if value & SIGN_BIT == 0 {
        (1.0, value & 0x7f)
    } else {
        (-1.0, (!value).wrapping_add(1) & 0x7f)
    };
    let full_turn = if index == TEMPO_ENCODER_INDEX {
        TEMPO_ENCODER_FULL_TURN
    } else {
        ENCODER_FULL_TURN
    };
    sign * f64::from(ticks) / full_turn
}

fn cc_number_to_index(cc_number: u8) -> Option<u8> {
    if TEMPO_ENCODER_CC_NUMBERS.contains(&cc_number) {
        return Some(cc_number - TEMPO_ENCODER_CC_NUMBERS.start());
    }
    if MAIN_ROW_CC_NUMBERS.contains(&cc_number) {
        return Some(cc_number - MAIN_ROW_CC_NUMBERS.start() + MAIN_ROW_INDEX_OFFSET);
    }
    None
}

fn touch_note_to_index(note: u8) -> Option<u8> {
    match note {
        TEMPO_ENCODER_TOUCH_NOTE | SWING_ENCODER_TOUCH_NOTE => Some(TEMPO_ENCODER_TOUCH_NOTE - note),
        _ if MAIN_ROW_TOUCH_NOTES.contains(&note) => {
            Some(note - MAIN_ROW_TOUCH_NOTES.start() + MAIN_ROW_INDEX_OFFSET)
        }
        _ => None,
    }
}

pub(super) fn decode_encoder(msg: &ChannelMessage) -> Option<EncoderEvent> {
    match msg.kind {
        MidiMessageKind::ControlChange => {
            let index = cc_number_to_index(msg.data1)?;
            Some(EncoderEvent {
                kind: EncoderEventKind::Moved,
                index,
                delta: encoder_delta(msg.data2, index),
            })
        }
        MidiMessageKind::NoteOn => {
            let index = touch_note_to_index(msg.data1)?;
            let kind = if msg.data2 == 0 {
                EncoderEventKind::Released
            } else {
                EncoderEventKind::Touched
            };
            Some(EncoderEvent {
                kind,
                index,
                delta: 0.0,
            })
        }
        _ => None,
    }
}
