// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Semantic input events.
//!
//! Each raw MIDI message yields at most one event. Messages that do not
//! belong to any control of the device are silently ignored.

use derive_more::From;
use enum_as_inner::EnumAsInner;
use strum::{EnumIter, FromRepr};

use crate::{
    midi::ChannelMessage,
    pedal::{PedalAssignments, PedalContact},
};

mod button;
mod encoder;
mod pad;
mod pedal;
mod touch_strip;

pub use self::{
    button::{
        button_cc_number, Button, BUTTON_ROW_LEN, DISPLAY_BOTTOM_ROW_CC_START,
        DISPLAY_TOP_ROW_CC_START, SCENE_COLUMN_CC_END,
    },
    encoder::{encoder_delta, ENCODER_COUNT, ENCODER_FULL_TURN, TEMPO_ENCODER_FULL_TURN},
    pad::{
        pad_coordinates_to_number, pad_number_to_coordinates, FIRST_PAD_NUMBER,
        PAD_MATRIX_DIM,
    },
    touch_strip::{TOUCH_STRIP_CC_NUMBER, TOUCH_STRIP_NOTE_NUMBER},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum PadEventKind {
    Pressed = 0,
    Released = 1,
    Aftertouch = 2,
}

/// Input of a pad in the 8x8 matrix.
///
/// Coordinates start at the upper left pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct PadEvent {
    pub kind: PadEventKind,
    /// Column in the interval [0, 7]
    pub x: u8,
    /// Row in the interval [0, 7]
    pub y: u8,
    /// Velocity or pressure in the interval [0, 127]
    pub velocity: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum ButtonEventKind {
    Pressed = 0,
    Released = 1,
}

/// Value of [`ButtonEvent::index`] for single buttons.
pub const NO_BUTTON_INDEX: u8 = u8::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ButtonEvent {
    pub kind: ButtonEventKind,
    pub button: Button,
    /// Position within the row or column for [`Button::DisplayTop`],
    /// [`Button::DisplayBottom`], and [`Button::Scene`].
    ///
    /// [`NO_BUTTON_INDEX`] for single buttons.
    pub index: u8,
}

impl ButtonEvent {
    /// The position within the row or column, if any.
    #[must_use]
    pub const fn row_index(&self) -> Option<u8> {
        if self.index == NO_BUTTON_INDEX {
            None
        } else {
            Some(self.index)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum EncoderEventKind {
    Touched = 0,
    Moved = 1,
    Released = 2,
}

/// Input of an endless encoder.
///
/// Encoder 0 is the tempo encoder and 1 the swing encoder, followed by
/// the main row from left to right.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct EncoderEvent {
    pub kind: EncoderEventKind,
    pub index: u8,
    ///  1.0: One full CW rotation (360 degrees)
    /// -1.0: One full CCW rotation (360 degrees)
    ///
    /// Always 0 unless moved.
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum TouchStripEventKind {
    Pressed = 0,
    Moved = 1,
    Released = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct TouchStripEvent {
    pub kind: TouchStripEventKind,
    /// Position in the interval [-1, 1]
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct PedalEvent {
    pub contact: PedalContact,
    /// Position in the interval [0, 1]
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, From, EnumAsInner)]
pub enum Event {
    Pad(PadEvent),
    Button(ButtonEvent),
    Encoder(EncoderEvent),
    TouchStrip(TouchStripEvent),
    Pedal(PedalEvent),
}

/// Decode a raw MIDI message.
///
/// The control change numbers of the pedals depend on their current
/// `pedal_assignments`.
///
/// Returns `None` if the message does not belong to any control.
#[must_use]
pub fn decode_midi_input(input: &[u8], pedal_assignments: &PedalAssignments) -> Option<Event> {
    let msg = ChannelMessage::try_parse(input)?;
    decode_channel_message(&msg, pedal_assignments)
}

#[must_use]
pub fn decode_channel_message(
    msg: &ChannelMessage,
    pedal_assignments: &PedalAssignments,
) -> Option<Event> {
    // The number ranges of the different controls are disjoint.
    touch_strip::decode_touch_strip(msg)
        .map(Event::from)
        .or_else(|| encoder::decode_encoder(msg).map(Event::from))
        .or_else(|| pad::decode_pad(msg).map(Event::from))
        .or_else(|| pedal::decode_pedal(msg, pedal_assignments).map(Event::from))
        .or_else(|| button::decode_button(msg).map(Event::from))
}
