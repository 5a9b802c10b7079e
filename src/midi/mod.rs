// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use std::ops::{Deref, DerefMut};

use crate::Result;

#[cfg(feature = "midir")]
pub mod midir;

pub const MIDI_STATUS_NOTE_OFF: u8 = 0x80;
pub const MIDI_STATUS_NOTE_ON: u8 = 0x90;
pub const MIDI_STATUS_POLY_AFTERTOUCH: u8 = 0xa0;
pub const MIDI_STATUS_CC: u8 = 0xb0;
pub const MIDI_STATUS_CHANNEL_PRESSURE: u8 = 0xd0;
pub const MIDI_STATUS_PITCH_BEND: u8 = 0xe0;
pub const MIDI_STATUS_SYSEX: u8 = 0xf0;

const MIDI_STATUS_KIND_MASK: u8 = 0xf0;
const MIDI_STATUS_CHANNEL_MASK: u8 = 0x0f;

/// Time stamp of received MIDI input in microseconds.
///
/// The origin is defined by the MIDI backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
#[display("@{_0}us")]
pub struct TimeStamp(u64);

impl TimeStamp {
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    #[must_use]
    pub const fn to_micros(self) -> u64 {
        self.0
    }
}

/// Kind of a MIDI message, as identified by its status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum MidiMessageKind {
    NoteOff,
    NoteOn,
    PolyAftertouch,
    ControlChange,
    ChannelPressure,
    PitchBend,
    Sysex,
}

impl MidiMessageKind {
    /// Classify a status byte.
    ///
    /// Returns `None` for data bytes and for system messages
    /// other than sysex.
    #[must_use]
    pub const fn from_status(status: u8) -> Option<Self> {
        if status == MIDI_STATUS_SYSEX {
            return Some(Self::Sysex);
        }
        let kind = match status & MIDI_STATUS_KIND_MASK {
            MIDI_STATUS_NOTE_OFF => Self::NoteOff,
            MIDI_STATUS_NOTE_ON => Self::NoteOn,
            MIDI_STATUS_POLY_AFTERTOUCH => Self::PolyAftertouch,
            MIDI_STATUS_CC => Self::ControlChange,
            MIDI_STATUS_CHANNEL_PRESSURE => Self::ChannelPressure,
            MIDI_STATUS_PITCH_BEND => Self::PitchBend,
            _ => return None,
        };
        Some(kind)
    }

    /// The status nibble of channel messages or the full status byte of sysex.
    #[must_use]
    pub const fn status(self) -> u8 {
        match self {
            Self::NoteOff => MIDI_STATUS_NOTE_OFF,
            Self::NoteOn => MIDI_STATUS_NOTE_ON,
            Self::PolyAftertouch => MIDI_STATUS_POLY_AFTERTOUCH,
            Self::ControlChange => MIDI_STATUS_CC,
            Self::ChannelPressure => MIDI_STATUS_CHANNEL_PRESSURE,
            Self::PitchBend => MIDI_STATUS_PITCH_BEND,
            Self::Sysex => MIDI_STATUS_SYSEX,
        }
    }

    /// Number of data bytes that follow the status byte.
    ///
    /// Sysex messages have a variable length and return `None`.
    #[must_use]
    pub const fn data_len(self) -> Option<usize> {
        match self {
            Self::ChannelPressure => Some(1),
            Self::Sysex => None,
            _ => Some(2),
        }
    }
}

/// Classify a raw MIDI message by its first byte.
#[must_use]
pub fn midi_message_kind(input: &[u8]) -> Option<MidiMessageKind> {
    input.first().copied().and_then(MidiMessageKind::from_status)
}

/// A decoded MIDI channel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMessage {
    pub kind: MidiMessageKind,
    pub channel: u8,
    pub data1: u8,
    /// Zero for messages with a single data byte.
    pub data2: u8,
}

impl ChannelMessage {
    /// Parse a channel message.
    ///
    /// Returns `None` for sysex, unknown status bytes, or if the message
    /// is too short for its kind.
    #[must_use]
    pub fn try_parse(input: &[u8]) -> Option<Self> {
        let (&status, data) = input.split_first()?;
        let kind = MidiMessageKind::from_status(status)?;
        let data_len = kind.data_len()?;
        if data.len() < data_len {
            return None;
        }
        let data1 = data[0];
        let data2 = if data_len > 1 { data[1] } else { 0 };
        Some(Self {
            kind,
            channel: status & MIDI_STATUS_CHANNEL_MASK,
            data1,
            data2,
        })
    }

    /// The note, controller or pad number, if the kind carries one.
    #[must_use]
    pub const fn number(&self) -> Option<u8> {
        match self.kind {
            MidiMessageKind::NoteOff
            | MidiMessageKind::NoteOn
            | MidiMessageKind::PolyAftertouch
            | MidiMessageKind::ControlChange => Some(self.data1),
            MidiMessageKind::ChannelPressure
            | MidiMessageKind::PitchBend
            | MidiMessageKind::Sysex => None,
        }
    }

    /// The value byte.
    ///
    /// Channel pressure only has a single data byte that carries the value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self.kind {
            MidiMessageKind::ChannelPressure => self.data1,
            _ => self.data2,
        }
    }
}

pub trait MidiOutputConnection: Send {
    fn send_midi_output(&mut self, output: &[u8]) -> Result<()>;
}

impl<C> MidiOutputConnection for Box<C>
where
    C: MidiOutputConnection + ?Sized,
{
    fn send_midi_output(&mut self, output: &[u8]) -> Result<()> {
        (**self).send_midi_output(output)
    }
}

pub type BoxedMidiOutputConnection = Box<dyn MidiOutputConnection + 'static>;

/// Passive callback for sinking MIDI input messages
pub trait MidiInputHandler: Send {
    /// Invoked for each incoming message.
    ///
    /// Returns `true` if the message has been accepted and handled
    /// or `false` otherwise.
    #[must_use]
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool;
}

impl<D> MidiInputHandler for D
where
    D: DerefMut + Send,
    <D as Deref>::Target: MidiInputHandler,
{
    fn handle_midi_input(&mut self, ts: TimeStamp, input: &[u8]) -> bool {
        self.deref_mut().handle_midi_input(ts, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_status_bytes() {
        assert_eq!(Some(MidiMessageKind::NoteOff), midi_message_kind(&[0x80]));
        assert_eq!(Some(MidiMessageKind::NoteOn), midi_message_kind(&[0x9f]));
        assert_eq!(
            Some(MidiMessageKind::PolyAftertouch),
            midi_message_kind(&[0xa0])
        );
        assert_eq!(
            Some(MidiMessageKind::ControlChange),
            midi_message_kind(&[0xb3])
        );
        assert_eq!(
            Some(MidiMessageKind::ChannelPressure),
            midi_message_kind(&[0xd0])
        );
        assert_eq!(Some(MidiMessageKind::PitchBend), midi_message_kind(&[0xe0]));
        assert_eq!(Some(MidiMessageKind::Sysex), midi_message_kind(&[0xf0]));
        assert_eq!(None, midi_message_kind(&[0xf8]));
        assert_eq!(None, midi_message_kind(&[0x40]));
        assert_eq!(None, midi_message_kind(&[]));
    }

    #[test]
    fn status_round_trip() {
        use strum::IntoEnumIterator as _;
        for kind in MidiMessageKind::iter() {
            assert_eq!(Some(kind), MidiMessageKind::from_status(kind.status()));
        }
    }

    #[test]
    fn parse_channel_messages() {
        let msg = ChannelMessage::try_parse(&[0x91, 36, 100]).unwrap();
        assert_eq!(MidiMessageKind::NoteOn, msg.kind);
        assert_eq!(1, msg.channel);
        assert_eq!(Some(36), msg.number());
        assert_eq!(100, msg.value());

        let msg = ChannelMessage::try_parse(&[0xd0, 42]).unwrap();
        assert_eq!(None, msg.number());
        assert_eq!(42, msg.value());

        assert!(ChannelMessage::try_parse(&[0x90, 36]).is_none());
        assert!(ChannelMessage::try_parse(&[0xf0, 0x00, 0xf7]).is_none());
    }

    #[test]
    fn time_stamp_display() {
        assert_eq!("@42us", TimeStamp::from_micros(42).to_string());
    }
}
