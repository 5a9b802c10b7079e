// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

#![allow(rustdoc::invalid_rust_codeblocks)]
#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(rustdoc::broken_intra_doc_links)]
// Repetitions of module/type names occur frequently when using many
// modules for keeping the size of the source files handy. Often
// types have the same name as their parent module.
#![allow(clippy::module_name_repetitions)]
// Repeating the type name in `..Default::default()` expressions
// is not needed since the context is obvious.
#![allow(clippy::default_trait_access)]

pub mod codec;

pub mod device;
pub use self::device::{BoxedDisplayConnection, Push, PushInputHandler};

pub mod display;
pub use self::display::{DisplayConnection, FrameBuffer, PixelBuffer};

mod error;
pub use self::error::{ensure_reply_len, ConnectionError, Error, Result};

pub mod input;
pub use self::input::{
    Button, ButtonEvent, ButtonEventKind, EncoderEvent, EncoderEventKind, Event, PadEvent,
    PadEventKind, PedalEvent, TouchStripEvent, TouchStripEventKind,
};

pub mod listener;

pub mod midi;
pub use self::midi::{
    BoxedMidiOutputConnection, MidiInputHandler, MidiOutputConnection, TimeStamp,
};

pub mod pedal;
pub use self::pedal::{PedalAssignments, PedalContact};

pub mod sysex;
pub use self::sysex::{SysexTransport, SysexTransportConfig};

#[cfg(test)]
mod test_util;
