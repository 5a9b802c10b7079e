// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use strum::{EnumCount, EnumIter};

use super::{ButtonEvent, ButtonEventKind, NO_BUTTON_INDEX};
use crate::midi::{ChannelMessage, MidiMessageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[repr(u8)]
pub enum Button {
    Play,
    Record,
    Automate,
    FixedLength,
    New,
    Duplicate,
    Quantize,
    DoubleLoop,
    Convert,
    Undo,
    Delete,
    TapTempo,
    Metronome,
    /// The row of 8 buttons above the display
    DisplayTop,
    /// The row of 8 buttons below the display
    DisplayBottom,
    /// The column of 8 buttons right of the pads
    Scene,
    AddDevice,
    AddTrack,
    Master,
    Setup,
    User,
    Device,
    Browse,
    Mix,
    Clip,
    Left,
    Up,
    Right,
    Down,
    Repeat,
    Accent,
    Scale,
    Layout,
    Note,
    Session,
    PageLeft,
    PageRight,
    OctaveUp,
    OctaveDown,
    Shift,
    Select,
}

/// Number of buttons in each of the display rows and the scene column.
pub const BUTTON_ROW_LEN: u8 = 8;

pub const DISPLAY_TOP_ROW_CC_START: u8 = 102;

pub const DISPLAY_BOTTOM_ROW_CC_START: u8 = 20;

/// The scene column is numbered bottom-up, i.e. this is the top button.
pub const SCENE_COLUMN_CC_END: u8 = 43;

/// Control change numbers of all single buttons.
const BUTTON_CC_NUMBERS: &[(Button, u8)] = &[
    (Button::Play, 85),
    (Button::Record, 86),
    (Button::Automate, 89),
    (Button::FixedLength, 90),
    (Button::New, 87),
    (Button::Duplicate, 88),
    (Button::Quantize, 116),
    (Button::DoubleLoop, 117),
    (Button::Convert, 35),
    (Button::Undo, 119),
    (Button::Delete, 118),
    (Button::TapTempo, 3),
    (Button::Metronome, 9),
    (Button::AddDevice, 52),
    (Button::AddTrack, 53),
    (Button::Master, 28),
    (Button::Setup, 30),
    (Button::User, 59),
    (Button::Device, 110),
    (Button::Browse, 111),
    (Button::Mix, 112),
    (Button::Clip, 113),
    (Button::Left, 44),
    (Button::Up, 46),
    (Button::Right, 45),
    (Button::Down, 47),
    (Button::Repeat, 56),
    (Button::Accent, 57),
    (Button::Scale, 58),
    (Button::Layout, 31),
    (Button::Note, 50),
    (Button::Session, 51),
    (Button::PageLeft, 62),
    (Button::PageRight, 63),
    (Button::OctaveUp, 55),
    (Button::OctaveDown, 54),
    (Button::Shift, 49),
    (Button::Select, 48),
];

const fn row_index(cc_number: u8, start: u8) -> Option<u8> {
    if cc_number >= start && cc_number < start + BUTTON_ROW_LEN {
        Some(cc_number - start)
    } else {
        None
    }
}

fn row_button(cc_number: u8) -> Option<(Button, u8)> {
    if let Some(index) = row_index(cc_number, DISPLAY_TOP_ROW_CC_START) {
        return Some((Button::DisplayTop, index));
    }
    if let Some(index) = row_index(cc_number, DISPLAY_BOTTOM_ROW_CC_START) {
        return Some((Button::DisplayBottom, index));
    }
    if cc_number <= SCENE_COLUMN_CC_END && cc_number > SCENE_COLUMN_CC_END - BUTTON_ROW_LEN {
        return Some((Button::Scene, SCENE_COLUMN_CC_END - cc_number));
    }
    None
}

impl Button {
    /// Look up a single button.
    ///
    /// Buttons in rows and columns are not considered.
    #[must_use]
    pub fn from_cc_number(cc_number: u8) -> Option<Self> {
        BUTTON_CC_NUMBERS
            .iter()
            .find_map(|&(button, number)| (number == cc_number).then_some(button))
    }

    /// The control change number of a single button.
    ///
    /// Returns `None` for rows and columns of buttons.
    #[must_use]
    pub fn cc_number(self) -> Option<u8> {
        BUTTON_CC_NUMBERS
            .iter()
            .find_map(|&(button, number)| (button == self).then_some(number))
    }

    /// Buttons that consist of a row or column of 8 buttons.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::DisplayTop | Self::DisplayBottom | Self::Scene)
    }
}

/// The control change number of a button, e.g. for setting its LED.
///
/// Rows and columns require an index, single buttons must not have one.
#[must_use]
pub fn button_cc_number(button: Button, index: Option<u8>) -> Option<u8> {
    match (button, index) {
        (Button::DisplayTop, Some(index)) if index < BUTTON_ROW_LEN => {
            Some(DISPLAY_TOP_ROW_CC_START + index)
        }
        (Button::DisplayBottom, Some(index)) if index < BUTTON_ROW_LEN => {
            Some(DISPLAY_BOTTOM_ROW_CC_START + index)
        }
        (Button::Scene, Some(index)) if index < BUTTON_ROW_LEN => Some(SCENE_COLUMN_CC_END - index),
        (button, None) => button.cc_number(),
        _ => None,
    }
}

pub(super) fn decode_button(msg: &ChannelMessage) -> Option<ButtonEvent> {
    if msg.kind != MidiMessageKind::ControlChange {
        return None;
    }
    let cc_number = msg.data1;
    let (button, index) = match row_button(cc_number) {
        Some((button, index)) => (button, index),
        None => (Button::from_cc_number(cc_number)?, NO_BUTTON_INDEX),
    };
    let kind = if msg.data2 == 0 {
        ButtonEventKind::Released
    } else {
        ButtonEventKind::Pressed
    };
    Some(ButtonEvent {
        kind,
        button,
        index,
    })
}
