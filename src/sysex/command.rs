// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Sysex command codes.
//!
//! The codes are kept as plain data so that the wire values stay exact.

// -- LED -- //
pub const SET_LED_COLOR_PALETTE_ENTRY: u8 = 0x03;
pub const GET_LED_COLOR_PALETTE_ENTRY: u8 = 0x04;
pub const REAPPLY_COLOR_PALETTE: u8 = 0x05;
pub const SET_LED_BRIGHTNESS: u8 = 0x06;
pub const GET_LED_BRIGHTNESS: u8 = 0x07;
pub const SET_LED_PWM_FREQ_CORRECTION: u8 = 0x0b;
pub const SET_LED_WHITE_BALANCE: u8 = 0x14;
pub const GET_LED_WHITE_BALANCE: u8 = 0x15;

// -- Display -- //
pub const SET_DISPLAY_BRIGHTNESS: u8 = 0x08;
pub const GET_DISPLAY_BRIGHTNESS: u8 = 0x09;

// -- Misc -- //
pub const SET_MIDI_MODE: u8 = 0x0a;
pub const REQUEST_STATISTICS: u8 = 0x1a;

// -- Touch strip -- //
pub const SET_TOUCH_STRIP_CONFIGURATION: u8 = 0x17;
pub const GET_TOUCH_STRIP_CONFIGURATION: u8 = 0x18;
pub const SET_TOUCH_STRIP_LEDS: u8 = 0x19;

// -- Pads -- //
pub const SET_PAD_PARAMETERS: u8 = 0x1b;
pub const SET_AFTERTOUCH_MODE: u8 = 0x1e;
pub const GET_AFTERTOUCH_MODE: u8 = 0x1f;
pub const SET_PAD_VELOCITY_CURVE_ENTRY: u8 = 0x20;
pub const SELECT_PAD_SETTINGS: u8 = 0x28;
pub const GET_SELECTED_PAD_SETTINGS: u8 = 0x29;

// -- Pedals -- //
pub const SAMPLE_PEDAL_DATA: u8 = 0x0c;
pub const CONFIGURE_PEDAL: u8 = 0x30;
pub const SET_PEDAL_CURVE_LIMITS: u8 = 0x31;
pub const SET_PEDAL_CURVE_ENTRIES: u8 = 0x32;

/// Commands that are answered by the device.
///
/// A call of any other command returns immediately after sending.
pub const COMMANDS_WITH_REPLY: &[u8] = &[
    GET_LED_COLOR_PALETTE_ENTRY,
    GET_LED_BRIGHTNESS,
    GET_LED_WHITE_BALANCE,
    GET_DISPLAY_BRIGHTNESS,
    REQUEST_STATISTICS,
    GET_TOUCH_STRIP_CONFIGURATION,
    GET_AFTERTOUCH_MODE,
    GET_SELECTED_PAD_SETTINGS,
    SAMPLE_PEDAL_DATA,
];

const COMMAND_NAMES: &[(u8, &str)] = &[
    (SET_LED_COLOR_PALETTE_ENTRY, "set LED color palette entry"),
    (GET_LED_COLOR_PALETTE_ENTRY, "get LED color palette entry"),
    (REAPPLY_COLOR_PALETTE, "reapply color palette"),
    (SET_LED_BRIGHTNESS, "set LED brightness"),
    (GET_LED_BRIGHTNESS, "get LED brightness"),
    (SET_DISPLAY_BRIGHTNESS, "set display brightness"),
    (GET_DISPLAY_BRIGHTNESS, "get display brightness"),
    (SET_MIDI_MODE, "set MIDI mode"),
    (SET_LED_PWM_FREQ_CORRECTION, "set LED PWM frequency correction"),
    (SAMPLE_PEDAL_DATA, "sample pedal data"),
    (SET_LED_WHITE_BALANCE, "set LED white balance"),
    (GET_LED_WHITE_BALANCE, "get LED white balance"),
    (SET_TOUCH_STRIP_CONFIGURATION, "set touch strip configuration"),
    (GET_TOUCH_STRIP_CONFIGURATION, "get touch strip configuration"),
    (SET_TOUCH_STRIP_LEDS, "set touch strip LEDs"),
    (REQUEST_STATISTICS, "request statistics"),
    (SET_PAD_PARAMETERS, "set pad parameters"),
    (SET_AFTERTOUCH_MODE, "set aftertouch mode"),
    (GET_AFTERTOUCH_MODE, "get aftertouch mode"),
    (SET_PAD_VELOCITY_CURVE_ENTRY, "set pad velocity curve entry"),
    (SELECT_PAD_SETTINGS, "select pad settings"),
    (GET_SELECTED_PAD_SETTINGS, "get selected pad settings"),
    (CONFIGURE_PEDAL, "configure pedal"),
    (SET_PEDAL_CURVE_LIMITS, "set pedal curve limits"),
    (SET_PEDAL_CURVE_ENTRIES, "set pedal curve entries"),
];

/// Human-readable name of a command code, for diagnostics.
#[must_use]
pub fn command_name(command: u8) -> Option<&'static str> {
    COMMAND_NAMES
        .iter()
        .find_map(|&(code, name)| (code == command).then_some(name))
}
