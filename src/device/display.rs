// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::Push;
use crate::{
    codec::{pack7, u7_pair_to_u14},
    display::{send_frame, DisplayConnection, PixelBuffer},
    ensure_reply_len,
    midi::MidiOutputConnection,
    sysex::command,
    ConnectionError, Result,
};

impl<C, D> Push<C, D>
where
    C: MidiOutputConnection,
    D: DisplayConnection,
{
    /// Backlight brightness in the range [0, 255].
    pub fn set_display_brightness(&self, brightness: u8) -> Result<()> {
        self.call(
            command::SET_DISPLAY_BRIGHTNESS,
            &pack7(brightness.into()),
        )
        .map(drop)
    }

    pub fn display_brightness(&self) -> Result<u8> {
        let reply = self.call(command::GET_DISPLAY_BRIGHTNESS, &[])?;
        ensure_reply_len(command::GET_DISPLAY_BRIGHTNESS, &reply, 2)?;
        Ok(u8::try_from(u7_pair_to_u14(reply[0], reply[1])).unwrap_or(u8::MAX))
    }

    /// Encode and transfer a full frame.
    ///
    /// The device turns the display off if no frame arrives for 2 seconds.
    pub fn draw_frame(&self, pixels: &PixelBuffer) -> Result<()> {
        let mut display = self.display.lock();
        let super::DisplayState { connection, frame } = &mut *display;
        let Some(connection) = connection.as_mut() else {
            return Err(ConnectionError::NotConnected.into());
        };
        frame.encode_from(pixels);
        send_frame(connection, frame)
    }
}
