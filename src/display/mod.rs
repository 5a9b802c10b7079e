// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Encoding of pixels into the USB payload of the display.

use derive_more::Deref;

use crate::Result;

#[cfg(all(feature = "usb", not(target_family = "wasm")))]
pub mod rusb;

pub const DISPLAY_WIDTH: usize = 960;
pub const DISPLAY_HEIGHT: usize = 160;

/// Two bytes per pixel.
pub const ROW_PIXEL_BYTES: usize = DISPLAY_WIDTH * 2;

/// Zero bytes that follow the pixels of each row.
pub const ROW_PADDING_BYTES: usize = 128;

pub const ROW_STRIDE: usize = ROW_PIXEL_BYTES + ROW_PADDING_BYTES;

/// Length of the frame transfer.
///
/// Twice the number of rows that are actually drawn. This is the observed
/// transfer size and must not be changed without verifying it on the device.
pub const FRAME_BUFFER_LEN: usize = ROW_STRIDE * 2 * DISPLAY_HEIGHT;

/// Sent as a separate transfer before each frame.
pub const FRAME_HEADER: [u8; 16] = [
    0xff, 0xcc, 0xaa, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// XOR mask applied to all pixel bytes, restarting with each row.
pub const SIGNAL_SHAPING_PATTERN: [u8; 4] = [0xe7, 0xf3, 0xe7, 0xff];

/// 16-bit pixels of the display, top to bottom and left to right.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Box<[u16]>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &DISPLAY_WIDTH)
            .field("height", &DISPLAY_HEIGHT)
            .finish_non_exhaustive()
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelBuffer {
    /// All pixels black.
    #[must_use]
    pub fn new() -> Self {
        Self::filled(0)
    }

    #[must_use]
    pub fn filled(pixel: u16) -> Self {
        Self {
            pixels: vec![pixel; DISPLAY_WIDTH * DISPLAY_HEIGHT].into_boxed_slice(),
        }
    }

    /// Create a buffer from row-major pixels.
    ///
    /// Returns `None` if the number of pixels does not match the display.
    #[must_use]
    pub fn from_pixels(pixels: impl Into<Box<[u16]>>) -> Option<Self> {
        let pixels = pixels.into();
        (pixels.len() == DISPLAY_WIDTH * DISPLAY_HEIGHT).then_some(Self { pixels })
    }

    const fn index(row: usize, column: usize) -> Option<usize> {
        if row >= DISPLAY_HEIGHT || column >= DISPLAY_WIDTH {
            return None;
        }
        Some(row * DISPLAY_WIDTH + column)
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<u16> {
        Self::index(row, column).map(|index| self.pixels[index])
    }

    /// Returns `false` if the position is outside of the display.
    pub fn set(&mut self, row: usize, column: usize, pixel: u16) -> bool {
        let Some(index) = Self::index(row, column) else {
            return false;
        };
        self.pixels[index] = pixel;
        true
    }

    pub fn fill(&mut self, pixel: u16) {
        self.pixels.fill(pixel);
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u16]> + '_ {
        self.pixels.chunks_exact(DISPLAY_WIDTH)
    }

    pub fn rows_mut(&mut self) -> impl ExactSizeIterator<Item = &mut [u16]> + '_ {
        self.pixels.chunks_exact_mut(DISPLAY_WIDTH)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.pixels
    }
}

/// The encoded frame, ready for transfer.
#[derive(Clone, PartialEq, Eq, Deref)]
#[deref(forward)]
pub struct FrameBuffer(Box<[u8]>);

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FrameBuffer").field(&self.0.len()).finish()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// A zeroed buffer.
    #[must_use]
    pub fn new() -> Self {
        Self(vec![0; FRAME_BUFFER_LEN].into_boxed_slice())
    }

    #[must_use]
    pub fn encode(pixels: &PixelBuffer) -> Self {
        let mut frame = Self::new();
        frame.encode_from(pixels);
        frame
    }

    /// Re-encode the buffer in place.
    pub fn encode_from(&mut self, pixels: &PixelBuffer) {
        let Self(bytes) = self;
        let mut rows = bytes.chunks_exact_mut(ROW_STRIDE);
        for (row_bytes, row_pixels) in rows.by_ref().zip(pixels.rows()) {
            encode_row(row_pixels, row_bytes);
        }
        for unused_row in rows {
            unused_row.fill(0);
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn encode_row(pixels: &[u16], row: &mut [u8]) {
    debug_assert_eq!(DISPLAY_WIDTH, pixels.len());
    debug_assert_eq!(ROW_STRIDE, row.len());
    let (pixel_bytes, padding) = row.split_at_mut(ROW_PIXEL_BYTES);
    let pattern = SIGNAL_SHAPING_PATTERN.iter().cycle();
    for ((byte, value), mask) in pixel_bytes
        .iter_mut()
        .zip(pixels.iter().flat_map(|pixel| pixel.to_le_bytes()))
        .zip(pattern)
    {
        *byte = value ^ mask;
    }
    padding.fill(0);
}

/// Bulk endpoint of the display.
pub trait DisplayConnection: Send {
    fn write_bulk(&mut self, data: &[u8]) -> Result<()>;
}

impl<C> DisplayConnection for Box<C>
where
    C: DisplayConnection + ?Sized,
{
    fn write_bulk(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bulk(data)
    }
}

/// Transfer a frame: header first, then the pixel data.
pub fn send_frame<C>(connection: &mut C, frame: &FrameBuffer) -> Result<()>
where
    C: DisplayConnection + ?Sized,
{
    connection.write_bulk(&FRAME_HEADER)?;
    connection.write_bulk(frame.as_bytes())
}
