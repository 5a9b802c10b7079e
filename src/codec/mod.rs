// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

//! Packing of multi-byte parameter values into 7-bit-safe sysex arguments.
//!
//! All multi-byte values are sent little-endian in 7-bit digits, i.e. the
//! first byte carries the lowest 7 bits. Every byte produced here has its
//! most significant bit cleared.

/// Mask of a single 7-bit digit.
pub const U7_MASK: u8 = 0x7f;

const U7_BITS: u32 = 7;

/// Maximum number of 7-bit digits that [`unpack`] composes into a `u32`.
pub const MAX_UNPACK_DIGITS: usize = 4;

/// Two 7-bit digits, i.e. 14 significant bits.
pub const U14_MASK: u16 = (1 << (2 * U7_BITS)) - 1;

/// 11 significant bits, used for white balance factors.
pub const U11_MASK: u16 = (1 << 11) - 1;

/// Three 7-bit digits, i.e. 21 significant bits.
pub const U21_MASK: u32 = (1 << (3 * U7_BITS)) - 1;

/// Split a value into a low and a high 7-bit digit.
///
/// Only the lower 14 bits fit into two 7-bit-safe bytes. Higher bits
/// are discarded.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn pack7(value: u16) -> [u8; 2] {
    let value = value & U14_MASK;
    [(value as u8) & U7_MASK, (value >> U7_BITS) as u8]
}

/// Split an 11-bit value into a low 7-bit digit and the remaining 4 bits.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn pack11(value: u16) -> [u8; 2] {
    let value = value & U11_MASK;
    [(value as u8) & U7_MASK, (value >> U7_BITS) as u8]
}

/// Split a 21-bit value into three 7-bit digits.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn pack21(value: u32) -> [u8; 3] {
    let value = value & U21_MASK;
    [
        (value as u8) & U7_MASK,
        ((value >> U7_BITS) as u8) & U7_MASK,
        ((value >> (2 * U7_BITS)) as u8) & U7_MASK,
    ]
}

/// Compose 7-bit digits back into a value.
///
/// Inverse of [`pack7`], [`pack11`], and [`pack21`]. Only the first
/// [`MAX_UNPACK_DIGITS`] bytes are considered.
#[must_use]
pub fn unpack(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(MAX_UNPACK_DIGITS)
        .enumerate()
        .fold(0, |value, (digit, byte)| {
            #[allow(clippy::cast_possible_truncation)]
            let shift = digit as u32 * U7_BITS;
            value | (u32::from(byte & U7_MASK) << shift)
        })
}

/// Compose two 7-bit digits into a 14-bit value.
#[must_use]
pub const fn u7_pair_to_u14(lo: u8, hi: u8) -> u16 {
    ((hi & U7_MASK) as u16) << U7_BITS | (lo & U7_MASK) as u16
}

/// Lowest supported LED PWM frequency in Hz.
pub const MIN_LED_PWM_FREQ_HZ: u32 = 20;

/// Highest supported LED PWM frequency in Hz.
pub const MAX_LED_PWM_FREQ_HZ: u32 = 116;

const PWM_CORRECTION_DIVIDEND: u32 = 5_000_000;
const PWM_CORRECTION_OFFSET: u32 = 42_752;

/// The PWM correction factor for the given LED PWM frequency.
///
/// The result contains 21 significant bits and is ready for [`pack21`].
/// The frequency must not be zero.
#[must_use]
pub const fn pwm_correction(freq_hz: u32) -> u32 {
    debug_assert!(freq_hz > 0);
    (PWM_CORRECTION_DIVIDEND / freq_hz).wrapping_sub(PWM_CORRECTION_OFFSET) & U21_MASK
}

/// A contiguous section of a curve table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveChunk<'a> {
    /// Index of the first entry within the table
    pub start: u8,
    pub entries: &'a [u8],
}

/// Split a curve table into chunks of a fixed size.
///
/// Yields `ceil(entries.len() / entries_per_chunk)` chunks, each tagged
/// with its starting offset. The last chunk might be shorter.
pub fn curve_chunks(
    entries: &[u8],
    entries_per_chunk: usize,
) -> impl Iterator<Item = CurveChunk<'_>> + '_ {
    debug_assert!(entries_per_chunk > 0);
    debug_assert!(entries.len() <= usize::from(u8::MAX) + 1);
    entries
        .chunks(entries_per_chunk)
        .enumerate()
        .map(move |(index, entries)| {
            #[allow(clippy::cast_possible_truncation)]
            let start = (index * entries_per_chunk) as u8;
            CurveChunk { start, entries }
        })
}

/// Number of chunks needed for transmitting a curve table.
#[must_use]
pub const fn curve_chunk_count(num_entries: usize, entries_per_chunk: usize) -> usize {
    num_entries.div_ceil(entries_per_chunk)
}

#[cfg(test)]
mod tests;
