// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use super::*;

#[test]
fn pack7_splits_low_and_high_digit() {
    assert_eq!([0x00, 0x00], pack7(0));
    assert_eq!([0x7f, 0x00], pack7(127));
    assert_eq!([0x00, 0x01], pack7(128));
    assert_eq!([0x7f, 0x7f], pack7(U14_MASK));
}

#[test]
fn pack7_round_trip() {
    for value in 0..=U14_MASK {
        assert_eq!(u32::from(value), unpack(&pack7(value)));
    }
}

#[test]
fn pack7_output_is_7_bit_safe() {
    for value in [0, 1, 0x3fff, 0x4000, 0x8000, u16::MAX] {
        assert!(pack7(value).iter().all(|byte| byte & 0x80 == 0));
    }
}

#[test]
fn pack11_masks_to_11_bits() {
    assert_eq!([0x00, 0x08], pack11(1024));
    assert_eq!([0x7f, 0x0f], pack11(U11_MASK));
    assert_eq!(pack11(0x07ff), pack11(0xffff));
    for value in 0..=U11_MASK {
        assert_eq!(u32::from(value), unpack(&pack11(value)));
    }
}

#[test]
fn pack21_round_trip() {
    for value in (0..=U21_MASK).step_by(97).chain([U21_MASK, 1 << 20, 1 << 14]) {
        assert_eq!(value, unpack(&pack21(value)));
    }
}

#[test]
fn pack21_masks_to_21_bits() {
    assert_eq!(pack21(0), pack21(1 << 21));
    assert_eq!([0x7f, 0x7f, 0x7f], pack21(u32::MAX));
}

#[test]
fn unpack_ignores_excess_digits() {
    assert_eq!(0, unpack(&[]));
    assert_eq!(0x0fff_ffff, unpack(&[0x7f, 0x7f, 0x7f, 0x7f, 0x7f]));
}

#[test]
fn u7_pair_to_u14_matches_unpack() {
    assert_eq!(0x3fff, u7_pair_to_u14(0x7f, 0x7f));
    assert_eq!(129, u7_pair_to_u14(1, 1));
    assert_eq!(u32::from(u7_pair_to_u14(0x12, 0x34)), unpack(&[0x12, 0x34]));
}

#[test]
fn pwm_correction_factor() {
    assert_eq!(5_000_000 / 20 - 42_752, pwm_correction(MIN_LED_PWM_FREQ_HZ));
    assert_eq!(5_000_000 / 116 - 42_752, pwm_correction(MAX_LED_PWM_FREQ_HZ));
    // Frequencies above the supported range wrap around and are masked.
    assert_eq!(
        (5_000_000u32 / 200).wrapping_sub(42_752) & U21_MASK,
        pwm_correction(200)
    );
}

#[test]
fn curve_chunks_are_tagged_with_their_start_index() {
    let entries: Vec<u8> = (0..32).collect();
    let chunks: Vec<_> = curve_chunks(&entries, 8).collect();
    assert_eq!(4, chunks.len());
    assert_eq!(curve_chunk_count(32, 8), chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(index * 8, usize::from(chunk.start));
        assert_eq!(&entries[index * 8..index * 8 + 8], chunk.entries);
    }
}

#[test]
fn curve_chunks_last_chunk_may_be_shorter() {
    let entries = [1u8; 10];
    let chunks: Vec<_> = curve_chunks(&entries, 4).collect();
    assert_eq!(3, chunks.len());
    assert_eq!(3, curve_chunk_count(entries.len(), 4));
    assert_eq!(8, chunks[2].start);
    assert_eq!(2, chunks[2].entries.len());
}

#[test]
fn velocity_curve_is_sent_in_16_chunks() {
    let entries = [0u8; 128];
    assert_eq!(16, curve_chunks(&entries, 8).count());
}
