//! Bit-level signal codec for the exchange buffers.
//!
//! The wire layout is a packed bit stream, LSB-first within each byte.
//! Single-bit signals pack back to back; multi-bit signals are aligned
//! up to the next byte boundary before their value, so the stream stays
//! deterministic for any mix of digital and group signals. Unbound
//! signals transfer nothing but still consume their aligned space, which
//! keeps the layout identical whether or not every signal has a live
//! handle attached.

use std::sync::Arc;

use thiserror::Error;

use crate::signal::IoSignal;

/// Accepted multi-bit widths besides single bits.
pub const SUPPORTED_WIDTHS: [u32; 4] = [1, 8, 16, 32];

pub fn is_supported_width(bits: u32) -> bool {
    SUPPORTED_WIDTHS.contains(&bits)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("signal '{signal}' ends at bit {end_bit} but the buffer holds {buffer_bits} bits")]
    OutOfRange {
        signal: String,
        end_bit: usize,
        buffer_bits: usize,
    },
}

// ─── Bit primitives ─────────────────────────────────────────────────

#[inline]
fn write_bit(buffer: &mut [u8], bit: usize, value: bool) {
    let mask = 1u8 << (bit % 8);
    if value {
        buffer[bit / 8] |= mask;
    } else {
        buffer[bit / 8] &= !mask;
    }
}

#[inline]
fn read_bit(buffer: &[u8], bit: usize) -> bool {
    buffer[bit / 8] & (1 << (bit % 8)) != 0
}

#[inline]
fn align_to_byte(bit: usize) -> usize {
    bit.div_ceil(8) * 8
}

// ─── Encode / decode ────────────────────────────────────────────────

/// Write the signals' current values into `buffer`, starting at
/// `byte_offset`. Signals must be in registry layout order.
pub fn encode(
    signals: &[Arc<IoSignal>],
    buffer: &mut [u8],
    byte_offset: usize,
) -> Result<(), CodecError> {
    let buffer_bits = buffer.len() * 8;
    let mut cursor = byte_offset * 8;

    for signal in signals {
        let width = signal.length() as usize;
        let start = if width == 1 { cursor } else { align_to_byte(cursor) };
        let end = start + width;
        if end > buffer_bits {
            return Err(CodecError::OutOfRange {
                signal: signal.name().to_string(),
                end_bit: end,
                buffer_bits,
            });
        }

        if signal.is_bound() {
            if width == 1 {
                write_bit(buffer, start, signal.as_bool());
            } else {
                let bits = signal.as_bits();
                for i in 0..width {
                    write_bit(buffer, start + i, bits >> i & 1 != 0);
                }
            }
        }
        cursor = end;
    }
    Ok(())
}

/// Read values out of `buffer` into the signals, starting at
/// `byte_offset`. Multi-bit values are interpreted as unsigned.
pub fn decode(
    signals: &[Arc<IoSignal>],
    buffer: &[u8],
    byte_offset: usize,
) -> Result<(), CodecError> {
    let buffer_bits = buffer.len() * 8;
    let mut cursor = byte_offset * 8;

    for signal in signals {
        let width = signal.length() as usize;
        let start = if width == 1 { cursor } else { align_to_byte(cursor) };
        let end = start + width;
        if end > buffer_bits {
            return Err(CodecError::OutOfRange {
                signal: signal.name().to_string(),
                end_bit: end,
                buffer_bits,
            });
        }

        if signal.is_bound() {
            if width == 1 {
                signal.set_value(if read_bit(buffer, start) { 1.0 } else { 0.0 });
            } else {
                let mut scratch = [0u8; 4];
                for i in 0..width {
                    if read_bit(buffer, start + i) {
                        scratch[i / 8] |= 1 << (i % 8);
                    }
                }
                signal.set_value(u32::from_le_bytes(scratch) as f32);
            }
        }
        cursor = end;
    }
    Ok(())
}

/// Total bit span the signal list occupies, alignment included.
pub fn layout_bits(signals: &[Arc<IoSignal>]) -> usize {
    let mut cursor = 0usize;
    for signal in signals {
        let width = signal.length() as usize;
        if width != 1 {
            cursor = align_to_byte(cursor);
        }
        cursor += width;
    }
    cursor
}

/// `layout_bits` rounded up to whole bytes.
pub fn layout_bytes(signals: &[Arc<IoSignal>]) -> usize {
    layout_bits(signals).div_ceil(8)
}
