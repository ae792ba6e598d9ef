//! Bit packing of boolean sequences, used by isnull bitmaps
//! and boolean values.
//!
//! With little endian, the i-th bool is stored at bit `i % 8` of
//! byte `i / 8`, counting from the least significant bit.
//! With big endian, it is stored at bit `7 - i % 8`, counting
//! from the most significant bit.
use crate::buf::ByteBuffer;
use crate::conf::ByteOrder;

/// Returns number of bytes to hold given number of bits.
#[inline]
pub fn packed_len(count: usize) -> usize {
    count.div_ceil(8)
}

#[inline]
fn bit_mask(idx: usize, order: ByteOrder) -> u8 {
    match order {
        ByteOrder::LittleEndian => 1 << (idx & 7),
        ByteOrder::BigEndian => 0x80 >> (idx & 7),
    }
}

/// Pack first `count` bools into `ceil(count/8)` bytes.
#[inline]
pub fn bit_wise_compact(bits: &[bool], count: usize, order: ByteOrder) -> Vec<u8> {
    debug_assert!(count <= bits.len());
    let mut res = vec![0u8; packed_len(count)];
    for (idx, _) in bits[..count].iter().enumerate().filter(|(_, b)| **b) {
        res[idx >> 3] |= bit_mask(idx, order);
    }
    res
}

/// Pack first `count` bools and append the bytes to output buffer.
#[inline]
pub fn bit_wise_compact_into(bits: &[bool], count: usize, order: ByteOrder, out: &mut ByteBuffer) {
    debug_assert!(count <= bits.len());
    for chunk in bits[..count].chunks(8) {
        let mut byte = 0u8;
        for (idx, b) in chunk.iter().enumerate() {
            if *b {
                byte |= bit_mask(idx, order);
            }
        }
        out.put_u8(byte);
    }
}

/// Unpack `out.len()` bools from packed bytes, starting at
/// bit `skip_bits` of first byte.
///
/// Returns false if input does not contain enough bits.
#[inline]
pub fn bit_wise_decompact(input: &[u8], skip_bits: usize, order: ByteOrder, out: &mut [bool]) -> bool {
    if packed_len(skip_bits + out.len()) > input.len() {
        return false;
    }
    for (i, b) in out.iter_mut().enumerate() {
        let idx = skip_bits + i;
        *b = input[idx >> 3] & bit_mask(idx, order) != 0;
    }
    true
}
