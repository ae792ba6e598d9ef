//! Binary serialization of index records.
//!
//! All multi-byte fields are encoded in little endian, independent
//! of the byte order configured for column values.
use crate::error::{Error, Result};
use std::mem;

pub trait Serde {
    /// Serialize a u64 value to a byte slice.
    fn ser_u64(&mut self, idx: usize, val: u64) -> usize;

    /// Serialize a i64 value to a byte slice.
    fn ser_i64(&mut self, idx: usize, val: i64) -> usize;

    /// Serialize a f64 value to a byte slice.
    fn ser_f64(&mut self, idx: usize, val: f64) -> usize;

    /// Serialize a u32 value to a byte slice.
    fn ser_u32(&mut self, idx: usize, val: u32) -> usize;

    /// Serialize a u8 value to a byte slice.
    fn ser_u8(&mut self, idx: usize, val: u8) -> usize;

    /// Serialize bool value.
    #[inline]
    fn ser_bool(&mut self, idx: usize, val: bool) -> usize {
        self.ser_u8(idx, if val { 1 } else { 0 })
    }

    /// Serialize byte slice.
    fn ser_byte_slice(&mut self, idx: usize, val: &[u8]) -> usize;

    /// Returns size (number of bytes).
    fn size(&self) -> usize;

    /// Deserialize a u64 value from a byte slice.
    fn deser_u64(&self, idx: usize) -> Result<(usize, u64)>;

    /// Deserialize a i64 value from a byte slice.
    fn deser_i64(&self, idx: usize) -> Result<(usize, i64)>;

    /// Deserialize a f64 value from a byte slice.
    fn deser_f64(&self, idx: usize) -> Result<(usize, f64)>;

    /// Deserialize a u32 value from a byte slice.
    fn deser_u32(&self, idx: usize) -> Result<(usize, u32)>;

    /// Deserialize a u8 value from a byte slice.
    fn deser_u8(&self, idx: usize) -> Result<(usize, u8)>;

    /// Deserialize bool value.
    #[inline]
    fn deser_bool(&self, idx: usize) -> Result<(usize, bool)> {
        self.deser_u8(idx).map(|(i, r)| (i, r != 0))
    }

    /// Deserialize byte slice.
    fn deser_byte_slice(&self, idx: usize, len: usize) -> Result<(usize, &[u8])>;
}

impl Serde for [u8] {
    #[inline]
    fn ser_u64(&mut self, idx: usize, val: u64) -> usize {
        self.ser_byte_slice(idx, &val.to_le_bytes())
    }

    #[inline]
    fn ser_i64(&mut self, idx: usize, val: i64) -> usize {
        self.ser_byte_slice(idx, &val.to_le_bytes())
    }

    #[inline]
    fn ser_f64(&mut self, idx: usize, val: f64) -> usize {
        self.ser_byte_slice(idx, &val.to_le_bytes())
    }

    #[inline]
    fn ser_u32(&mut self, idx: usize, val: u32) -> usize {
        self.ser_byte_slice(idx, &val.to_le_bytes())
    }

    #[inline]
    fn ser_u8(&mut self, idx: usize, val: u8) -> usize {
        debug_assert!(idx < self.len());
        self[idx] = val;
        idx + mem::size_of::<u8>()
    }

    #[inline]
    fn ser_byte_slice(&mut self, idx: usize, val: &[u8]) -> usize {
        debug_assert!(idx + val.len() <= self.len());
        self[idx..idx + val.len()].copy_from_slice(val);
        idx + val.len()
    }

    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    fn deser_u64(&self, idx: usize) -> Result<(usize, u64)> {
        let (idx, bytes) = self.deser_byte_slice(idx, mem::size_of::<u64>())?;
        Ok((idx, u64::from_le_bytes(bytes.try_into()?)))
    }

    #[inline]
    fn deser_i64(&self, idx: usize) -> Result<(usize, i64)> {
        let (idx, bytes) = self.deser_byte_slice(idx, mem::size_of::<i64>())?;
        Ok((idx, i64::from_le_bytes(bytes.try_into()?)))
    }

    #[inline]
    fn deser_f64(&self, idx: usize) -> Result<(usize, f64)> {
        let (idx, bytes) = self.deser_byte_slice(idx, mem::size_of::<f64>())?;
        Ok((idx, f64::from_le_bytes(bytes.try_into()?)))
    }

    #[inline]
    fn deser_u32(&self, idx: usize) -> Result<(usize, u32)> {
        let (idx, bytes) = self.deser_byte_slice(idx, mem::size_of::<u32>())?;
        Ok((idx, u32::from_le_bytes(bytes.try_into()?)))
    }

    #[inline]
    fn deser_u8(&self, idx: usize) -> Result<(usize, u8)> {
        if idx >= self.len() {
            return Err(Error::InvalidFormat);
        }
        Ok((idx + mem::size_of::<u8>(), self[idx]))
    }

    #[inline]
    fn deser_byte_slice(&self, idx: usize, len: usize) -> Result<(usize, &[u8])> {
        if idx + len > self.len() {
            return Err(Error::InvalidFormat);
        }
        Ok((idx + len, &self[idx..idx + len]))
    }
}

/// Defines how to serialize self to bytes.
///
/// This trait is designed to write a serialized object with a known
/// size to a fixed-sized buffer.
pub trait Ser<'a> {
    /// length of serialized bytes.
    fn ser_len(&self) -> usize;

    /// Serialize object into fix-sized byte slice.
    /// The buffer is guaranteed to be big enough.
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize;

    /// Serialize object into a new byte vector.
    #[inline]
    fn ser_to_vec(&self) -> Vec<u8> {
        let mut res = vec![0u8; self.ser_len()];
        let idx = self.ser(&mut res[..], 0);
        debug_assert_eq!(idx, res.len());
        res
    }
}

/// Defines how to deserialize objects from bytes.
///
/// The result is owned by the caller.
pub trait Deser: Sized {
    /// Deserialize objects from input.
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)>;
}

macro_rules! impl_serde_primitive {
    ($t:ty, $ser:ident, $deser:ident) => {
        impl Ser<'_> for $t {
            #[inline]
            fn ser_len(&self) -> usize {
                mem::size_of::<$t>()
            }

            #[inline]
            fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
                out.$ser(start_idx, *self)
            }
        }

        impl Deser for $t {
            #[inline]
            fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
                input.$deser(start_idx)
            }
        }
    };
}

impl_serde_primitive!(u64, ser_u64, deser_u64);
impl_serde_primitive!(i64, ser_i64, deser_i64);
impl_serde_primitive!(f64, ser_f64, deser_f64);
impl_serde_primitive!(u32, ser_u32, deser_u32);
impl_serde_primitive!(u8, ser_u8, deser_u8);
impl_serde_primitive!(bool, ser_bool, deser_bool);

impl<'a, T: Ser<'a>> Ser<'a> for [T] {
    #[inline]
    fn ser_len(&self) -> usize {
        // 8-byte vector length + data
        mem::size_of::<u64>() + self.iter().map(|v| v.ser_len()).sum::<usize>()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let mut idx = out.ser_u64(start_idx, self.len() as u64);
        for v in self.iter() {
            idx = v.ser(out, idx);
        }
        idx
    }
}

impl<T: Deser> Deser for Vec<T> {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (mut idx, len) = input.deser_u64(start_idx)?;
        // each element takes at least one byte.
        if len as usize > input.size().saturating_sub(idx) {
            return Err(Error::InvalidFormat);
        }
        let mut vec = Vec::with_capacity(len as usize);
        for _ in 0..len {
            let (idx0, val) = T::deser(input, idx)?;
            idx = idx0;
            vec.push(val);
        }
        Ok((idx, vec))
    }
}

impl<'a, T: Ser<'a>> Ser<'a> for Vec<T> {
    #[inline]
    fn ser_len(&self) -> usize {
        self.as_slice().ser_len()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        self.as_slice().ser(out, start_idx)
    }
}

impl<'a, T: Ser<'a>> Ser<'a> for Option<T> {
    #[inline]
    fn ser_len(&self) -> usize {
        // 1-byte bool + data
        match self.as_ref() {
            Some(v) => mem::size_of::<u8>() + v.ser_len(),
            None => mem::size_of::<u8>(),
        }
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        match self.as_ref() {
            Some(v) => {
                let idx = out.ser_bool(start_idx, true);
                v.ser(out, idx)
            }
            None => out.ser_bool(start_idx, false),
        }
    }
}

impl<T: Deser> Deser for Option<T> {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, flag) = input.deser_bool(start_idx)?;
        if flag {
            let (idx, v) = T::deser(input, idx)?;
            Ok((idx, Some(v)))
        } else {
            Ok((idx, None))
        }
    }
}

/// Length-prefixed byte string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteString(pub Vec<u8>);

impl Ser<'_> for ByteString {
    #[inline]
    fn ser_len(&self) -> usize {
        mem::size_of::<u32>() + self.0.len()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = out.ser_u32(start_idx, self.0.len() as u32);
        out.ser_byte_slice(idx, &self.0)
    }
}

impl Deser for ByteString {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, len) = input.deser_u32(start_idx)?;
        let (idx, bytes) = input.deser_byte_slice(idx, len as usize)?;
        Ok((idx, ByteString(bytes.to_vec())))
    }
}
