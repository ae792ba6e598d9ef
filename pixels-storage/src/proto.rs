//! Metadata records of column chunks.
//!
//! These are plain data records. Writers populate them and the
//! file writer persists them via `Ser`/`Deser`.
use crate::error::{Error, Result};
use crate::serde::{ByteString, Deser, Ser, Serde};
use std::mem;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntegerStatistic {
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    /// None if sum overflows i64.
    pub sum: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DoubleStatistic {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub sum: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BooleanStatistic {
    pub true_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinaryStatistic {
    pub minimum: Option<ByteString>,
    pub maximum: Option<ByteString>,
    /// Total length of all values.
    pub sum: u64,
}

/// Serialized form of statistics of a pixel or a column chunk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnStatistic {
    /// Number of non-null values.
    pub number_of_values: u64,
    pub has_null: bool,
    pub int_statistics: Option<IntegerStatistic>,
    pub double_statistics: Option<DoubleStatistic>,
    pub boolean_statistics: Option<BooleanStatistic>,
    pub binary_statistics: Option<BinaryStatistic>,
}

impl ColumnStatistic {
    #[inline]
    pub fn clear(&mut self) {
        *self = ColumnStatistic::default();
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelStatistic {
    pub statistic: ColumnStatistic,
}

/// Index of one column chunk.
///
/// `pixel_positions[i]` and `pixel_statistics[i]` are appended
/// together when a pixel is finished.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnChunkIndex {
    /// Offset of isnull bitmap in column chunk content.
    pub is_null_offset: u64,
    /// Start offset of each pixel in column chunk content.
    pub pixel_positions: Vec<u64>,
    pub pixel_statistics: Vec<PixelStatistic>,
    pub little_endian: bool,
    pub nulls_padding: bool,
    pub is_null_alignment: u32,
}

impl ColumnChunkIndex {
    /// Reset all fields, including chunk-wide flags.
    #[inline]
    pub fn clear(&mut self) {
        self.is_null_offset = 0;
        self.pixel_positions.clear();
        self.pixel_statistics.clear();
        self.little_endian = false;
        self.nulls_padding = false;
        self.is_null_alignment = 0;
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        debug_assert_eq!(self.pixel_positions.len(), self.pixel_statistics.len());
        self.pixel_positions.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum EncodingKind {
    #[default]
    None = 0,
    RunLength = 1,
    Dictionary = 2,
    Delta = 3,
}

impl TryFrom<u8> for EncodingKind {
    type Error = Error;
    #[inline]
    fn try_from(value: u8) -> Result<Self> {
        let res = match value {
            0 => EncodingKind::None,
            1 => EncodingKind::RunLength,
            2 => EncodingKind::Dictionary,
            3 => EncodingKind::Delta,
            _ => return Err(Error::InvalidFormat),
        };
        Ok(res)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnEncoding {
    pub kind: EncodingKind,
    /// Only meaningful for dictionary encoding.
    pub dictionary_size: u32,
}

impl ColumnEncoding {
    #[inline]
    pub fn new(kind: EncodingKind) -> Self {
        ColumnEncoding {
            kind,
            dictionary_size: 0,
        }
    }
}

impl Ser<'_> for IntegerStatistic {
    #[inline]
    fn ser_len(&self) -> usize {
        self.minimum.ser_len() + self.maximum.ser_len() + self.sum.ser_len()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = self.minimum.ser(out, start_idx);
        let idx = self.maximum.ser(out, idx);
        self.sum.ser(out, idx)
    }
}

impl Deser for IntegerStatistic {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, minimum) = Option::<i64>::deser(input, start_idx)?;
        let (idx, maximum) = Option::<i64>::deser(input, idx)?;
        let (idx, sum) = Option::<i64>::deser(input, idx)?;
        Ok((
            idx,
            IntegerStatistic {
                minimum,
                maximum,
                sum,
            },
        ))
    }
}

impl Ser<'_> for DoubleStatistic {
    #[inline]
    fn ser_len(&self) -> usize {
        self.minimum.ser_len() + self.maximum.ser_len() + mem::size_of::<f64>()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = self.minimum.ser(out, start_idx);
        let idx = self.maximum.ser(out, idx);
        out.ser_f64(idx, self.sum)
    }
}

impl Deser for DoubleStatistic {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, minimum) = Option::<f64>::deser(input, start_idx)?;
        let (idx, maximum) = Option::<f64>::deser(input, idx)?;
        let (idx, sum) = input.deser_f64(idx)?;
        Ok((
            idx,
            DoubleStatistic {
                minimum,
                maximum,
                sum,
            },
        ))
    }
}

impl Ser<'_> for BooleanStatistic {
    #[inline]
    fn ser_len(&self) -> usize {
        mem::size_of::<u64>()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        out.ser_u64(start_idx, self.true_count)
    }
}

impl Deser for BooleanStatistic {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, true_count) = input.deser_u64(start_idx)?;
        Ok((idx, BooleanStatistic { true_count }))
    }
}

impl Ser<'_> for BinaryStatistic {
    #[inline]
    fn ser_len(&self) -> usize {
        self.minimum.ser_len() + self.maximum.ser_len() + mem::size_of::<u64>()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = self.minimum.ser(out, start_idx);
        let idx = self.maximum.ser(out, idx);
        out.ser_u64(idx, self.sum)
    }
}

impl Deser for BinaryStatistic {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, minimum) = Option::<ByteString>::deser(input, start_idx)?;
        let (idx, maximum) = Option::<ByteString>::deser(input, idx)?;
        let (idx, sum) = input.deser_u64(idx)?;
        Ok((
            idx,
            BinaryStatistic {
                minimum,
                maximum,
                sum,
            },
        ))
    }
}

/// Serialization of column statistic.
///
/// ```text
/// |---------------------|-----------|
/// | field               | length(B) |
/// |---------------------|-----------|
/// | number_of_values    | 8         |
/// | has_null            | 1         |
/// | int_statistics      | optional  |
/// | double_statistics   | optional  |
/// | boolean_statistics  | optional  |
/// | binary_statistics   | optional  |
/// |---------------------|-----------|
/// ```
impl Ser<'_> for ColumnStatistic {
    #[inline]
    fn ser_len(&self) -> usize {
        mem::size_of::<u64>()
            + mem::size_of::<u8>()
            + self.int_statistics.ser_len()
            + self.double_statistics.ser_len()
            + self.boolean_statistics.ser_len()
            + self.binary_statistics.ser_len()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = out.ser_u64(start_idx, self.number_of_values);
        let idx = out.ser_bool(idx, self.has_null);
        let idx = self.int_statistics.ser(out, idx);
        let idx = self.double_statistics.ser(out, idx);
        let idx = self.boolean_statistics.ser(out, idx);
        self.binary_statistics.ser(out, idx)
    }
}

impl Deser for ColumnStatistic {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, number_of_values) = input.deser_u64(start_idx)?;
        let (idx, has_null) = input.deser_bool(idx)?;
        let (idx, int_statistics) = Option::<IntegerStatistic>::deser(input, idx)?;
        let (idx, double_statistics) = Option::<DoubleStatistic>::deser(input, idx)?;
        let (idx, boolean_statistics) = Option::<BooleanStatistic>::deser(input, idx)?;
        let (idx, binary_statistics) = Option::<BinaryStatistic>::deser(input, idx)?;
        Ok((
            idx,
            ColumnStatistic {
                number_of_values,
                has_null,
                int_statistics,
                double_statistics,
                boolean_statistics,
                binary_statistics,
            },
        ))
    }
}

impl Ser<'_> for PixelStatistic {
    #[inline]
    fn ser_len(&self) -> usize {
        self.statistic.ser_len()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        self.statistic.ser(out, start_idx)
    }
}

impl Deser for PixelStatistic {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        ColumnStatistic::deser(input, start_idx).map(|(idx, statistic)| (idx, PixelStatistic { statistic }))
    }
}

/// Serialization of column chunk index.
///
/// ```text
/// |---------------------|-----------------|
/// | field               | length(B)       |
/// |---------------------|-----------------|
/// | is_null_offset      | 8               |
/// | little_endian       | 1               |
/// | nulls_padding       | 1               |
/// | is_null_alignment   | 4               |
/// | pixel_positions     | 8 + 8 * n       |
/// | pixel_statistics    | 8 + variable    |
/// |---------------------|-----------------|
/// ```
impl Ser<'_> for ColumnChunkIndex {
    #[inline]
    fn ser_len(&self) -> usize {
        mem::size_of::<u64>()
            + mem::size_of::<u8>() * 2
            + mem::size_of::<u32>()
            + self.pixel_positions.ser_len()
            + self.pixel_statistics.ser_len()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = out.ser_u64(start_idx, self.is_null_offset);
        let idx = out.ser_bool(idx, self.little_endian);
        let idx = out.ser_bool(idx, self.nulls_padding);
        let idx = out.ser_u32(idx, self.is_null_alignment);
        let idx = self.pixel_positions.ser(out, idx);
        self.pixel_statistics.ser(out, idx)
    }
}

impl Deser for ColumnChunkIndex {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, is_null_offset) = input.deser_u64(start_idx)?;
        let (idx, little_endian) = input.deser_bool(idx)?;
        let (idx, nulls_padding) = input.deser_bool(idx)?;
        let (idx, is_null_alignment) = input.deser_u32(idx)?;
        let (idx, pixel_positions) = Vec::<u64>::deser(input, idx)?;
        let (idx, pixel_statistics) = Vec::<PixelStatistic>::deser(input, idx)?;
        if pixel_positions.len() != pixel_statistics.len() {
            return Err(Error::InvalidFormat);
        }
        Ok((
            idx,
            ColumnChunkIndex {
                is_null_offset,
                pixel_positions,
                pixel_statistics,
                little_endian,
                nulls_padding,
                is_null_alignment,
            },
        ))
    }
}

impl Ser<'_> for ColumnEncoding {
    #[inline]
    fn ser_len(&self) -> usize {
        mem::size_of::<u8>() + mem::size_of::<u32>()
    }

    #[inline]
    fn ser<S: Serde + ?Sized>(&self, out: &mut S, start_idx: usize) -> usize {
        let idx = out.ser_u8(start_idx, self.kind as u8);
        out.ser_u32(idx, self.dictionary_size)
    }
}

impl Deser for ColumnEncoding {
    #[inline]
    fn deser<S: Serde + ?Sized>(input: &S, start_idx: usize) -> Result<(usize, Self)> {
        let (idx, kind) = input.deser_u8(start_idx)?;
        let kind = EncodingKind::try_from(kind)?;
        let (idx, dictionary_size) = input.deser_u32(idx)?;
        Ok((
            idx,
            ColumnEncoding {
                kind,
                dictionary_size,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> ColumnChunkIndex {
        ColumnChunkIndex {
            is_null_offset: 24,
            pixel_positions: vec![0, 16],
            pixel_statistics: vec![
                PixelStatistic {
                    statistic: ColumnStatistic {
                        number_of_values: 2,
                        has_null: true,
                        int_statistics: Some(IntegerStatistic {
                            minimum: Some(-1),
                            maximum: Some(5),
                            sum: Some(4),
                        }),
                        ..Default::default()
                    },
                },
                PixelStatistic {
                    statistic: ColumnStatistic {
                        number_of_values: 1,
                        binary_statistics: Some(BinaryStatistic {
                            minimum: Some(ByteString(b"a".to_vec())),
                            maximum: Some(ByteString(b"z".to_vec())),
                            sum: 2,
                        }),
                        ..Default::default()
                    },
                },
            ],
            little_endian: true,
            nulls_padding: false,
            is_null_alignment: 8,
        }
    }

    #[test]
    fn test_column_chunk_index_serde() {
        let index = sample_index();
        let out = index.ser_to_vec();
        assert_eq!(out.len(), index.ser_len());
        let (idx, parsed) = ColumnChunkIndex::deser(&out[..], 0).unwrap();
        assert_eq!(idx, out.len());
        assert_eq!(parsed, index);
    }

    #[test]
    fn test_column_chunk_index_clear() {
        let mut index = sample_index();
        index.clear();
        assert_eq!(index, ColumnChunkIndex::default());
        assert_eq!(index.pixel_count(), 0);
    }

    #[test]
    fn test_column_encoding_serde() {
        let encoding = ColumnEncoding {
            kind: EncodingKind::Dictionary,
            dictionary_size: 17,
        };
        let out = encoding.ser_to_vec();
        let (_, parsed) = ColumnEncoding::deser(&out[..], 0).unwrap();
        assert_eq!(parsed, encoding);

        let mut out = out;
        out[0] = 9;
        assert!(ColumnEncoding::deser(&out[..], 0).is_err());
        assert_eq!(ColumnEncoding::default().kind, EncodingKind::None);
    }

    #[test]
    fn test_column_chunk_index_mismatch() {
        let mut index = sample_index();
        index.pixel_positions.push(32);
        let out = index.ser_to_vec();
        assert!(ColumnChunkIndex::deser(&out[..], 0).is_err());
    }
}
