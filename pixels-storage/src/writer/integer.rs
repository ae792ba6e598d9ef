use crate::conf::WriterOption;
use crate::error::{Error, Result};
use crate::writer::{ColumnChunkWriter, ColumnValues, ColumnWriter};
use pixels_datatype::TypeDescription;

/// Writer of integral columns: tinyint, smallint, int, bigint,
/// date, time and timestamp.
///
/// Values are stored as fixed-width integers in configured byte order.
/// Width is determined by column type.
pub struct IntegerColumnWriter {
    chunk: ColumnChunkWriter,
    width: usize,
}

impl IntegerColumnWriter {
    #[inline]
    pub fn new(ty: &TypeDescription, option: &WriterOption) -> Result<Self> {
        if !ty.kind.is_integer() {
            return Err(Error::InvalidDatatype);
        }
        let width = ty.kind.fixed_width().ok_or(Error::InvalidDatatype)?;
        Ok(IntegerColumnWriter {
            chunk: ColumnChunkWriter::new(ty, option)?,
            width,
        })
    }

    /// Width in bytes of each value.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    fn put_value(&mut self, value: i64) -> Result<()> {
        let order = self.chunk.byte_order();
        let out = self.chunk.output_mut();
        match self.width {
            1 => {
                let v = i8::try_from(value).map_err(|_| Error::InvalidArgument)?;
                out.put_u8(v as u8);
            }
            2 => {
                let v = i16::try_from(value).map_err(|_| Error::InvalidArgument)?;
                out.put_i16(v, order);
            }
            4 => {
                let v = i32::try_from(value).map_err(|_| Error::InvalidArgument)?;
                out.put_i32(v, order);
            }
            8 => out.put_i64(value, order),
            _ => unreachable!("unexpected integer width {}", self.width),
        }
        Ok(())
    }
}

impl ColumnWriter for IntegerColumnWriter {
    #[inline]
    fn chunk(&self) -> &ColumnChunkWriter {
        &self.chunk
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut ColumnChunkWriter {
        &mut self.chunk
    }

    /// Values out of range of column width are rejected with
    /// `InvalidArgument`. Rows before the failed one stay written.
    fn write(&mut self, values: ColumnValues<'_>) -> Result<usize> {
        let ColumnValues::Long(values) = values else {
            return Err(Error::InvalidDatatype);
        };
        self.chunk.check_open()?;
        for v in values {
            match v {
                Some(v) => {
                    self.put_value(*v)?;
                    self.chunk.pixel_stat_recorder_mut().update_integer(*v);
                    self.chunk.append_is_null(false);
                }
                None => {
                    if self.chunk.nulls_padding() {
                        self.put_value(0)?;
                    }
                    self.chunk.append_is_null(true);
                }
            }
            if self.chunk.is_pixel_full() {
                self.new_pixel();
            }
        }
        Ok(values.len())
    }
}
