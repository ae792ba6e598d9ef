use crate::bitutils::bit_wise_compact_into;
use crate::conf::WriterOption;
use crate::error::{Error, Result};
use crate::writer::{ColumnChunkWriter, ColumnValues, ColumnWriter};
use pixels_datatype::TypeDescription;

/// Writer of boolean columns.
///
/// Values of each pixel are buffered and bit-packed with the same
/// bit order as isnull bitmap when the pixel is closed.
pub struct BooleanColumnWriter {
    chunk: ColumnChunkWriter,
    cur_pixel_values: Vec<bool>,
}

impl BooleanColumnWriter {
    #[inline]
    pub fn new(ty: &TypeDescription, option: &WriterOption) -> Result<Self> {
        let chunk = ColumnChunkWriter::new(ty, option)?;
        let cur_pixel_values = vec![false; chunk.pixel_stride()];
        Ok(BooleanColumnWriter {
            chunk,
            cur_pixel_values,
        })
    }

    #[inline]
    fn buffer_value(&mut self, value: bool) {
        let idx = self.chunk.advance_vector_index();
        self.cur_pixel_values[idx] = value;
    }
}

impl ColumnWriter for BooleanColumnWriter {
    #[inline]
    fn chunk(&self) -> &ColumnChunkWriter {
        &self.chunk
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut ColumnChunkWriter {
        &mut self.chunk
    }

    fn write(&mut self, values: ColumnValues<'_>) -> Result<usize> {
        let ColumnValues::Boolean(values) = values else {
            return Err(Error::InvalidDatatype);
        };
        self.chunk.check_open()?;
        for v in values {
            match v {
                Some(v) => {
                    self.buffer_value(*v);
                    self.chunk.pixel_stat_recorder_mut().update_boolean(*v);
                    self.chunk.append_is_null(false);
                }
                None => {
                    if self.chunk.nulls_padding() {
                        self.buffer_value(false);
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

    fn new_pixel(&mut self) {
        let count = self.chunk.cur_pixel_vector_index();
        let order = self.chunk.byte_order();
        bit_wise_compact_into(
            &self.cur_pixel_values,
            count,
            order,
            self.chunk.output_mut(),
        );
        self.chunk.new_pixel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::ByteOrder;

    #[test]
    fn test_boolean_packing() {
        let option = WriterOption::default().pixel_stride(4).isnull_alignment(0);
        let mut writer = BooleanColumnWriter::new(&TypeDescription::boolean(), &option).unwrap();
        writer
            .write(ColumnValues::Boolean(&[
                Some(true),
                Some(false),
                Some(true),
                Some(true),
                None,
                Some(true),
            ]))
            .unwrap();
        writer.flush().unwrap();
        // pixel 0: 1011 packed into one byte.
        // pixel 1: only one non-null value packed, followed by bitmap 01.
        assert_eq!(
            writer.column_chunk_content(),
            &[0b0000_1101, 0b0000_0001, 0b0000_0001]
        );
        let index = writer.column_chunk_index();
        assert_eq!(index.pixel_positions, vec![0, 1]);
        assert_eq!(index.is_null_offset, 2);

        let stat = writer.column_chunk_stat();
        assert_eq!(stat.number_of_values, 5);
        assert_eq!(stat.boolean_statistics.as_ref().unwrap().true_count, 4);
    }

    #[test]
    fn test_boolean_big_endian_padding() {
        let option = WriterOption::default()
            .pixel_stride(8)
            .isnull_alignment(0)
            .nulls_padding(true)
            .byte_order(ByteOrder::BigEndian);
        let mut writer = BooleanColumnWriter::new(&TypeDescription::boolean(), &option).unwrap();
        writer
            .write(ColumnValues::Boolean(&[Some(true), None, Some(true)]))
            .unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.column_chunk_content(), &[0b1010_0000, 0b0100_0000]);
    }
}
