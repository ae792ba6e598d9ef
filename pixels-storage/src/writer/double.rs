use crate::conf::WriterOption;
use crate::error::{Error, Result};
use crate::writer::{ColumnChunkWriter, ColumnValues, ColumnWriter};
use pixels_datatype::{TypeDescription, TypeKind};

/// Writer of float and double columns.
/// Float values are narrowed to 4 bytes.
pub struct DoubleColumnWriter {
    chunk: ColumnChunkWriter,
    single: bool,
}

impl DoubleColumnWriter {
    #[inline]
    pub fn new(ty: &TypeDescription, option: &WriterOption) -> Result<Self> {
        if !ty.kind.is_floating() {
            return Err(Error::InvalidDatatype);
        }
        Ok(DoubleColumnWriter {
            chunk: ColumnChunkWriter::new(ty, option)?,
            single: ty.kind == TypeKind::Float,
        })
    }

    #[inline]
    fn put_value(&mut self, value: f64) {
        let order = self.chunk.byte_order();
        if self.single {
            self.chunk.output_mut().put_f32(value as f32, order);
        } else {
            self.chunk.output_mut().put_f64(value, order);
        }
    }
}

impl ColumnWriter for DoubleColumnWriter {
    #[inline]
    fn chunk(&self) -> &ColumnChunkWriter {
        &self.chunk
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut ColumnChunkWriter {
        &mut self.chunk
    }

    fn write(&mut self, values: ColumnValues<'_>) -> Result<usize> {
        let ColumnValues::Double(values) = values else {
            return Err(Error::InvalidDatatype);
        };
        self.chunk.check_open()?;
        for v in values {
            match v {
                Some(v) => {
                    self.put_value(*v);
                    self.chunk.pixel_stat_recorder_mut().update_double(*v);
                    self.chunk.append_is_null(false);
                }
                None => {
                    if self.chunk.nulls_padding() {
                        self.put_value(0.0);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_write() {
        let option = WriterOption::default().isnull_alignment(0);
        let mut writer = DoubleColumnWriter::new(&TypeDescription::double(), &option).unwrap();
        writer
            .write(ColumnValues::Double(&[Some(1.5), None, Some(-2.0)]))
            .unwrap();
        writer.flush().unwrap();
        let content = writer.column_chunk_content();
        assert_eq!(content.len(), 8 * 2 + 1);
        assert_eq!(&content[..8], &1.5f64.to_le_bytes());
        assert_eq!(&content[8..16], &(-2.0f64).to_le_bytes());
        assert_eq!(content[16], 0b0000_0010);

        let stat = writer.column_chunk_stat().double_statistics.as_ref().unwrap();
        assert_eq!(stat.minimum, Some(-2.0));
        assert_eq!(stat.maximum, Some(1.5));
        assert_eq!(stat.sum, -0.5);
    }

    #[test]
    fn test_float_write() {
        let option = WriterOption::default().isnull_alignment(0);
        let ty = TypeDescription::new(TypeKind::Float);
        let mut writer = DoubleColumnWriter::new(&ty, &option).unwrap();
        writer.write(ColumnValues::Double(&[Some(0.25)])).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.column_chunk_content(), &0.25f32.to_le_bytes());
        assert!(DoubleColumnWriter::new(&TypeDescription::int(), &option).is_err());
    }
}
