use crate::conf::WriterOption;
use crate::error::{Error, Result};
use crate::writer::{ColumnChunkWriter, ColumnValues, ColumnWriter};
use pixels_datatype::{TypeDescription, TypeKind};

/// Writer of variable-length columns: string, varchar, char, binary
/// and varbinary.
///
/// Each value is stored as u32 length in configured byte order
/// followed by the bytes. Values of bounded types longer than
/// `max_length` are truncated.
pub struct BinaryColumnWriter {
    chunk: ColumnChunkWriter,
    max_length: Option<usize>,
}

impl BinaryColumnWriter {
    #[inline]
    pub fn new(ty: &TypeDescription, option: &WriterOption) -> Result<Self> {
        if !ty.kind.is_binary() {
            return Err(Error::InvalidDatatype);
        }
        let max_length = match ty.kind {
            TypeKind::String => None,
            _ => Some(ty.max_length as usize),
        };
        Ok(BinaryColumnWriter {
            chunk: ColumnChunkWriter::new(ty, option)?,
            max_length,
        })
    }

    #[inline]
    fn put_value(&mut self, value: &[u8]) -> Result<()> {
        let len = length_prefix(value.len())?;
        let order = self.chunk.byte_order();
        let out = self.chunk.output_mut();
        out.put_u32(len, order);
        out.put_bytes(value);
        Ok(())
    }
}

/// Values longer than u32::MAX can not be length-prefixed.
#[inline]
fn length_prefix(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidArgument)
}

impl ColumnWriter for BinaryColumnWriter {
    #[inline]
    fn chunk(&self) -> &ColumnChunkWriter {
        &self.chunk
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut ColumnChunkWriter {
        &mut self.chunk
    }

    fn write(&mut self, values: ColumnValues<'_>) -> Result<usize> {
        let ColumnValues::Bytes(values) = values else {
            return Err(Error::InvalidDatatype);
        };
        self.chunk.check_open()?;
        for v in values {
            match v {
                Some(v) => {
                    let v = match self.max_length {
                        Some(max_len) if v.len() > max_len => &v[..max_len],
                        _ => *v,
                    };
                    self.put_value(v)?;
                    self.chunk.pixel_stat_recorder_mut().update_binary(v);
                    self.chunk.append_is_null(false);
                }
                None => {
                    if self.chunk.nulls_padding() {
                        self.put_value(&[])?;
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
    fn test_binary_write() {
        let option = WriterOption::default().isnull_alignment(0);
        let mut writer = BinaryColumnWriter::new(&TypeDescription::string(), &option).unwrap();
        let values: [Option<&[u8]>; 3] = [Some(&b"ab"[..]), None, Some(&b""[..])];
        writer.write(ColumnValues::Bytes(&values)).unwrap();
        writer.flush().unwrap();
        assert_eq!(
            writer.column_chunk_content(),
            &[2, 0, 0, 0, b'a', b'b', 0, 0, 0, 0, 0b0000_0010]
        );
        let stat = writer.column_chunk_stat().binary_statistics.as_ref().unwrap();
        assert_eq!(stat.minimum.as_ref().unwrap().0, b"".to_vec());
        assert_eq!(stat.maximum.as_ref().unwrap().0, b"ab".to_vec());
        assert_eq!(stat.sum, 2);
    }

    #[test]
    fn test_length_prefix_range() {
        assert_eq!(length_prefix(0), Ok(0));
        assert_eq!(length_prefix(u32::MAX as usize), Ok(u32::MAX));
        if let Ok(len) = usize::try_from(u32::MAX as u64 + 1) {
            assert_eq!(length_prefix(len), Err(Error::InvalidArgument));
        }
    }

    #[test]
    fn test_varchar_truncate() {
        let option = WriterOption::default().isnull_alignment(0);
        let ty = TypeDescription::varchar(3).unwrap();
        let mut writer = BinaryColumnWriter::new(&ty, &option).unwrap();
        let values: [Option<&[u8]>; 1] = [Some(&b"hello"[..])];
        writer.write(ColumnValues::Bytes(&values)).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.column_chunk_content(), &[3, 0, 0, 0, b'h', b'e', b'l']);
        let stat = writer.column_chunk_stat().binary_statistics.as_ref().unwrap();
        assert_eq!(stat.maximum.as_ref().unwrap().0, b"hel".to_vec());
    }
}
