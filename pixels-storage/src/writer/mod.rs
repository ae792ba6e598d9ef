//! This module contains column writers which serialize values of one
//! column into column chunks.
//!
//! Each chunk is divided into pixels of `pixel_stride` rows. Common
//! bookkeeping of pixels, isnull bitmaps and statistics is done by
//! [`ColumnChunkWriter`], typed writers only produce value bytes.

pub mod binary;
pub mod boolean;
pub mod chunk;
pub mod double;
pub mod integer;
#[cfg(test)]
mod tests;

pub use binary::*;
pub use boolean::*;
pub use chunk::*;
pub use double::*;
pub use integer::*;

use crate::conf::WriterOption;
use crate::error::{Error, Result};
use crate::proto::{ColumnChunkIndex, ColumnEncoding, ColumnStatistic};
use pixels_datatype::{TypeDescription, TypeKind};

/// A batch of nullable column values.
#[derive(Debug, Clone, Copy)]
pub enum ColumnValues<'a> {
    Long(&'a [Option<i64>]),
    Double(&'a [Option<f64>]),
    Boolean(&'a [Option<bool>]),
    Bytes(&'a [Option<&'a [u8]>]),
}

impl ColumnValues<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Long(vs) => vs.len(),
            ColumnValues::Double(vs) => vs.len(),
            ColumnValues::Boolean(vs) => vs.len(),
            ColumnValues::Bytes(vs) => vs.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ColumnWriter writes values of one column into column chunks.
///
/// Lifecycle of a chunk: `write` any number of batches, `flush` once,
/// take content and index, then `reset` for next chunk. `close`
/// releases buffers and ends the writer.
pub trait ColumnWriter {
    fn chunk(&self) -> &ColumnChunkWriter;

    fn chunk_mut(&mut self) -> &mut ColumnChunkWriter;

    /// Write a batch of values.
    /// Returns number of rows written.
    fn write(&mut self, values: ColumnValues<'_>) -> Result<usize>;

    /// Close current pixel.
    /// Writers buffering values per pixel emit them before
    /// the boundary is recorded.
    #[inline]
    fn new_pixel(&mut self) {
        self.chunk_mut().new_pixel()
    }

    /// Finish current chunk.
    fn flush(&mut self) -> Result<()> {
        self.chunk().check_open()?;
        if self.chunk().has_pending_pixel() {
            self.new_pixel();
        }
        self.chunk_mut().finish();
        Ok(())
    }

    #[inline]
    fn reset(&mut self) {
        self.chunk_mut().reset()
    }

    #[inline]
    fn close(&mut self) {
        self.chunk_mut().close()
    }

    #[inline]
    fn column_chunk_content(&self) -> &[u8] {
        self.chunk().column_chunk_content()
    }

    #[inline]
    fn column_chunk_size(&self) -> usize {
        self.chunk().column_chunk_size()
    }

    #[inline]
    fn column_chunk_index(&self) -> &ColumnChunkIndex {
        self.chunk().column_chunk_index()
    }

    #[inline]
    fn column_chunk_encoding(&self) -> ColumnEncoding {
        self.chunk().column_chunk_encoding()
    }

    #[inline]
    fn column_chunk_stat(&self) -> &ColumnStatistic {
        self.chunk().column_chunk_stat()
    }
}

/// Create column writer for given type.
pub fn new_column_writer(
    ty: &TypeDescription,
    option: &WriterOption,
) -> Result<Box<dyn ColumnWriter + Send>> {
    let writer: Box<dyn ColumnWriter + Send> = match ty.kind {
        TypeKind::Boolean => Box::new(BooleanColumnWriter::new(ty, option)?),
        k if k.is_integer() => Box::new(IntegerColumnWriter::new(ty, option)?),
        k if k.is_floating() => Box::new(DoubleColumnWriter::new(ty, option)?),
        k if k.is_binary() => Box::new(BinaryColumnWriter::new(ty, option)?),
        _ => return Err(Error::DataTypeNotSupported),
    };
    log::debug!("create column writer: type={}", ty);
    Ok(writer)
}
