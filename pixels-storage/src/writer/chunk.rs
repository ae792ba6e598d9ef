use crate::bitutils::bit_wise_compact_into;
use crate::buf::ByteBuffer;
use crate::conf::{ByteOrder, EncodingLevel, ISNULL_PADDING, WriterOption};
use crate::error::{Error, Result};
use crate::proto::{ColumnChunkIndex, ColumnEncoding, ColumnStatistic, EncodingKind, PixelStatistic};
use crate::stats::StatsRecorder;
use pixels_datatype::TypeDescription;

/// ColumnChunkWriter maintains the byte layout and index of one
/// column chunk. Typed writers append value bytes to its output
/// buffer and report null flags row by row.
///
/// Layout of column chunk content after flush:
///
/// ```text
/// |--------------------|-------------------------------------------|
/// | field              | length(B)                                 |
/// |--------------------|-------------------------------------------|
/// | pixel_0 values     | pixel_positions[1] - pixel_positions[0]   |
/// | ...                | ...                                       |
/// | pixel_n values     | is_null_offset - pixel_positions[n] - pad |
/// | padding            | 0..isnull_alignment                       |
/// | isnull bitmap      | rest of content                           |
/// |--------------------|-------------------------------------------|
/// ```
///
/// Bitmap bytes exist only for pixels containing nulls, each takes
/// `ceil(rows/8)` bytes. Readers check `has_null` of pixel statistics
/// to locate them.
pub struct ColumnChunkWriter {
    pixel_stride: usize,
    encoding_level: EncodingLevel,
    byte_order: ByteOrder,
    nulls_padding: bool,
    isnull_alignment: usize,
    // null flags of current pixel, reused across pixels.
    is_null: Vec<bool>,
    // rows written in current pixel.
    cur_pixel_ele_index: usize,
    // null flags written in current pixel.
    cur_pixel_is_null_index: usize,
    // values buffered by typed writer in current pixel.
    cur_pixel_vector_index: usize,
    cur_pixel_position: usize,
    last_pixel_position: usize,
    has_null: bool,
    output: ByteBuffer,
    is_null_stream: ByteBuffer,
    pixel_stat_recorder: StatsRecorder,
    chunk_stat_recorder: StatsRecorder,
    chunk_index: ColumnChunkIndex,
    chunk_stat: ColumnStatistic,
    closed: bool,
}

impl ColumnChunkWriter {
    /// Create a new column chunk writer.
    /// Type determines the family of statistics.
    /// Fails if the option is invalid.
    pub fn new(ty: &TypeDescription, option: &WriterOption) -> Result<Self> {
        option.validate()?;
        let pixel_stride = option.pixel_stride;
        let output = ByteBuffer::with_capacity(option.chunk_buffer_capacity()?);
        let is_null_stream = ByteBuffer::with_capacity(pixel_stride.div_ceil(8));
        let mut writer = ColumnChunkWriter {
            pixel_stride,
            encoding_level: option.encoding_level,
            byte_order: option.byte_order,
            nulls_padding: option.nulls_padding,
            isnull_alignment: option.isnull_alignment,
            is_null: vec![false; pixel_stride],
            cur_pixel_ele_index: 0,
            cur_pixel_is_null_index: 0,
            cur_pixel_vector_index: 0,
            cur_pixel_position: 0,
            last_pixel_position: 0,
            has_null: false,
            output,
            is_null_stream,
            pixel_stat_recorder: StatsRecorder::for_type(ty),
            chunk_stat_recorder: StatsRecorder::for_type(ty),
            chunk_index: ColumnChunkIndex::default(),
            chunk_stat: ColumnStatistic::default(),
            closed: false,
        };
        writer.init_index_flags();
        Ok(writer)
    }

    #[inline]
    fn init_index_flags(&mut self) {
        self.chunk_index.little_endian = self.byte_order.is_little_endian();
        self.chunk_index.nulls_padding = self.nulls_padding;
        self.chunk_index.is_null_alignment = self.isnull_alignment as u32;
    }

    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    #[inline]
    pub fn encoding_level(&self) -> EncodingLevel {
        self.encoding_level
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    #[inline]
    pub fn nulls_padding(&self) -> bool {
        self.nulls_padding
    }

    #[inline]
    pub fn isnull_alignment(&self) -> usize {
        self.isnull_alignment
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::WriterClosed);
        }
        Ok(())
    }

    /// Whether current pixel contains null.
    #[inline]
    pub fn has_null(&self) -> bool {
        self.has_null
    }

    #[inline]
    pub fn cur_pixel_ele_index(&self) -> usize {
        self.cur_pixel_ele_index
    }

    #[inline]
    pub fn cur_pixel_is_null_index(&self) -> usize {
        self.cur_pixel_is_null_index
    }

    #[inline]
    pub fn cur_pixel_vector_index(&self) -> usize {
        self.cur_pixel_vector_index
    }

    #[inline]
    pub fn cur_pixel_position(&self) -> usize {
        self.cur_pixel_position
    }

    #[inline]
    pub fn last_pixel_position(&self) -> usize {
        self.last_pixel_position
    }

    /// Returns true if current pixel reaches the stride.
    #[inline]
    pub fn is_pixel_full(&self) -> bool {
        self.cur_pixel_ele_index >= self.pixel_stride
    }

    /// Record null flag of next row in current pixel.
    #[inline]
    pub fn append_is_null(&mut self, is_null: bool) {
        // Caller must start a new pixel before the stride overflows.
        debug_assert!(self.cur_pixel_is_null_index < self.pixel_stride);
        self.is_null[self.cur_pixel_is_null_index] = is_null;
        self.cur_pixel_is_null_index += 1;
        self.cur_pixel_ele_index += 1;
        self.has_null |= is_null;
    }

    /// Returns slot index of next buffered value in current pixel
    /// and advances it.
    #[inline]
    pub fn advance_vector_index(&mut self) -> usize {
        let idx = self.cur_pixel_vector_index;
        self.cur_pixel_vector_index += 1;
        idx
    }

    #[inline]
    pub fn output(&self) -> &ByteBuffer {
        &self.output
    }

    #[inline]
    pub fn output_mut(&mut self) -> &mut ByteBuffer {
        &mut self.output
    }

    #[inline]
    pub fn is_null_stream(&self) -> &ByteBuffer {
        &self.is_null_stream
    }

    #[inline]
    pub fn pixel_stat_recorder(&self) -> &StatsRecorder {
        &self.pixel_stat_recorder
    }

    #[inline]
    pub fn pixel_stat_recorder_mut(&mut self) -> &mut StatsRecorder {
        &mut self.pixel_stat_recorder
    }

    #[inline]
    pub fn column_chunk_stat_recorder(&self) -> &StatsRecorder {
        &self.chunk_stat_recorder
    }

    /// Statistics of whole column chunk, available after flush.
    #[inline]
    pub fn column_chunk_stat(&self) -> &ColumnStatistic {
        &self.chunk_stat
    }

    /// Finish current pixel.
    ///
    /// The packed null flags of this pixel are appended to isnull
    /// stream only if any row is null. Pixel position recorded in
    /// index is the start offset of the finished pixel, which is
    /// the boundary recorded by previous call.
    pub fn new_pixel(&mut self) {
        if self.has_null {
            bit_wise_compact_into(
                &self.is_null,
                self.cur_pixel_is_null_index,
                self.byte_order,
                &mut self.is_null_stream,
            );
            self.pixel_stat_recorder.set_has_null();
            self.chunk_stat_recorder.set_has_null();
        }
        self.cur_pixel_position = self.output.write_pos();
        let rows = self.cur_pixel_ele_index;
        self.cur_pixel_ele_index = 0;
        self.cur_pixel_vector_index = 0;
        self.cur_pixel_is_null_index = 0;

        self.chunk_stat_recorder.merge(&self.pixel_stat_recorder);

        let pixel_stat = PixelStatistic {
            statistic: self.pixel_stat_recorder.serialize(),
        };
        self.chunk_index
            .pixel_positions
            .push(self.last_pixel_position as u64);
        self.chunk_index.pixel_statistics.push(pixel_stat);
        log::trace!(
            "new pixel: no={}, rows={}, start={}, end={}, has_null={}",
            self.chunk_index.pixel_positions.len() - 1,
            rows,
            self.last_pixel_position,
            self.cur_pixel_position,
            self.has_null
        );

        self.last_pixel_position = self.cur_pixel_position;
        self.pixel_stat_recorder.reset();
        self.has_null = false;
    }

    /// Returns true if rows are written after last pixel boundary.
    #[inline]
    pub fn has_pending_pixel(&self) -> bool {
        self.cur_pixel_ele_index > 0
    }

    /// Finalize column chunk content.
    /// Must be called exactly once per chunk.
    #[inline]
    pub fn flush(&mut self) {
        if self.has_pending_pixel() {
            self.new_pixel();
        }
        self.finish();
    }

    /// Pad value bytes to alignment and append isnull bitmap.
    /// Pending pixel must be finished before.
    pub fn finish(&mut self) {
        debug_assert!(!self.closed);
        debug_assert!(!self.has_pending_pixel());
        let mut is_null_offset = self.output.write_pos();
        if self.isnull_alignment != 0 && is_null_offset % self.isnull_alignment != 0 {
            let align_bytes = self.isnull_alignment - is_null_offset % self.isnull_alignment;
            self.output.put_bytes(&ISNULL_PADDING[..align_bytes]);
            is_null_offset += align_bytes;
        }
        self.chunk_index.is_null_offset = is_null_offset as u64;
        self.output.put_bytes(self.is_null_stream.as_slice());
        self.chunk_stat = self.chunk_stat_recorder.serialize();
        log::debug!(
            "flush column chunk: pixels={}, is_null_offset={}, is_null_bytes={}, size={}",
            self.chunk_index.pixel_count(),
            is_null_offset,
            self.is_null_stream.len(),
            self.output.len()
        );
    }

    /// Clear content, index and statistics for next column chunk.
    /// Allocated buffers are kept.
    pub fn reset(&mut self) {
        self.last_pixel_position = 0;
        self.cur_pixel_position = 0;
        self.cur_pixel_ele_index = 0;
        self.cur_pixel_vector_index = 0;
        self.cur_pixel_is_null_index = 0;
        self.has_null = false;
        self.chunk_index.clear();
        self.init_index_flags();
        self.chunk_stat.clear();
        self.pixel_stat_recorder.reset();
        self.chunk_stat_recorder.reset();
        self.output.reset_position();
        self.is_null_stream.reset_position();
        log::debug!("reset column chunk writer");
    }

    /// Release buffers. The writer must not be used afterwards.
    #[inline]
    pub fn close(&mut self) {
        if !self.closed {
            log::debug!("close column chunk writer");
        }
        self.output.clear();
        self.is_null_stream.clear();
        self.closed = true;
    }

    /// Returns serialized bytes of column chunk.
    /// Only valid after flush.
    #[inline]
    pub fn column_chunk_content(&self) -> &[u8] {
        self.output.as_slice()
    }

    #[inline]
    pub fn column_chunk_size(&self) -> usize {
        self.output.len()
    }

    #[inline]
    pub fn column_chunk_index(&self) -> &ColumnChunkIndex {
        &self.chunk_index
    }

    #[inline]
    pub fn new_column_chunk_index() -> ColumnChunkIndex {
        ColumnChunkIndex::default()
    }

    /// Value bytes are written as is at this level.
    #[inline]
    pub fn column_chunk_encoding(&self) -> ColumnEncoding {
        ColumnEncoding::new(EncodingKind::None)
    }
}
