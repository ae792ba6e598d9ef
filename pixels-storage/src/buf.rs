use crate::conf::ByteOrder;

/// ByteBuffer is an append-only growable byte buffer with
/// independent read and write cursors.
///
/// Bytes between the two cursors are the content not yet
/// consumed. Column writers never advance the read cursor,
/// so the whole written region is the content.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl ByteBuffer {
    #[inline]
    pub fn new() -> Self {
        ByteBuffer::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Returns position of read cursor.
    #[inline]
    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    /// Returns position of write cursor.
    #[inline]
    pub fn write_pos(&self) -> usize {
        self.data.len()
    }

    /// Move read cursor forward. Position beyond write cursor
    /// is truncated.
    #[inline]
    pub fn set_read_pos(&mut self, read_pos: usize) {
        self.read_pos = read_pos.min(self.data.len());
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Returns number of bytes between read and write cursors.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.read_pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns bytes between read and write cursors.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }

    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub fn put_u8(&mut self, val: u8) {
        self.data.push(val);
    }

    #[inline]
    pub fn put_i16(&mut self, val: i16, order: ByteOrder) {
        match order {
            ByteOrder::LittleEndian => self.put_bytes(&val.to_le_bytes()),
            ByteOrder::BigEndian => self.put_bytes(&val.to_be_bytes()),
        }
    }

    #[inline]
    pub fn put_i32(&mut self, val: i32, order: ByteOrder) {
        match order {
            ByteOrder::LittleEndian => self.put_bytes(&val.to_le_bytes()),
            ByteOrder::BigEndian => self.put_bytes(&val.to_be_bytes()),
        }
    }

    #[inline]
    pub fn put_u32(&mut self, val: u32, order: ByteOrder) {
        match order {
            ByteOrder::LittleEndian => self.put_bytes(&val.to_le_bytes()),
            ByteOrder::BigEndian => self.put_bytes(&val.to_be_bytes()),
        }
    }

    #[inline]
    pub fn put_i64(&mut self, val: i64, order: ByteOrder) {
        match order {
            ByteOrder::LittleEndian => self.put_bytes(&val.to_le_bytes()),
            ByteOrder::BigEndian => self.put_bytes(&val.to_be_bytes()),
        }
    }

    #[inline]
    pub fn put_f32(&mut self, val: f32, order: ByteOrder) {
        self.put_u32(val.to_bits(), order)
    }

    #[inline]
    pub fn put_f64(&mut self, val: f64, order: ByteOrder) {
        self.put_i64(val.to_bits() as i64, order)
    }

    /// Rewind both cursors to the start.
    /// Allocated capacity is kept for reuse.
    #[inline]
    pub fn reset_position(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }

    /// Release underlying storage.
    #[inline]
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.read_pos = 0;
    }
}
