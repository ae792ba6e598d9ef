use crate::error::{Error, Result};
use byte_unit::Byte;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ISNULL_ALIGNMENT_KEY: &str = "isnull.bitmap.alignment";
pub const PIXEL_STRIDE_KEY: &str = "pixel.stride";
pub const LITTLE_ENDIAN_KEY: &str = "column.chunk.little.endian";
pub const ENCODING_LEVEL_KEY: &str = "encoding.level";
pub const CHUNK_BUFFER_SIZE_KEY: &str = "column.chunk.buffer.size";

pub const DEFAULT_ISNULL_ALIGNMENT: usize = 8;
pub const DEFAULT_PIXEL_STRIDE: usize = 10000;
pub const DEFAULT_LITTLE_ENDIAN: bool = true;
pub const DEFAULT_ENCODING_LEVEL: EncodingLevel = EncodingLevel::EL2;
pub const DEFAULT_CHUNK_BUFFER_SIZE: Byte = Byte::from_u64(64 * 1024);
// Nulls padding is not supported at column chunk level yet.
pub const DEFAULT_NULLS_PADDING: bool = false;

/// Upper bound of isnull bitmap alignment.
pub const MAX_ISNULL_ALIGNMENT: usize = 4096;

/// Zero bytes used to pad value bytes before the isnull bitmap.
/// Shared by all column writers and never written.
pub static ISNULL_PADDING: [u8; MAX_ISNULL_ALIGNMENT] = [0u8; MAX_ISNULL_ALIGNMENT];

/// Byte order of multi-byte values and of packed bits in bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

impl ByteOrder {
    #[inline]
    pub fn is_little_endian(self) -> bool {
        self == ByteOrder::LittleEndian
    }
}

/// Controls how aggressively typed writers encode values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncodingLevel {
    EL0 = 0,
    EL1 = 1,
    EL2 = 2,
}

impl EncodingLevel {
    #[inline]
    pub fn from_level(level: usize) -> Option<Self> {
        match level {
            0 => Some(EncodingLevel::EL0),
            1 => Some(EncodingLevel::EL1),
            2 => Some(EncodingLevel::EL2),
            _ => None,
        }
    }

    /// Returns true if this level is at least the given level.
    #[inline]
    pub fn ge(self, level: EncodingLevel) -> bool {
        self >= level
    }
}

/// String-valued properties keyed by dotted names,
/// e.g. `isnull.bitmap.alignment`.
///
/// TOML input may use dotted keys, nested tables or quoted keys.
/// Integer and boolean values are kept in their textual form
/// and parsed on access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelsConfig {
    props: BTreeMap<String, String>,
}

impl PixelsConfig {
    /// Load config from TOML file, entries override defaults.
    #[inline]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML document, entries override defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let table = input.parse::<toml::Table>()?;
        let mut conf = PixelsConfig::default();
        flatten_table(&mut conf.props, "", &table)?;
        Ok(conf)
    }

    #[inline]
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(|s| s.as_str())
    }

    #[inline]
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    #[inline]
    fn required(&self, key: &str) -> Result<&str> {
        self.get_property(key)
            .ok_or_else(|| Error::MissingConfig(key.to_string()))
    }

    #[inline]
    pub fn get_usize(&self, key: &str) -> Result<usize> {
        let value = self.required(key)?;
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::invalid_config(key, value))
    }

    #[inline]
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.required(key)?;
        value
            .trim()
            .parse::<bool>()
            .map_err(|_| Error::invalid_config(key, value))
    }

    #[inline]
    pub fn get_byte_size(&self, key: &str) -> Result<Byte> {
        let value = self.required(key)?;
        value
            .trim()
            .parse::<Byte>()
            .map_err(|_| Error::invalid_config(key, value))
    }
}

impl Default for PixelsConfig {
    #[inline]
    fn default() -> Self {
        let mut props = BTreeMap::new();
        props.insert(
            ISNULL_ALIGNMENT_KEY.to_string(),
            DEFAULT_ISNULL_ALIGNMENT.to_string(),
        );
        props.insert(
            PIXEL_STRIDE_KEY.to_string(),
            DEFAULT_PIXEL_STRIDE.to_string(),
        );
        props.insert(
            LITTLE_ENDIAN_KEY.to_string(),
            DEFAULT_LITTLE_ENDIAN.to_string(),
        );
        props.insert(
            ENCODING_LEVEL_KEY.to_string(),
            (DEFAULT_ENCODING_LEVEL as u8).to_string(),
        );
        props.insert(
            CHUNK_BUFFER_SIZE_KEY.to_string(),
            DEFAULT_CHUNK_BUFFER_SIZE.as_u64().to_string(),
        );
        PixelsConfig { props }
    }
}

fn flatten_table(
    props: &mut BTreeMap<String, String>,
    prefix: &str,
    table: &toml::Table,
) -> Result<()> {
    for (k, v) in table {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        let value = match v {
            toml::Value::Table(t) => {
                flatten_table(props, &key, t)?;
                continue;
            }
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Float(f) => f.to_string(),
            other => return Err(Error::invalid_config(&key, other.to_string())),
        };
        props.insert(key, value);
    }
    Ok(())
}

/// Options shared by all column writers of one file.
///
/// Deserialized options are validated the same way as options
/// resolved from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WriterOptionDef")]
pub struct WriterOption {
    // Number of rows in each pixel.
    pub pixel_stride: usize,
    // Typed writers decide whether to apply value encodings by this level.
    pub encoding_level: EncodingLevel,
    // Byte order of values and isnull bitmaps.
    pub byte_order: ByteOrder,
    // Whether null rows occupy a placeholder in value bytes.
    pub nulls_padding: bool,
    // Start offset of isnull bitmap in column chunk is aligned to
    // this value. Zero disables the padding.
    pub isnull_alignment: usize,
    // Initial capacity of value buffer of each column chunk.
    pub chunk_buffer_size: Byte,
}

impl WriterOption {
    /// Resolve writer option from config.
    /// Fails if any value can not be parsed.
    pub fn from_config(conf: &PixelsConfig) -> Result<Self> {
        let pixel_stride = conf.get_usize(PIXEL_STRIDE_KEY)?;
        let isnull_alignment = conf.get_usize(ISNULL_ALIGNMENT_KEY)?;
        let level = conf.get_usize(ENCODING_LEVEL_KEY)?;
        let encoding_level = EncodingLevel::from_level(level)
            .ok_or_else(|| Error::invalid_config(ENCODING_LEVEL_KEY, level.to_string()))?;
        let byte_order = if conf.get_bool(LITTLE_ENDIAN_KEY)? {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        };
        let chunk_buffer_size = conf.get_byte_size(CHUNK_BUFFER_SIZE_KEY)?;
        let option = WriterOption {
            pixel_stride,
            encoding_level,
            byte_order,
            nulls_padding: DEFAULT_NULLS_PADDING,
            isnull_alignment,
            chunk_buffer_size,
        };
        option.validate()?;
        log::debug!(
            "resolved writer option: pixel_stride={}, isnull_alignment={}, byte_order={:?}",
            pixel_stride,
            isnull_alignment,
            byte_order
        );
        Ok(option)
    }

    /// Check values that column writers rely on.
    /// Stride must be positive and alignment must not exceed
    /// the shared padding buffer.
    pub fn validate(&self) -> Result<()> {
        if self.pixel_stride == 0 {
            return Err(Error::invalid_config(PIXEL_STRIDE_KEY, "0"));
        }
        if self.isnull_alignment > MAX_ISNULL_ALIGNMENT {
            return Err(Error::invalid_config(
                ISNULL_ALIGNMENT_KEY,
                self.isnull_alignment.to_string(),
            ));
        }
        self.chunk_buffer_capacity()?;
        Ok(())
    }

    /// Initial capacity of value buffer in bytes.
    #[inline]
    pub fn chunk_buffer_capacity(&self) -> Result<usize> {
        usize::try_from(self.chunk_buffer_size.as_u64()).map_err(|_| {
            Error::invalid_config(CHUNK_BUFFER_SIZE_KEY, self.chunk_buffer_size.to_string())
        })
    }

    /// How many rows in one pixel.
    #[inline]
    pub fn pixel_stride(mut self, pixel_stride: usize) -> Self {
        assert!(pixel_stride > 0);
        self.pixel_stride = pixel_stride;
        self
    }

    #[inline]
    pub fn encoding_level(mut self, encoding_level: EncodingLevel) -> Self {
        self.encoding_level = encoding_level;
        self
    }

    #[inline]
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    #[inline]
    pub fn nulls_padding(mut self, nulls_padding: bool) -> Self {
        self.nulls_padding = nulls_padding;
        self
    }

    /// Alignment of isnull bitmap. Zero means no alignment.
    #[inline]
    pub fn isnull_alignment(mut self, isnull_alignment: usize) -> Self {
        assert!(isnull_alignment <= MAX_ISNULL_ALIGNMENT);
        self.isnull_alignment = isnull_alignment;
        self
    }

    #[inline]
    pub fn chunk_buffer_size<T>(mut self, chunk_buffer_size: T) -> Self
    where
        Byte: From<T>,
    {
        self.chunk_buffer_size = Byte::from(chunk_buffer_size);
        self
    }
}

#[derive(Deserialize)]
struct WriterOptionDef {
    pixel_stride: usize,
    encoding_level: EncodingLevel,
    byte_order: ByteOrder,
    nulls_padding: bool,
    isnull_alignment: usize,
    chunk_buffer_size: Byte,
}

impl TryFrom<WriterOptionDef> for WriterOption {
    type Error = Error;
    #[inline]
    fn try_from(def: WriterOptionDef) -> Result<Self> {
        let option = WriterOption {
            pixel_stride: def.pixel_stride,
            encoding_level: def.encoding_level,
            byte_order: def.byte_order,
            nulls_padding: def.nulls_padding,
            isnull_alignment: def.isnull_alignment,
            chunk_buffer_size: def.chunk_buffer_size,
        };
        option.validate()?;
        Ok(option)
    }
}

impl Default for WriterOption {
    #[inline]
    fn default() -> Self {
        WriterOption {
            pixel_stride: DEFAULT_PIXEL_STRIDE,
            encoding_level: DEFAULT_ENCODING_LEVEL,
            byte_order: if DEFAULT_LITTLE_ENDIAN {
                ByteOrder::LittleEndian
            } else {
                ByteOrder::BigEndian
            },
            nulls_padding: DEFAULT_NULLS_PADDING,
            isnull_alignment: DEFAULT_ISNULL_ALIGNMENT,
            chunk_buffer_size: DEFAULT_CHUNK_BUFFER_SIZE,
        }
    }
}
