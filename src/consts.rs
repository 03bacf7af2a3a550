//! Константы формата snapshot blob (заголовок, таблица смещений, версия).
//!
//! Layout (LE):
//! [context_count u32][rehashable u32][checksum u32][version 64B][read_only_offset u32]
//! [context_offset u32 × context_count][pad → ptr_size][startup][read-only][context 0..N)

// -------- Header fields --------
pub const U32_SIZE: usize = 4;

pub const OFF_CONTEXT_COUNT: usize = 0;
pub const OFF_REHASHABLE: usize = OFF_CONTEXT_COUNT + U32_SIZE; // 4
pub const OFF_CHECKSUM: usize = OFF_REHASHABLE + U32_SIZE; // 8
pub const OFF_VERSION_STRING: usize = OFF_CHECKSUM + U32_SIZE; // 12
pub const VERSION_STRING_LEN: usize = 64;
pub const OFF_READ_ONLY_OFFSET: usize = OFF_VERSION_STRING + VERSION_STRING_LEN; // 76
pub const OFF_FIRST_CONTEXT_OFFSET: usize = OFF_READ_ONLY_OFFSET + U32_SIZE; // 80

/// Начало checksummed range. Поля до него (count, rehashable, checksum) не покрываются.
pub const CHECKSUM_START: usize = OFF_VERSION_STRING;

// -------- Pointer sizes --------
/// Поддерживаемые размеры указателя целевого runtime.
pub const SUPPORTED_POINTER_SIZES: [usize; 2] = [4, 8];

/// Размер указателя хоста (дефолт для SnapConfig).
pub const HOST_POINTER_SIZE: usize = std::mem::size_of::<usize>();

// -------- Compressed region framing --------
/// [uncompressed_len u32] перед потоком кодека.
pub const COMPRESSED_PREFIX_LEN: usize = 4;

pub const CODEC_NONE: u16 = 0;
pub const CODEC_ZSTD: u16 = 1;
pub const CODEC_ZLIB: u16 = 2;

/// Лимит на размер распакованного региона по умолчанию (1 GiB).
pub const DEFAULT_MAX_REGION_BYTES: usize = 1 << 30;
