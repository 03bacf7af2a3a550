//! blob/checksum — CRC32 (crc32fast) по checksummed range [version_string_offset, end).
//!
//! context_count, rehashable и само поле checksum в диапазон не входят: rehashable
//! можно переключить после сборки без пересчёта.

use anyhow::{anyhow, Result};
use crc32fast::Hasher as Crc32;

use crate::consts::CHECKSUM_START;

/// Диапазон, покрываемый checksum.
#[inline]
pub fn checksummed_content(blob: &[u8]) -> Result<&[u8]> {
    if blob.len() < CHECKSUM_START {
        return Err(anyhow!(
            "blob too small for checksummed range ({} < {})",
            blob.len(),
            CHECKSUM_START
        ));
    }
    Ok(&blob[CHECKSUM_START..])
}

/// Посчитать checksum blob'а.
pub fn compute_checksum(blob: &[u8]) -> Result<u32> {
    let content = checksummed_content(blob)?;
    let mut hasher = Crc32::new();
    hasher.update(content);
    Ok(hasher.finalize())
}
