//! blob/header — LE кодек полей заголовка и разбор заголовка целиком.
//!
//! Вся работа с порядком байт в формате идёт через read_u32/write_u32.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{
    OFF_CHECKSUM, OFF_CONTEXT_COUNT, OFF_FIRST_CONTEXT_OFFSET, OFF_READ_ONLY_OFFSET,
    OFF_REHASHABLE, OFF_VERSION_STRING, U32_SIZE, VERSION_STRING_LEN,
};
use crate::blob::layout::context_offset_offset;

/// Прочитать u32 (LE) по смещению. Требует off + 4 <= len.
#[inline]
pub fn read_u32(blob: &[u8], off: usize) -> Result<u32> {
    let end = off
        .checked_add(U32_SIZE)
        .ok_or_else(|| anyhow!("header offset {} overflows", off))?;
    if end > blob.len() {
        return Err(anyhow!(
            "header read out of bounds: [{}..{}) in blob of {} bytes",
            off,
            end,
            blob.len()
        ));
    }
    Ok(LittleEndian::read_u32(&blob[off..end]))
}

/// Записать u32 (LE) по смещению. Требует off + 4 <= len.
#[inline]
pub fn write_u32(buf: &mut [u8], off: usize, value: u32) -> Result<()> {
    let end = off
        .checked_add(U32_SIZE)
        .ok_or_else(|| anyhow!("header offset {} overflows", off))?;
    if end > buf.len() {
        return Err(anyhow!(
            "header write out of bounds: [{}..{}) in buffer of {} bytes",
            off,
            end,
            buf.len()
        ));
    }
    LittleEndian::write_u32(&mut buf[off..end], value);
    Ok(())
}

/// Сырой (не валидированный) заголовок blob'а — для диагностики.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHeader {
    pub context_count: u32,
    pub rehashable_raw: u32,
    pub checksum: u32,
    pub version: [u8; VERSION_STRING_LEN],
    pub read_only_offset: u32,
    pub context_offsets: Vec<u32>,
}

impl BlobHeader {
    pub fn rehashable(&self) -> Option<bool> {
        match self.rehashable_raw {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }
}

/// Версия из заголовка (ровно 64 байта).
pub fn read_version(blob: &[u8]) -> Result<[u8; VERSION_STRING_LEN]> {
    let end = OFF_VERSION_STRING + VERSION_STRING_LEN;
    if blob.len() < end {
        return Err(anyhow!(
            "blob too small for version string ({} < {})",
            blob.len(),
            end
        ));
    }
    let mut v = [0u8; VERSION_STRING_LEN];
    v.copy_from_slice(&blob[OFF_VERSION_STRING..end]);
    Ok(v)
}

/// Прочитать все поля заголовка и таблицу смещений контекстов.
pub fn read_header(blob: &[u8]) -> Result<BlobHeader> {
    let context_count = read_u32(blob, OFF_CONTEXT_COUNT)?;
    let rehashable_raw = read_u32(blob, OFF_REHASHABLE)?;
    let checksum = read_u32(blob, OFF_CHECKSUM)?;
    let version = read_version(blob)?;
    let read_only_offset = read_u32(blob, OFF_READ_ONLY_OFFSET)?;

    // Таблица должна целиком помещаться в blob, иначе count испорчен
    let table_end = context_offset_offset(context_count)
        .ok_or_else(|| anyhow!("context_count {} overflows offset table", context_count))?;
    if table_end > blob.len() {
        return Err(anyhow!(
            "offset table for {} contexts ends at {} beyond blob of {} bytes",
            context_count,
            table_end,
            blob.len()
        ));
    }

    let mut context_offsets = Vec::with_capacity(context_count as usize);
    for i in 0..context_count as usize {
        context_offsets.push(read_u32(blob, OFF_FIRST_CONTEXT_OFFSET + i * U32_SIZE)?);
    }

    Ok(BlobHeader {
        context_count,
        rehashable_raw,
        checksum,
        version,
        read_only_offset,
        context_offsets,
    })
}
