//! blob/extract — нарезка готового blob'а на регионы только по заголовку и таблице смещений.
//!
//! Все функции здесь возвращают Result: слой SnapshotBlob превращает ошибки в fatal,
//! а диагностика (CLI inspect) печатает их как есть. Каждый регион — под-срез исходного
//! буфера; перед возвратом проверяется start <= end <= total_length.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::blob::header::read_u32;
use crate::blob::layout::{context_offset_offset, startup_payload_offset};
use crate::consts::{OFF_CONTEXT_COUNT, OFF_READ_ONLY_OFFSET, U32_SIZE};

/// Логический регион blob'а.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    Startup,
    ReadOnly,
    Context(u32),
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionKind::Startup => write!(f, "startup"),
            RegionKind::ReadOnly => write!(f, "read-only"),
            RegionKind::Context(i) => write!(f, "context #{}", i),
        }
    }
}

/// Производный дескриптор региона (в blob не хранится).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionDescriptor {
    pub kind: RegionKind,
    pub offset: u32,
    pub length: u32,
}

/// Число контекстов. Требует len > 4.
pub fn context_count(blob: &[u8]) -> Result<u32> {
    if blob.len() <= U32_SIZE {
        return Err(anyhow!(
            "blob of {} bytes is too small to hold a context count",
            blob.len()
        ));
    }
    read_u32(blob, OFF_CONTEXT_COUNT)
}

/// Смещение контекста index из таблицы. Пустой последний контекст даёт off == total_length.
fn context_offset(blob: &[u8], index: u32) -> Result<usize> {
    let slot = context_offset_offset(index)
        .ok_or_else(|| anyhow!("context offset slot {} overflows", index))?;
    let off = read_u32(blob, slot)? as usize;
    if off > blob.len() {
        return Err(anyhow!(
            "context #{} offset {} beyond blob of {} bytes",
            index,
            off,
            blob.len()
        ));
    }
    Ok(off)
}

fn read_only_offset(blob: &[u8]) -> Result<usize> {
    Ok(read_u32(blob, OFF_READ_ONLY_OFFSET)? as usize)
}

fn startup_offset(blob: &[u8], pointer_size: usize) -> Result<usize> {
    let n = context_count(blob)?;
    startup_payload_offset(n, pointer_size)
        .ok_or_else(|| anyhow!("context_count {} overflows offset table", n))
}

/// Проверить диапазон и вернуть под-срез.
fn extract_data(blob: &[u8], kind: RegionKind, start: usize, end: usize) -> Result<&[u8]> {
    if start > end {
        return Err(anyhow!(
            "corrupt snapshot blob: {} region starts at {} after its end {}",
            kind,
            start,
            end
        ));
    }
    if end > blob.len() {
        return Err(anyhow!(
            "corrupt snapshot blob: {} region [{}..{}) exceeds blob of {} bytes",
            kind,
            start,
            end,
            blob.len()
        ));
    }
    Ok(&blob[start..end])
}

fn startup_range(blob: &[u8], pointer_size: usize) -> Result<(usize, usize)> {
    let start = startup_offset(blob, pointer_size)?;
    let end = read_only_offset(blob)?;
    Ok((start, end))
}

fn read_only_range(blob: &[u8], pointer_size: usize) -> Result<(usize, usize)> {
    let start = read_only_offset(blob)?;
    let payload_start = startup_offset(blob, pointer_size)?;
    if start < payload_start {
        return Err(anyhow!(
            "corrupt snapshot blob: read-only offset {} inside header (payload starts at {})",
            start,
            payload_start
        ));
    }
    let end = if context_count(blob)? > 0 {
        context_offset(blob, 0)?
    } else {
        blob.len()
    };
    Ok((start, end))
}

fn context_range(blob: &[u8], index: u32) -> Result<(usize, usize)> {
    let n = context_count(blob)?;
    if index >= n {
        return Err(anyhow!(
            "context index {} out of range: blob contains {} context(s)",
            index,
            n
        ));
    }
    let start = context_offset(blob, index)?;
    if start < read_only_offset(blob)? {
        return Err(anyhow!(
            "corrupt snapshot blob: context #{} offset {} precedes read-only region",
            index,
            start
        ));
    }
    let end = if index == n - 1 {
        blob.len()
    } else {
        context_offset(blob, index + 1)?
    };
    Ok((start, end))
}

/// Startup region: [startup_payload_offset(count), read_only_offset).
pub fn extract_startup(blob: &[u8], pointer_size: usize) -> Result<&[u8]> {
    let (start, end) = startup_range(blob, pointer_size)?;
    extract_data(blob, RegionKind::Startup, start, end)
}

/// Read-only region: [read_only_offset, context_offset[0] | total_length).
pub fn extract_read_only(blob: &[u8], pointer_size: usize) -> Result<&[u8]> {
    let (start, end) = read_only_range(blob, pointer_size)?;
    extract_data(blob, RegionKind::ReadOnly, start, end)
}

/// Context region index: [context_offset[i], context_offset[i+1] | total_length).
pub fn extract_context(blob: &[u8], index: u32) -> Result<&[u8]> {
    let (start, end) = context_range(blob, index)?;
    extract_data(blob, RegionKind::Context(index), start, end)
}

/// Мягкая проверка: есть ли в blob контекст index. Никогда не падает.
pub fn has_context(blob: Option<&[u8]>, index: u32) -> bool {
    let Some(blob) = blob else {
        return false;
    };
    if blob.is_empty() {
        return false;
    }
    match context_count(blob) {
        Ok(n) => index < n,
        Err(_) => false,
    }
}

/// Таблица всех регионов (диагностика).
pub fn regions(blob: &[u8], pointer_size: usize) -> Result<Vec<RegionDescriptor>> {
    let n = context_count(blob)?;
    let mut out = Vec::with_capacity((n as usize).min(1024) + 2);

    let mut push = |kind: RegionKind, (start, end): (usize, usize)| -> Result<()> {
        let data = extract_data(blob, kind, start, end)?;
        out.push(RegionDescriptor {
            kind,
            offset: start as u32,
            length: data.len() as u32,
        });
        Ok(())
    };

    push(RegionKind::Startup, startup_range(blob, pointer_size)?)?;
    push(RegionKind::ReadOnly, read_only_range(blob, pointer_size)?)?;
    for i in 0..n {
        push(RegionKind::Context(i), context_range(blob, i)?)?;
    }
    Ok(out)
}
