//! blob/layout — таблица смещений контекстов и выровненное начало startup payload.
//!
//! startup_payload_offset — единственная формула, общая для assembler и extractor.
//! Выравнивание по размеру указателя целевого runtime (4 или 8), а не по 4 байтам формата.

use anyhow::{anyhow, Result};

use crate::consts::{OFF_FIRST_CONTEXT_OFFSET, SUPPORTED_POINTER_SIZES, U32_SIZE};

/// Проверка размера указателя (4 или 8).
pub fn validate_pointer_size(pointer_size: usize) -> Result<()> {
    if !SUPPORTED_POINTER_SIZES.contains(&pointer_size) {
        return Err(anyhow!(
            "pointer_size must be one of {:?}, got {}",
            SUPPORTED_POINTER_SIZES,
            pointer_size
        ));
    }
    Ok(())
}

/// Выровнять value вверх до кратного align (align — степень двойки).
#[inline]
pub fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

/// Смещение i-й записи таблицы контекстов. Для i == context_count это конец таблицы.
#[inline]
pub fn context_offset_offset(index: u32) -> Option<usize> {
    (index as usize)
        .checked_mul(U32_SIZE)
        .and_then(|n| n.checked_add(OFF_FIRST_CONTEXT_OFFSET))
}

/// Начало startup payload: align_up(80 + 4*context_count, pointer_size).
#[inline]
pub fn startup_payload_offset(context_count: u32, pointer_size: usize) -> Option<usize> {
    context_offset_offset(context_count).and_then(|end| align_up(end, pointer_size))
}
