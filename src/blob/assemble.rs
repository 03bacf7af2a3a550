//! blob/assemble — сборка snapshot blob из готовых регионов.
//!
//! Порядок:
//! 1) context_count и начало startup payload (выровнено по pointer_size);
//! 2) total_length (должен помещаться в u32 — смещения в заголовке u32);
//! 3) буфер, зануляем только [0, startup_offset) (включая padding — сборка детерминирована);
//! 4) count, rehashable (0/1), версия (ровно 64 байта);
//! 5) payload: startup, read-only, контексты по индексу; смещения пишем по ходу;
//! 6) checksum — последним, по [version_string_offset, end).

use anyhow::{anyhow, Result};
use log::debug;

use crate::blob::checksum::compute_checksum;
use crate::blob::header::write_u32;
use crate::blob::layout::{context_offset_offset, startup_payload_offset, validate_pointer_size};
use crate::consts::{
    OFF_CHECKSUM, OFF_CONTEXT_COUNT, OFF_READ_ONLY_OFFSET, OFF_REHASHABLE, OFF_VERSION_STRING,
    VERSION_STRING_LEN,
};

/// Собрать blob. Входные регионы не модифицируются.
pub fn assemble<C: AsRef<[u8]>>(
    startup: &[u8],
    read_only: &[u8],
    contexts: &[C],
    rehashable: bool,
    version: &[u8; VERSION_STRING_LEN],
    pointer_size: usize,
) -> Result<Vec<u8>> {
    validate_pointer_size(pointer_size)?;

    let context_count = u32::try_from(contexts.len())
        .map_err(|_| anyhow!("too many contexts: {}", contexts.len()))?;
    let startup_offset = startup_payload_offset(context_count, pointer_size)
        .ok_or_else(|| anyhow!("offset table for {} contexts overflows", context_count))?;

    let payload_len = contexts
        .iter()
        .try_fold(startup.len() + read_only.len(), |acc, c| {
            acc.checked_add(c.as_ref().len())
        })
        .ok_or_else(|| anyhow!("payload length overflows"))?;
    let total_length = startup_offset
        .checked_add(payload_len)
        .filter(|&t| t <= u32::MAX as usize)
        .ok_or_else(|| {
            anyhow!(
                "snapshot blob too large: {} header + {} payload bytes exceed u32 offsets",
                startup_offset,
                payload_len
            )
        })?;

    // vec! уже занулён целиком; [0, startup_offset) обязан быть нулевым
    let mut data = vec![0u8; total_length];

    write_u32(&mut data, OFF_CONTEXT_COUNT, context_count)?;
    write_u32(&mut data, OFF_REHASHABLE, if rehashable { 1 } else { 0 })?;
    data[OFF_VERSION_STRING..OFF_VERSION_STRING + VERSION_STRING_LEN].copy_from_slice(version);

    // Startup
    let mut cursor = startup_offset;
    cursor = copy_region(&mut data, cursor, startup);
    debug!("snapshot blob: startup {} bytes at {}", startup.len(), startup_offset);

    // Read-only
    write_u32(&mut data, OFF_READ_ONLY_OFFSET, cursor as u32)?;
    debug!("snapshot blob: read-only {} bytes at {}", read_only.len(), cursor);
    cursor = copy_region(&mut data, cursor, read_only);

    // Contexts
    for (i, ctx) in contexts.iter().enumerate() {
        let ctx = ctx.as_ref();
        let slot = context_offset_offset(i as u32)
            .ok_or_else(|| anyhow!("context offset slot {} overflows", i))?;
        write_u32(&mut data, slot, cursor as u32)?;
        debug!("snapshot blob: context #{} {} bytes at {}", i, ctx.len(), cursor);
        cursor = copy_region(&mut data, cursor, ctx);
    }

    debug_assert_eq!(cursor, total_length);

    // Checksum — после того, как все остальные байты окончательны
    let checksum = compute_checksum(&data)?;
    write_u32(&mut data, OFF_CHECKSUM, checksum)?;

    Ok(data)
}

#[inline]
fn copy_region(data: &mut [u8], at: usize, region: &[u8]) -> usize {
    let end = at + region.len();
    data[at..end].copy_from_slice(region);
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::header::read_u32;
    use crate::version::pad_version;

    #[test]
    fn layout_of_two_context_blob() {
        let v = pad_version("t");
        let blob = assemble(b"SSS", b"RR", &[b"C0".as_slice(), b"C11".as_slice()], true, &v, 8).unwrap();

        // 80 + 8 = 88, уже кратно 8
        assert_eq!(blob.len(), 88 + 3 + 2 + 2 + 3);
        assert_eq!(read_u32(&blob, OFF_CONTEXT_COUNT).unwrap(), 2);
        assert_eq!(read_u32(&blob, OFF_REHASHABLE).unwrap(), 1);
        assert_eq!(read_u32(&blob, OFF_READ_ONLY_OFFSET).unwrap(), 91);
        assert_eq!(read_u32(&blob, 80).unwrap(), 93);
        assert_eq!(read_u32(&blob, 84).unwrap(), 95);
        assert_eq!(&blob[88..91], b"SSS");
        assert_eq!(&blob[95..], b"C11");
        assert_eq!(&blob[12..13], b"t");
    }

    #[test]
    fn padding_is_zeroed_and_deterministic() {
        let v = pad_version("t");
        let a = assemble(b"S", b"R", &[b"C".as_slice()], false, &v, 8).unwrap();
        let b = assemble(b"S", b"R", &[b"C".as_slice()], false, &v, 8).unwrap();
        assert_eq!(a, b);
        // 80 + 4 = 84 -> 88: байты [84, 88) — padding
        assert!(a[84..88].iter().all(|&x| x == 0));
        assert_eq!(a[88], b'S');
    }

    #[test]
    fn zero_contexts_is_minimal_blob() {
        let v = pad_version("t");
        let blob = assemble::<&[u8]>(b"S", b"RO", &[], false, &v, 4).unwrap();
        assert_eq!(blob.len(), 80 + 1 + 2);
        assert_eq!(read_u32(&blob, OFF_CONTEXT_COUNT).unwrap(), 0);
        assert_eq!(read_u32(&blob, OFF_READ_ONLY_OFFSET).unwrap(), 81);
    }

    #[test]
    fn rejects_bad_pointer_size() {
        let v = pad_version("t");
        assert!(assemble::<&[u8]>(b"S", b"R", &[], false, &v, 3).is_err());
    }
}
