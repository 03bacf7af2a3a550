//! blob/gate — совместимость версии, checksum и флаг rehashable.
//!
//! - check_version: побайтовое сравнение всех 64 байт; расхождение — ошибка с полной диагностикой
//!   (SnapshotBlob поднимает её до fatal).
//! - verify_checksum: только bool, политику выбирает вызывающий.
//! - extract_rehashability: значение строго 0/1.

use anyhow::{anyhow, Result};
use log::{debug, warn};

use crate::blob::checksum::compute_checksum;
use crate::blob::extract::context_count;
use crate::blob::header::{read_u32, read_version};
use crate::consts::{OFF_CHECKSUM, OFF_REHASHABLE, OFF_VERSION_STRING, VERSION_STRING_LEN};
use crate::metrics::{record_checksum_failure, record_checksum_verification};
use crate::version::{version_display, VersionProvider};

/// Сравнить версию blob'а с версией работающего движка.
pub fn check_version(blob: &[u8], provider: &dyn VersionProvider) -> Result<()> {
    if blob.len() <= OFF_VERSION_STRING + VERSION_STRING_LEN {
        return Err(anyhow!(
            "snapshot blob of {} bytes is too small to carry a version string",
            blob.len()
        ));
    }
    let ours = provider.version_string();
    let theirs = read_version(blob)?;
    if ours != theirs {
        let contexts = context_count(blob)
            .map(|n| n.to_string())
            .unwrap_or_else(|_| "?".to_string());
        return Err(anyhow!(
            "Version mismatch between binary and snapshot.\n\
             #   binary version: {}\n\
             # snapshot version: {}\n\
             # The snapshot consists of {} bytes and contains {} context(s).",
            version_display(&ours),
            version_display(&theirs),
            blob.len(),
            contexts
        ));
    }
    Ok(())
}

/// Пересчитать checksum по [version_string_offset, end) и сравнить с сохранённым.
pub fn verify_checksum(blob: &[u8]) -> bool {
    record_checksum_verification();
    let (expected, actual) = match (read_u32(blob, OFF_CHECKSUM), compute_checksum(blob)) {
        (Ok(e), Ok(a)) => (e, a),
        (Err(e), _) | (_, Err(e)) => {
            warn!("snapshot checksum: {:#}", e);
            record_checksum_failure();
            return false;
        }
    };
    if expected != actual {
        warn!(
            "snapshot checksum mismatch: stored {:#010x}, computed {:#010x}",
            expected, actual
        );
        record_checksum_failure();
        return false;
    }
    debug!("snapshot checksum ok ({:#010x})", actual);
    true
}

/// Флаг rehashable. Любое значение кроме 0/1 — blob собран не нами.
pub fn extract_rehashability(blob: &[u8]) -> Result<bool> {
    let raw = read_u32(blob, OFF_REHASHABLE)?;
    match raw {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(anyhow!(
            "corrupt snapshot blob: rehashable field is {} (expected 0 or 1)",
            other
        )),
    }
}
