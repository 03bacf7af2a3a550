//! blob/store — SnapshotBlob: неизменяемый владелец байтов blob'а (Vec или mmap).
//!
//! Методы без префикса реализуют фатальный уровень ошибок: повреждение, чужая версия,
//! неверный индекс контекста — паника через crate::fatal. Варианты try_* возвращают
//! Result для диагностики (CLI inspect/verify).
//!
//! Запись на диск: tmp + rename + fsync каталога (best-effort на не-unix).

use anyhow::{anyhow, Context, Result};
use memmap2::Mmap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::ops::Deref;
use std::path::Path;

use crate::blob::extract::{self, RegionDescriptor};
use crate::blob::gate;
use crate::blob::header::{read_header, BlobHeader};
use crate::blob::layout::validate_pointer_size;
use crate::fatal::{fatal, or_fatal};
use crate::metrics::record_region_extracted;
use crate::version::VersionProvider;

enum BlobBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for BlobBytes {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            BlobBytes::Owned(v) => v,
            BlobBytes::Mapped(m) => m,
        }
    }
}

/// Готовый snapshot blob. После создания не изменяется; Send + Sync, делится через Arc.
pub struct SnapshotBlob {
    bytes: BlobBytes,
    pointer_size: usize,
}

impl std::fmt::Debug for SnapshotBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBlob")
            .field("len", &self.len())
            .field("pointer_size", &self.pointer_size)
            .field("mapped", &matches!(self.bytes, BlobBytes::Mapped(_)))
            .finish()
    }
}

impl SnapshotBlob {
    /// Обернуть готовые байты (например, результат assemble).
    pub fn from_vec(data: Vec<u8>, pointer_size: usize) -> Result<Self> {
        validate_pointer_size(pointer_size)?;
        Ok(Self {
            bytes: BlobBytes::Owned(data),
            pointer_size,
        })
    }

    /// Прочитать blob целиком в память.
    pub fn open(path: &Path, pointer_size: usize) -> Result<Self> {
        validate_pointer_size(pointer_size)?;
        let mut f = OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("open snapshot blob {}", path.display()))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)
            .with_context(|| format!("read snapshot blob {}", path.display()))?;
        Self::from_vec(buf, pointer_size)
    }

    /// Отобразить blob в память read-only.
    ///
    /// Файл не должен изменяться, пока отображение живо.
    pub fn open_mmap(path: &Path, pointer_size: usize) -> Result<Self> {
        validate_pointer_size(pointer_size)?;
        let f = File::open(path)
            .with_context(|| format!("open snapshot blob {}", path.display()))?;
        if f.metadata()?.len() == 0 {
            // пустой файл не отображается — держим пустой Vec
            return Self::from_vec(Vec::new(), pointer_size);
        }
        let mmap = unsafe { Mmap::map(&f) }
            .map_err(|e| anyhow!("mmap snapshot blob {}: {}", path.display(), e))?;
        Ok(Self {
            bytes: BlobBytes::Mapped(mmap),
            pointer_size,
        })
    }

    /// Атомарно записать blob в path (tmp + rename).
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("tmp");
        let _ = fs::remove_file(&tmp);
        {
            let mut f = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&tmp)
                .with_context(|| format!("open blob tmp {}", tmp.display()))?;
            f.write_all(self.as_bytes())?;
            f.sync_all()?;
        }
        fs::rename(&tmp, path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
        let _ = fsync_parent(path);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    // ---------------- fatal tier ----------------

    pub fn context_count(&self) -> u32 {
        or_fatal(extract::context_count(self.as_bytes()))
    }

    pub fn extract_startup(&self) -> &[u8] {
        let r = or_fatal(extract::extract_startup(self.as_bytes(), self.pointer_size));
        record_region_extracted();
        r
    }

    pub fn extract_read_only(&self) -> &[u8] {
        let r = or_fatal(extract::extract_read_only(self.as_bytes(), self.pointer_size));
        record_region_extracted();
        r
    }

    pub fn extract_context(&self, index: u32) -> &[u8] {
        let r = or_fatal(extract::extract_context(self.as_bytes(), index));
        record_region_extracted();
        r
    }

    /// Версия blob'а обязана совпадать с версией движка; иначе fatal.
    pub fn check_version(&self, provider: &dyn VersionProvider) {
        if let Err(e) = gate::check_version(self.as_bytes(), provider) {
            fatal(format!("{:#}", e));
        }
    }

    pub fn extract_rehashability(&self) -> bool {
        or_fatal(gate::extract_rehashability(self.as_bytes()))
    }

    // ---------------- soft tier ----------------

    pub fn verify_checksum(&self) -> bool {
        gate::verify_checksum(self.as_bytes())
    }

    pub fn has_context(&self, index: u32) -> bool {
        extract::has_context(Some(self.as_bytes()), index)
    }

    // ---------------- diagnostics (Result) ----------------

    pub fn try_context_count(&self) -> Result<u32> {
        extract::context_count(self.as_bytes())
    }

    pub fn try_extract_startup(&self) -> Result<&[u8]> {
        extract::extract_startup(self.as_bytes(), self.pointer_size)
    }

    pub fn try_extract_read_only(&self) -> Result<&[u8]> {
        extract::extract_read_only(self.as_bytes(), self.pointer_size)
    }

    pub fn try_extract_context(&self, index: u32) -> Result<&[u8]> {
        extract::extract_context(self.as_bytes(), index)
    }

    pub fn try_check_version(&self, provider: &dyn VersionProvider) -> Result<()> {
        gate::check_version(self.as_bytes(), provider)
    }

    pub fn try_extract_rehashability(&self) -> Result<bool> {
        gate::extract_rehashability(self.as_bytes())
    }

    pub fn header(&self) -> Result<BlobHeader> {
        read_header(self.as_bytes())
    }

    pub fn regions(&self) -> Result<Vec<RegionDescriptor>> {
        extract::regions(self.as_bytes(), self.pointer_size)
    }
}

/// has_context для «может быть, blob есть». Отсутствие blob'а или данных — false.
pub fn has_context(blob: Option<&SnapshotBlob>, index: u32) -> bool {
    extract::has_context(blob.map(|b| b.as_bytes()), index)
}

#[cfg(unix)]
fn fsync_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            File::open(parent)?.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
