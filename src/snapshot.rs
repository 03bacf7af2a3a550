//! snapshot — связка blob-формата с runtime: сборка с кодеком, инициализация движка,
//! новый контекст из snapshot.
//!
//! Порядок initialize():
//! 1) нет blob'а — Ok(None), вызывающий строит окружение с нуля;
//! 2) check_version — fatal при расхождении;
//! 3) verify_checksum — fatal при false (если SnapConfig.verify_checksum);
//! 4) startup + read-only → decompress → десериализатор вместе с флагом rehashable.
//!
//! Ошибка десериализатора — обычный Err: blob валиден, но поднять из него состояние не вышло.

use anyhow::{Context, Result};
use log::info;
use std::time::Instant;

use crate::blob::assemble::assemble;
use crate::blob::store::{has_context, SnapshotBlob};
use crate::codec::RegionCodec;
use crate::config::SnapConfig;
use crate::fatal::fatal;
use crate::metrics::{record_blob_assembled, record_region_decompressed};
use crate::version::{BuildVersion, VersionProvider};

/// Внешний десериализатор: превращает байты регионов в живые объекты.
pub trait SnapshotDeserializer {
    type Isolate;
    type Context;

    fn deserialize_isolate(
        &mut self,
        read_only: &[u8],
        startup: &[u8],
        rehashable: bool,
    ) -> Result<Self::Isolate>;

    fn deserialize_context(
        &mut self,
        index: u32,
        data: &[u8],
        rehashable: bool,
    ) -> Result<Self::Context>;
}

/// Точка входа runtime: конфиг, выбранный кодек и провайдер версии.
pub struct Snapshot {
    cfg: SnapConfig,
    codec: Box<dyn RegionCodec>,
    version: Box<dyn VersionProvider + Send + Sync>,
}

impl Snapshot {
    pub fn new<V>(cfg: SnapConfig, version: V) -> Result<Self>
    where
        V: VersionProvider + Send + Sync + 'static,
    {
        cfg.validate()?;
        let codec = cfg.region_codec();
        Ok(Self {
            cfg,
            codec,
            version: Box::new(version),
        })
    }

    /// Snapshot с версией текущей сборки.
    pub fn with_build_version(cfg: SnapConfig) -> Result<Self> {
        Self::new(cfg, BuildVersion)
    }

    pub fn config(&self) -> &SnapConfig {
        &self.cfg
    }

    pub fn codec(&self) -> &dyn RegionCodec {
        self.codec.as_ref()
    }

    pub fn version_provider(&self) -> &dyn VersionProvider {
        self.version.as_ref()
    }

    /// Сжать каждый регион выбранным кодеком и собрать blob.
    pub fn create_blob<C: AsRef<[u8]>>(
        &self,
        startup: &[u8],
        read_only: &[u8],
        contexts: &[C],
        rehashable: bool,
    ) -> Result<SnapshotBlob> {
        let startup_c = self.codec.compress(startup).context("compress startup region")?;
        let read_only_c = self
            .codec
            .compress(read_only)
            .context("compress read-only region")?;
        let mut contexts_c = Vec::with_capacity(contexts.len());
        for (i, c) in contexts.iter().enumerate() {
            contexts_c.push(
                self.codec
                    .compress(c.as_ref())
                    .with_context(|| format!("compress context #{}", i))?,
            );
        }

        let data = assemble(
            &startup_c,
            &read_only_c,
            &contexts_c,
            rehashable,
            &self.version.version_string(),
            self.cfg.pointer_size,
        )?;

        if self.cfg.profile_deserialization {
            info!("Snapshot blob consists of ({} codec):", self.codec.name());
            info!("{:>10} bytes for startup ({} raw)", startup_c.len(), startup.len());
            info!("{:>10} bytes for read-only ({} raw)", read_only_c.len(), read_only.len());
            for (i, (c, raw)) in contexts_c.iter().zip(contexts).enumerate() {
                info!(
                    "{:>10} bytes for context #{} ({} raw)",
                    c.len(),
                    i,
                    raw.as_ref().len()
                );
            }
        }

        record_blob_assembled(data.len());
        SnapshotBlob::from_vec(data, self.cfg.pointer_size)
    }

    /// Поднять isolate из blob'а. Ok(None) — snapshot недоступен.
    pub fn initialize<D: SnapshotDeserializer>(
        &self,
        blob: Option<&SnapshotBlob>,
        deserializer: &mut D,
    ) -> Result<Option<D::Isolate>> {
        let Some(blob) = blob.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        let timer = Instant::now();

        blob.check_version(self.version.as_ref());
        if self.cfg.verify_checksum {
            let checksum_timer = Instant::now();
            let ok = blob.verify_checksum();
            if self.cfg.profile_deserialization {
                info!(
                    "[Verifying snapshot checksum took {:.3} ms]",
                    checksum_timer.elapsed().as_secs_f64() * 1000.0
                );
            }
            if !ok {
                fatal(format!(
                    "snapshot checksum mismatch ({} bytes, {} context(s))",
                    blob.len(),
                    blob.context_count()
                ));
            }
        }

        let startup = blob.extract_startup();
        let read_only = blob.extract_read_only();
        let rehashable = blob.extract_rehashability();

        let startup_d = self.decompress(startup, "startup")?;
        let read_only_d = self.decompress(read_only, "read-only")?;

        let isolate = deserializer
            .deserialize_isolate(&read_only_d, &startup_d, rehashable)
            .context("deserialize isolate from snapshot")?;

        if self.cfg.profile_deserialization {
            info!(
                "[Deserializing isolate ({} bytes) took {:.3} ms]",
                startup.len(),
                timer.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(Some(isolate))
    }

    /// Поднять контекст index. Индекс вне диапазона — fatal (проверяйте has_context_snapshot).
    pub fn new_context_from_snapshot<D: SnapshotDeserializer>(
        &self,
        blob: Option<&SnapshotBlob>,
        index: u32,
        deserializer: &mut D,
    ) -> Result<Option<D::Context>> {
        let Some(blob) = blob.filter(|b| !b.is_empty()) else {
            return Ok(None);
        };
        let timer = Instant::now();

        let rehashable = blob.extract_rehashability();
        let data = blob.extract_context(index);
        let data_d = self.decompress(data, "context")?;

        let ctx = deserializer
            .deserialize_context(index, &data_d, rehashable)
            .with_context(|| format!("deserialize context #{} from snapshot", index))?;

        if self.cfg.profile_deserialization {
            info!(
                "[Deserializing context #{} ({} bytes) took {:.3} ms]",
                index,
                data.len(),
                timer.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(Some(ctx))
    }

    pub fn has_context_snapshot(blob: Option<&SnapshotBlob>, index: u32) -> bool {
        has_context(blob, index)
    }

    /// Debug-проверка: пригодный для runtime blob содержит хотя бы один контекст.
    pub fn snapshot_is_valid(blob: &SnapshotBlob) -> bool {
        matches!(blob.try_context_count(), Ok(n) if n > 0)
    }

    fn decompress<'a>(&self, region: &'a [u8], what: &str) -> Result<std::borrow::Cow<'a, [u8]>> {
        let out = self
            .codec
            .decompress(region)
            .with_context(|| format!("decompress {} region ({} codec)", what, self.codec.name()))?;
        if self.codec.id() != crate::consts::CODEC_NONE {
            record_region_decompressed(out.len());
        }
        Ok(out)
    }
}
