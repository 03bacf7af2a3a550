// Базовые модули
pub mod consts;
pub mod config;
pub mod metrics;
pub mod fatal;

// Формат blob'а (папка с mod.rs)
pub mod blob; // src/blob/{mod,header,layout,checksum,assemble,extract,gate,store}.rs

// Стратегии сжатия регионов
pub mod codec;

// Провайдер версии
pub mod version;

// Runtime: сборка с кодеком, initialize, new context
pub mod snapshot;

// Удобные реэкспорты
pub use blob::{
    assemble, check_version, extract_rehashability, has_context, read_header,
    startup_payload_offset, verify_checksum, BlobHeader, RegionDescriptor, RegionKind,
    SnapshotBlob,
};
pub use codec::{CodecKind, RegionCodec};
pub use config::SnapConfig;
pub use snapshot::{Snapshot, SnapshotDeserializer};
pub use version::{BuildVersion, FixedVersion, VersionProvider};
