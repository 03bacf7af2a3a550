//! blob — формат snapshot blob: заголовок, таблица смещений, сборка, нарезка, проверки.
//!
//! Разделение по подмодулям:
//! - header.rs   — LE кодек полей заголовка, BlobHeader.
//! - layout.rs   — таблица смещений контекстов, выровненное начало startup payload.
//! - checksum.rs — CRC32 по checksummed range.
//! - assemble.rs — сборка blob'а из регионов.
//! - extract.rs  — нарезка регионов с проверкой границ, has_context.
//! - gate.rs     — версия, checksum, rehashable.
//! - store.rs    — SnapshotBlob (Vec/mmap), загрузка/запись файла.

pub mod assemble;
pub mod checksum;
pub mod extract;
pub mod gate;
pub mod header;
pub mod layout;
pub mod store;

// ---------------- re-exports ----------------

pub use assemble::assemble;
pub use checksum::compute_checksum;
pub use extract::{has_context, RegionDescriptor, RegionKind};
pub use gate::{check_version, extract_rehashability, verify_checksum};
pub use header::{read_header, read_u32, write_u32, BlobHeader};
pub use layout::{align_up, startup_payload_offset, validate_pointer_size};
pub use store::SnapshotBlob;
