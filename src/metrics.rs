//! Lightweight global metrics for snapblob.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Assembler
//! - Checksum gate
//! - Extraction / decompression

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Assembler -----
static BLOBS_ASSEMBLED: AtomicU64 = AtomicU64::new(0);
static BLOB_BYTES_ASSEMBLED: AtomicU64 = AtomicU64::new(0);

// ----- Checksum -----
static CHECKSUM_VERIFICATIONS: AtomicU64 = AtomicU64::new(0);
static CHECKSUM_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Extraction -----
static REGIONS_EXTRACTED: AtomicU64 = AtomicU64::new(0);
static REGIONS_DECOMPRESSED: AtomicU64 = AtomicU64::new(0);
static BYTES_DECOMPRESSED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    // Assembler
    pub blobs_assembled: u64,
    pub blob_bytes_assembled: u64,

    // Checksum
    pub checksum_verifications: u64,
    pub checksum_failures: u64,

    // Extraction
    pub regions_extracted: u64,
    pub regions_decompressed: u64,
    pub bytes_decompressed: u64,
}

impl MetricsSnapshot {
    pub fn checksum_failure_ratio(&self) -> f64 {
        if self.checksum_verifications == 0 {
            0.0
        } else {
            self.checksum_failures as f64 / self.checksum_verifications as f64
        }
    }
}

// ----- Recorders -----
pub fn record_blob_assembled(total_len: usize) {
    BLOBS_ASSEMBLED.fetch_add(1, Ordering::Relaxed);
    BLOB_BYTES_ASSEMBLED.fetch_add(total_len as u64, Ordering::Relaxed);
}

pub fn record_checksum_verification() {
    CHECKSUM_VERIFICATIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_checksum_failure() {
    CHECKSUM_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_region_extracted() {
    REGIONS_EXTRACTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_region_decompressed(bytes: usize) {
    REGIONS_DECOMPRESSED.fetch_add(1, Ordering::Relaxed);
    BYTES_DECOMPRESSED.fetch_add(bytes as u64, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        blobs_assembled: BLOBS_ASSEMBLED.load(Ordering::Relaxed),
        blob_bytes_assembled: BLOB_BYTES_ASSEMBLED.load(Ordering::Relaxed),

        checksum_verifications: CHECKSUM_VERIFICATIONS.load(Ordering::Relaxed),
        checksum_failures: CHECKSUM_FAILURES.load(Ordering::Relaxed),

        regions_extracted: REGIONS_EXTRACTED.load(Ordering::Relaxed),
        regions_decompressed: REGIONS_DECOMPRESSED.load(Ordering::Relaxed),
        bytes_decompressed: BYTES_DECOMPRESSED.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    BLOBS_ASSEMBLED.store(0, Ordering::Relaxed);
    BLOB_BYTES_ASSEMBLED.store(0, Ordering::Relaxed);

    CHECKSUM_VERIFICATIONS.store(0, Ordering::Relaxed);
    CHECKSUM_FAILURES.store(0, Ordering::Relaxed);

    REGIONS_EXTRACTED.store(0, Ordering::Relaxed);
    REGIONS_DECOMPRESSED.store(0, Ordering::Relaxed);
    BYTES_DECOMPRESSED.store(0, Ordering::Relaxed);
}
