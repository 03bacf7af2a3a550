//! Centralized configuration and builder for snapblob.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - The same config drives both blob assembly and blob loading: pointer size and codec
//!   are not recorded in the blob, so build and load must agree on them.
//!
//! Env variables:
//! - SNAPBLOB_POINTER_SIZE (4|8, default = host pointer width)
//! - SNAPBLOB_CODEC (none|zstd|zlib, default none)
//! - SNAPBLOB_ZSTD_LEVEL (default 0 = zstd default level)
//! - SNAPBLOB_VERIFY_CHECKSUM (default true)
//! - SNAPBLOB_PROFILE (default false) — log deserialization timings and blob composition
//! - SNAPBLOB_MAX_REGION_BYTES (default 1 GiB) — cap for a decompressed region

use anyhow::Result;
use log::warn;
use std::fmt;

use crate::blob::layout::validate_pointer_size;
use crate::codec::{CodecKind, RegionCodec};
use crate::consts::{DEFAULT_MAX_REGION_BYTES, HOST_POINTER_SIZE};

/// Top-level configuration for blob assembly and loading.
#[derive(Clone, Debug)]
pub struct SnapConfig {
    /// Pointer size of the target runtime; startup payload is aligned to it.
    /// Env: SNAPBLOB_POINTER_SIZE
    pub pointer_size: usize,

    /// Region compression strategy.
    /// Env: SNAPBLOB_CODEC
    pub codec: CodecKind,

    /// zstd compression level (only used with codec = zstd).
    /// Env: SNAPBLOB_ZSTD_LEVEL
    pub zstd_level: i32,

    /// Treat a checksum mismatch on initialization as fatal. When false the check is skipped.
    /// Env: SNAPBLOB_VERIFY_CHECKSUM = 0|1 (default 1)
    pub verify_checksum: bool,

    /// Log timings/sizes of assembly and deserialization.
    /// Env: SNAPBLOB_PROFILE = 0|1 (default 0)
    pub profile_deserialization: bool,

    /// Upper bound for a single decompressed region.
    /// Env: SNAPBLOB_MAX_REGION_BYTES
    pub max_region_bytes: usize,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            pointer_size: HOST_POINTER_SIZE,
            codec: CodecKind::None,
            zstd_level: 0,
            verify_checksum: true,
            profile_deserialization: false,
            max_region_bytes: DEFAULT_MAX_REGION_BYTES,
        }
    }
}

fn env_flag(s: &str) -> bool {
    let s = s.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

impl SnapConfig {
    /// Load configuration from environment variables. Unparsable values keep the default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SNAPBLOB_POINTER_SIZE") {
            match v.trim().parse::<usize>() {
                Ok(n) if validate_pointer_size(n).is_ok() => cfg.pointer_size = n,
                _ => warn!("ignoring SNAPBLOB_POINTER_SIZE={:?}", v),
            }
        }

        if let Ok(v) = std::env::var("SNAPBLOB_CODEC") {
            match CodecKind::parse(&v) {
                Ok(k) => cfg.codec = k,
                Err(e) => warn!("ignoring SNAPBLOB_CODEC: {}", e),
            }
        }

        if let Ok(v) = std::env::var("SNAPBLOB_ZSTD_LEVEL") {
            if let Ok(n) = v.trim().parse::<i32>() {
                cfg.zstd_level = n;
            }
        }

        if let Ok(v) = std::env::var("SNAPBLOB_VERIFY_CHECKSUM") {
            cfg.verify_checksum = env_flag(&v);
        }

        if let Ok(v) = std::env::var("SNAPBLOB_PROFILE") {
            cfg.profile_deserialization = env_flag(&v);
        }

        if let Ok(v) = std::env::var("SNAPBLOB_MAX_REGION_BYTES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.max_region_bytes = n;
            }
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_pointer_size(mut self, pointer_size: usize) -> Self {
        self.pointer_size = pointer_size;
        self
    }

    pub fn with_codec(mut self, codec: CodecKind) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_zstd_level(mut self, level: i32) -> Self {
        self.zstd_level = level;
        self
    }

    pub fn with_verify_checksum(mut self, on: bool) -> Self {
        self.verify_checksum = on;
        self
    }

    pub fn with_profile_deserialization(mut self, on: bool) -> Self {
        self.profile_deserialization = on;
        self
    }

    pub fn with_max_region_bytes(mut self, n: usize) -> Self {
        self.max_region_bytes = n;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> Self {
        self
    }

    /// Reject settings the format cannot honor.
    pub fn validate(&self) -> Result<()> {
        validate_pointer_size(self.pointer_size)
    }

    /// Instantiate the configured codec strategy.
    pub fn region_codec(&self) -> Box<dyn RegionCodec> {
        self.codec.build(self.zstd_level, self.max_region_bytes)
    }
}

impl fmt::Display for SnapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnapConfig {{ \
             pointer_size: {}, \
             codec: {}, \
             zstd_level: {}, \
             verify_checksum: {}, \
             profile_deserialization: {}, \
             max_region_bytes: {} \
             }}",
            self.pointer_size,
            self.codec,
            self.zstd_level,
            self.verify_checksum,
            self.profile_deserialization,
            self.max_region_bytes,
        )
    }
}
