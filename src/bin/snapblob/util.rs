use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;

use snapblob::{BuildVersion, CodecKind, FixedVersion, SnapConfig, VersionProvider};

/// SnapConfig из ENV с поправками из аргументов CLI.
pub fn load_config(pointer_size: Option<usize>, codec: Option<&str>) -> Result<SnapConfig> {
    let mut cfg = SnapConfig::from_env();
    if let Some(ps) = pointer_size {
        cfg = cfg.with_pointer_size(ps);
    }
    if let Some(c) = codec {
        cfg = cfg.with_codec(CodecKind::parse(c)?);
    }
    cfg.validate()?;
    Ok(cfg)
}

/// --version-string или версия текущей сборки.
pub fn version_provider(version_string: Option<String>) -> Box<dyn VersionProvider + Send + Sync> {
    match version_string {
        Some(v) => Box::new(FixedVersion::new(&v)),
        None => Box::new(BuildVersion),
    }
}

pub fn read_all(p: &Path) -> Result<Vec<u8>> {
    let mut f = OpenOptions::new()
        .read(true)
        .open(p)
        .with_context(|| format!("open {}", p.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    to_hex(&h.finalize())
}
