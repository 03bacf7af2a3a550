//! Version provider: 64-byte build version string written into and compared against blobs.

use crate::consts::VERSION_STRING_LEN;

/// Supplies the running engine's own version string, already padded to the fixed width.
pub trait VersionProvider {
    fn version_string(&self) -> [u8; VERSION_STRING_LEN];
}

impl<T: VersionProvider + ?Sized> VersionProvider for Box<T> {
    fn version_string(&self) -> [u8; VERSION_STRING_LEN] {
        (**self).version_string()
    }
}

/// Version of this build: "snapblob <CARGO_PKG_VERSION>".
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildVersion;

impl VersionProvider for BuildVersion {
    fn version_string(&self) -> [u8; VERSION_STRING_LEN] {
        pad_version(concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")))
    }
}

/// Explicit version string (embedders, tests, `--version-string` in the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedVersion {
    padded: [u8; VERSION_STRING_LEN],
}

impl FixedVersion {
    pub fn new(version: &str) -> Self {
        Self {
            padded: pad_version(version),
        }
    }
}

impl VersionProvider for FixedVersion {
    fn version_string(&self) -> [u8; VERSION_STRING_LEN] {
        self.padded
    }
}

/// Zero-pad (or truncate) to exactly 64 bytes.
pub fn pad_version(version: &str) -> [u8; VERSION_STRING_LEN] {
    let mut out = [0u8; VERSION_STRING_LEN];
    let bytes = version.as_bytes();
    let n = bytes.len().min(VERSION_STRING_LEN);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Human-readable form of a stored version: up to the first NUL, lossy UTF-8.
pub fn version_display(v: &[u8]) -> String {
    let end = v.iter().position(|&b| b == 0).unwrap_or(v.len());
    String::from_utf8_lossy(&v[..end]).into_owned()
}
