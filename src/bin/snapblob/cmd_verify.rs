use anyhow::{anyhow, Result};
use std::path::PathBuf;

use snapblob::SnapshotBlob;

use crate::util::{load_config, version_provider};

pub fn exec(path: PathBuf, pointer_size: Option<usize>, version_string: Option<String>) -> Result<()> {
    let cfg = load_config(pointer_size, None)?;
    let blob = SnapshotBlob::open(&path, cfg.pointer_size)?;
    let provider = version_provider(version_string);

    blob.try_check_version(provider.as_ref())?;
    if !blob.verify_checksum() {
        return Err(anyhow!("checksum mismatch in {}", path.display()));
    }
    blob.try_extract_rehashability()?;
    blob.regions()?;

    println!("OK: {} ({} bytes, {} context(s))", path.display(), blob.len(), blob.try_context_count()?);
    Ok(())
}
