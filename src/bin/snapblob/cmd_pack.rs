use anyhow::Result;
use log::info;
use std::path::PathBuf;

use snapblob::Snapshot;

use crate::util::{load_config, read_all, version_provider};

#[allow(clippy::too_many_arguments)]
pub fn exec(
    out: PathBuf,
    startup: PathBuf,
    read_only: PathBuf,
    contexts: Vec<PathBuf>,
    rehashable: bool,
    codec: Option<String>,
    pointer_size: Option<usize>,
    version_string: Option<String>,
) -> Result<()> {
    let cfg = load_config(pointer_size, codec.as_deref())?;

    let startup_bytes = read_all(&startup)?;
    let read_only_bytes = read_all(&read_only)?;
    let mut context_bytes = Vec::with_capacity(contexts.len());
    for p in &contexts {
        context_bytes.push(read_all(p)?);
    }

    let snap = Snapshot::new(cfg, version_provider(version_string))?;
    let blob = snap.create_blob(&startup_bytes, &read_only_bytes, &context_bytes, rehashable)?;
    blob.write_to(&out)?;

    info!(
        "packed {} ({} bytes, {} context(s), codec={}, pointer_size={})",
        out.display(),
        blob.len(),
        context_bytes.len(),
        snap.config().codec,
        snap.config().pointer_size
    );
    println!("{} bytes written to {}", blob.len(), out.display());
    Ok(())
}
