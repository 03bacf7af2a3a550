use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use snapblob::SnapshotBlob;

use crate::cli::RegionArg;
use crate::util::load_config;

pub fn exec(
    path: PathBuf,
    region: RegionArg,
    index: u32,
    out: PathBuf,
    codec: Option<String>,
    pointer_size: Option<usize>,
) -> Result<()> {
    let cfg = load_config(pointer_size, codec.as_deref())?;
    let blob = SnapshotBlob::open(&path, cfg.pointer_size)?;

    let raw = match region {
        RegionArg::Startup => blob.try_extract_startup()?,
        RegionArg::ReadOnly => blob.try_extract_read_only()?,
        RegionArg::Context => blob.try_extract_context(index)?,
    };
    let data = cfg
        .region_codec()
        .decompress(raw)
        .with_context(|| format!("decompress {:?} region", region))?;

    fs::write(&out, &data).with_context(|| format!("write {}", out.display()))?;
    println!(
        "{} bytes ({} stored) written to {}",
        data.len(),
        raw.len(),
        out.display()
    );
    Ok(())
}
