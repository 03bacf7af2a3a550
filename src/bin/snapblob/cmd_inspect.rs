use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use snapblob::blob::layout::startup_payload_offset;
use snapblob::metrics;
use snapblob::version::version_display;
use snapblob::SnapshotBlob;

use crate::util::{load_config, sha256_hex, version_provider};

/// Печать заголовка и таблицы регионов. Повреждения не фатальны: выводим, что удалось прочитать.
pub fn exec(
    path: PathBuf,
    json: bool,
    pointer_size: Option<usize>,
    version_string: Option<String>,
) -> Result<()> {
    let cfg = load_config(pointer_size, None)?;
    let blob = SnapshotBlob::open(&path, cfg.pointer_size)?;
    let provider = version_provider(version_string);

    let header = blob.header();
    let regions = blob.regions();
    let checksum_ok = blob.verify_checksum();
    let version_check = blob.try_check_version(provider.as_ref());
    let rehashable = blob.try_extract_rehashability();
    let context_count = blob.try_context_count();
    let startup_offset = context_count
        .as_ref()
        .ok()
        .and_then(|&n| startup_payload_offset(n, cfg.pointer_size));

    if json {
        let header_json = match &header {
            Ok(h) => json!({
                "context_count": h.context_count,
                "rehashable": h.rehashable(),
                "rehashable_raw": h.rehashable_raw,
                "checksum": h.checksum,
                "version": version_display(&h.version),
                "read_only_offset": h.read_only_offset,
                "context_offsets": h.context_offsets,
                "startup_offset": startup_offset,
            }),
            Err(e) => json!({
                "error": format!("{:#}", e),
                "context_count": context_count.as_ref().ok(),
                "rehashable": rehashable.as_ref().ok(),
                "startup_offset": startup_offset,
            }),
        };
        let regions_json = match &regions {
            Ok(rs) => serde_json::to_value(rs)?,
            Err(e) => json!({ "error": format!("{:#}", e) }),
        };
        let out = json!({
            "path": path.display().to_string(),
            "total_length": blob.len(),
            "pointer_size": cfg.pointer_size,
            "sha256": sha256_hex(blob.as_bytes()),
            "header": header_json,
            "regions": regions_json,
            "checksum_ok": checksum_ok,
            "version_ok": version_check.is_ok(),
            "metrics": metrics::snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Snapshot blob: {}", path.display());
    println!("  total_length     = {}", blob.len());
    println!("  sha256           = {}", sha256_hex(blob.as_bytes()));
    println!("  pointer_size     = {}", cfg.pointer_size);
    match &context_count {
        Ok(n) => println!("  context_count    = {}", n),
        Err(e) => println!("  context_count    = ERROR {:#}", e),
    }
    match &rehashable {
        Ok(r) => println!("  rehashable       = {}", r),
        Err(e) => println!("  rehashable       = INVALID ({:#})", e),
    }
    println!("  checksum         = {}", if checksum_ok { "ok" } else { "MISMATCH" });
    match &version_check {
        Ok(()) => println!("  version check    = ok"),
        Err(_) => println!(
            "  version check    = MISMATCH (binary: {})",
            version_display(&provider.version_string())
        ),
    }
    match startup_offset {
        Some(off) => println!("  startup_offset   = {}", off),
        None => println!("  startup_offset   = unknown"),
    }
    match &header {
        Ok(h) => {
            println!("  stored checksum  = {:#010x}", h.checksum);
            println!("  version          = {}", version_display(&h.version));
            println!("  read_only_offset = {}", h.read_only_offset);
            println!("  context_offsets  = {:?}", h.context_offsets);
        }
        Err(e) => println!("  header: ERROR {:#}", e),
    }
    match regions {
        Ok(rs) => {
            println!("  regions:");
            for r in rs {
                println!("    {:<12} offset={:<10} length={}", r.kind.to_string(), r.offset, r.length);
            }
        }
        Err(e) => println!("  regions: ERROR {:#}", e),
    }
    Ok(())
}
