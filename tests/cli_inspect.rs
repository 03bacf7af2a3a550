// tests/cli_inspect.rs
//
// inspect на повреждённом blob'е: не падает, печатает то, что удалось прочитать.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use snapblob::blob::{assemble, write_u32};
use snapblob::consts::OFF_CONTEXT_COUNT;
use snapblob::version::pad_version;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("snapblob-test-{prefix}-{pid}-{t}-{id}"))
}

fn corrupt_count_blob(root: &Path) -> Result<PathBuf> {
    let mut data = assemble(
        b"startup",
        b"read-only",
        &[b"c0".as_slice(), b"c1".as_slice()],
        true,
        &pad_version("inspect"),
        8,
    )?;
    write_u32(&mut data, OFF_CONTEXT_COUNT, 1000)?;
    let path = root.join("corrupt.bin");
    fs::write(&path, &data)?;
    Ok(path)
}

fn inspect(path: &Path, json: bool) -> Result<(bool, String)> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_snapblob"));
    cmd.arg("inspect")
        .arg("--blob")
        .arg(path)
        .arg("--pointer-size")
        .arg("8")
        .arg("--version-string")
        .arg("inspect");
    if json {
        cmd.arg("--json");
    }
    let out = cmd.output()?;
    Ok((out.status.success(), String::from_utf8_lossy(&out.stdout).into_owned()))
}

#[test]
fn corrupt_header_is_reported_not_fatal() -> Result<()> {
    let root = unique_root("inspect");
    fs::create_dir_all(&root)?;
    let path = corrupt_count_blob(&root)?;

    let (ok, text) = inspect(&path, false)?;
    assert!(ok, "inspect exited with failure:\n{}", text);
    assert!(text.contains("context_count    = 1000"), "{}", text);
    assert!(text.contains("rehashable       = true"), "{}", text);
    assert!(text.contains("version check    = ok"), "{}", text);
    assert!(text.contains("header: ERROR"), "{}", text);
    assert!(text.contains("regions: ERROR"), "{}", text);

    let (ok, text) = inspect(&path, true)?;
    assert!(ok, "inspect --json exited with failure:\n{}", text);
    let v: serde_json::Value = serde_json::from_str(&text)?;
    assert!(v["header"]["error"].is_string(), "{}", v);
    assert_eq!(v["header"]["context_count"], 1000);
    assert_eq!(v["version_ok"], true);
    assert!(v["regions"]["error"].is_string(), "{}", v);

    let _ = fs::remove_dir_all(&root);
    Ok(())
}
