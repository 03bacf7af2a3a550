// Отдельный тестовый бинарь: глобальные счётчики здесь никто больше не трогает.

use anyhow::Result;

use snapblob::metrics;
use snapblob::{FixedVersion, SnapConfig, Snapshot};

#[test]
fn counters_track_assembly_and_checksum() -> Result<()> {
    metrics::reset();
    let m = metrics::snapshot();
    assert_eq!(m.blobs_assembled, 0);
    assert_eq!(m.checksum_verifications, 0);

    let snap = Snapshot::new(SnapConfig::default(), FixedVersion::new("m"))?;
    let blob = snap.create_blob(b"startup", b"ro", &[b"ctx".as_slice()], false)?;
    assert!(blob.verify_checksum());

    let mut data = blob.as_bytes().to_vec();
    let last = data.len() - 1;
    data[last] ^= 1;
    assert!(!snapblob::verify_checksum(&data));

    blob.extract_context(0);

    let m = metrics::snapshot();
    assert_eq!(m.blobs_assembled, 1);
    assert_eq!(m.blob_bytes_assembled, blob.len() as u64);
    assert_eq!(m.checksum_verifications, 2);
    assert_eq!(m.checksum_failures, 1);
    assert!((m.checksum_failure_ratio() - 0.5).abs() < 1e-9);
    assert_eq!(m.regions_extracted, 1);
    assert_eq!(m.regions_decompressed, 0);

    metrics::reset();
    assert_eq!(metrics::snapshot().checksum_failures, 0);
    Ok(())
}
