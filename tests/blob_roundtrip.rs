// tests/blob_roundtrip.rs
//
// Запуск только этого файла:
//   cargo test --test blob_roundtrip -- --nocapture
//
// Покрываем:
// 1) assemble → extract_* возвращает байт-в-байт исходные регионы (ps=4/8, 0..6 контекстов).
// 2) Начало startup payload выровнено по pointer_size и лежит после таблицы смещений.
// 3) Blob без контекстов: read-only — весь хвост blob'а.
// 4) Параллельная нарезка одного blob'а из нескольких потоков.

use std::sync::Arc;
use std::thread;

use anyhow::Result;

use snapblob::blob::{assemble, read_u32, startup_payload_offset};
use snapblob::consts::{OFF_READ_ONLY_OFFSET, VERSION_STRING_LEN};
use snapblob::version::pad_version;
use snapblob::SnapshotBlob;

fn random_region(rng: &mut oorandom::Rand32, max_len: u32) -> Vec<u8> {
    let len = 1 + rng.rand_range(0..max_len) as usize;
    (0..len).map(|_| rng.rand_u32() as u8).collect()
}

fn version() -> [u8; VERSION_STRING_LEN] {
    pad_version("roundtrip-test")
}

#[test]
fn roundtrip_random_regions() -> Result<()> {
    let mut rng = oorandom::Rand32::new(0x5EED_B10B);

    for &ps in &[4usize, 8] {
        for n in 0..6usize {
            for &rehashable in &[false, true] {
                let startup = random_region(&mut rng, 3000);
                let read_only = random_region(&mut rng, 1500);
                let contexts: Vec<Vec<u8>> =
                    (0..n).map(|_| random_region(&mut rng, 700)).collect();

                let data = assemble(&startup, &read_only, &contexts, rehashable, &version(), ps)?;
                let blob = SnapshotBlob::from_vec(data, ps)?;

                assert!(blob.verify_checksum());
                assert_eq!(blob.extract_rehashability(), rehashable);
                assert_eq!(blob.context_count() as usize, n);
                assert_eq!(blob.extract_startup(), &startup[..]);
                assert_eq!(blob.extract_read_only(), &read_only[..]);
                for (i, c) in contexts.iter().enumerate() {
                    assert_eq!(blob.extract_context(i as u32), &c[..], "ps={} n={} i={}", ps, n, i);
                    assert!(blob.has_context(i as u32));
                }
                assert!(!blob.has_context(n as u32));
            }
        }
    }
    Ok(())
}

#[test]
fn startup_offset_alignment() -> Result<()> {
    for &ps in &[4usize, 8] {
        for &n in &[0u32, 1, 5] {
            let off = startup_payload_offset(n, ps).expect("no overflow for small counts");
            assert_eq!(off % ps, 0, "ps={} n={}", ps, n);
            assert!(off >= 80 + 4 * n as usize, "ps={} n={}", ps, n);

            // тот же offset реально используется assembler'ом
            let contexts: Vec<Vec<u8>> = (0..n).map(|i| vec![i as u8; 3]).collect();
            let data = assemble(b"startup!", b"ro", &contexts, false, &version(), ps)?;
            assert_eq!(&data[off..off + 8], b"startup!");
            assert!(data[80 + 4 * n as usize..off].iter().all(|&b| b == 0));
        }
    }
    Ok(())
}

#[test]
fn empty_context_list_read_only_is_tail() -> Result<()> {
    let data = assemble::<Vec<u8>>(b"SSSS", b"read-only tail", &[], true, &version(), 8)?;
    let ro_off = read_u32(&data, OFF_READ_ONLY_OFFSET)? as usize;
    assert!(ro_off < data.len());

    let blob = SnapshotBlob::from_vec(data, 8)?;
    assert_eq!(blob.context_count(), 0);
    assert_eq!(blob.extract_read_only(), b"read-only tail");
    assert_eq!(ro_off + blob.extract_read_only().len(), blob.len());
    assert!(!blob.has_context(0));
    Ok(())
}

#[test]
fn empty_regions_are_not_errors() -> Result<()> {
    // пустые регионы — вырожденный, но допустимый ввод
    let data = assemble(b"", b"", &[Vec::new(), b"x".to_vec(), Vec::new()], false, &version(), 8)?;
    let blob = SnapshotBlob::from_vec(data, 8)?;
    assert!(blob.verify_checksum());
    assert!(blob.extract_startup().is_empty());
    assert!(blob.extract_read_only().is_empty());
    assert!(blob.extract_context(0).is_empty());
    assert_eq!(blob.extract_context(1), b"x");
    assert!(blob.extract_context(2).is_empty());
    Ok(())
}

#[test]
fn concurrent_extraction_from_shared_blob() -> Result<()> {
    let contexts: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 64 + i as usize]).collect();
    let data = assemble(&[0xAA; 512], &[0xBB; 256], &contexts, true, &version(), 8)?;
    let blob = Arc::new(SnapshotBlob::from_vec(data, 8)?);

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let blob = Arc::clone(&blob);
            thread::spawn(move || {
                for _ in 0..200 {
                    assert!(blob.verify_checksum());
                    assert_eq!(blob.extract_startup().len(), 512);
                    assert_eq!(blob.extract_read_only().len(), 256);
                    let c = blob.extract_context(t);
                    assert_eq!(c.len(), 64 + t as usize);
                    assert!(c.iter().all(|&b| b == t as u8));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("extraction thread panicked");
    }
    Ok(())
}
