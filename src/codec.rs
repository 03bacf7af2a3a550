//! codec — сжатие регионов snapshot blob (стратегия выбирается в runtime).
//!
//! Кадр сжатого региона: [uncompressed_len u32 LE][поток кодека].
//! Сжимается регион целиком: кадр никогда не пересекает заголовок или соседний регион.
//!
//! Декомпрессия потоковая, с ограничением по заявленной длине и по max_region_bytes,
//! чтобы испорченный префикс не приводил к гигантским аллокациям.

use anyhow::{anyhow, Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::borrow::Cow;
use std::fmt;
use std::io::Read;

use crate::consts::{
    CODEC_NONE, CODEC_ZLIB, CODEC_ZSTD, COMPRESSED_PREFIX_LEN, DEFAULT_MAX_REGION_BYTES,
};

/// Стратегия сжатия регионов.
pub trait RegionCodec: Send + Sync {
    /// Стабильный числовой id (0=none, 1=zstd, 2=zlib).
    fn id(&self) -> u16;
    fn name(&self) -> &'static str;
    fn compress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>>;
    fn decompress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>>;
}

/// Вид кодека (значение конфигурации).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodecKind {
    #[default]
    None,
    Zstd,
    Zlib,
}

impl CodecKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" | "0" => Ok(CodecKind::None),
            "zstd" | "1" => Ok(CodecKind::Zstd),
            "zlib" | "deflate" | "2" => Ok(CodecKind::Zlib),
            other => Err(anyhow!("unknown codec '{}' (expected none|zstd|zlib)", other)),
        }
    }

    pub fn id(self) -> u16 {
        match self {
            CodecKind::None => CODEC_NONE,
            CodecKind::Zstd => CODEC_ZSTD,
            CodecKind::Zlib => CODEC_ZLIB,
        }
    }

    /// Построить стратегию (один раз на сборку/загрузку).
    pub fn build(self, zstd_level: i32, max_region_bytes: usize) -> Box<dyn RegionCodec> {
        match self {
            CodecKind::None => Box::new(NoCodec),
            CodecKind::Zstd => Box::new(ZstdCodec {
                level: zstd_level,
                max_region_bytes,
            }),
            CodecKind::Zlib => Box::new(ZlibCodec { max_region_bytes }),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::None => write!(f, "none"),
            CodecKind::Zstd => write!(f, "zstd"),
            CodecKind::Zlib => write!(f, "zlib"),
        }
    }
}

// ---------------- none ----------------

/// Без сжатия: регион передаётся как есть.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCodec;

impl RegionCodec for NoCodec {
    fn id(&self) -> u16 {
        CODEC_NONE
    }
    fn name(&self) -> &'static str {
        "none"
    }
    fn compress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(region))
    }
    fn decompress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(region))
    }
}

// ---------------- zstd ----------------

#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    pub level: i32,
    pub max_region_bytes: usize,
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self {
            level: 0,
            max_region_bytes: DEFAULT_MAX_REGION_BYTES,
        }
    }
}

impl RegionCodec for ZstdCodec {
    fn id(&self) -> u16 {
        CODEC_ZSTD
    }
    fn name(&self) -> &'static str {
        "zstd"
    }
    fn compress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let body = zstd::bulk::compress(region, self.level).context("zstd compress region")?;
        Ok(Cow::Owned(frame(region.len(), &body)?))
    }
    fn decompress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let (expected, body) = unframe(region, self.max_region_bytes)?;
        let decoder = zstd::stream::read::Decoder::new(body)
            .map_err(|e| anyhow!("zstd decoder init: {}", e))?;
        Ok(Cow::Owned(read_bounded(decoder, expected, "zstd")?))
    }
}

// ---------------- zlib ----------------

#[derive(Debug, Clone, Copy)]
pub struct ZlibCodec {
    pub max_region_bytes: usize,
}

impl Default for ZlibCodec {
    fn default() -> Self {
        Self {
            max_region_bytes: DEFAULT_MAX_REGION_BYTES,
        }
    }
}

impl RegionCodec for ZlibCodec {
    fn id(&self) -> u16 {
        CODEC_ZLIB
    }
    fn name(&self) -> &'static str {
        "zlib"
    }
    fn compress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let mut body = Vec::with_capacity(region.len() / 2 + 16);
        ZlibEncoder::new(region, Compression::default())
            .read_to_end(&mut body)
            .context("zlib compress region")?;
        Ok(Cow::Owned(frame(region.len(), &body)?))
    }
    fn decompress<'a>(&self, region: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let (expected, body) = unframe(region, self.max_region_bytes)?;
        Ok(Cow::Owned(read_bounded(ZlibDecoder::new(body), expected, "zlib")?))
    }
}

// ---------------- framing helpers ----------------

fn frame(uncompressed_len: usize, body: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(uncompressed_len)
        .map_err(|_| anyhow!("region of {} bytes too large to compress", uncompressed_len))?;
    let mut out = vec![0u8; COMPRESSED_PREFIX_LEN + body.len()];
    LittleEndian::write_u32(&mut out[..COMPRESSED_PREFIX_LEN], len);
    out[COMPRESSED_PREFIX_LEN..].copy_from_slice(body);
    Ok(out)
}

fn unframe(region: &[u8], max_region_bytes: usize) -> Result<(usize, &[u8])> {
    if region.len() < COMPRESSED_PREFIX_LEN {
        return Err(anyhow!(
            "compressed region too small ({} bytes) for length prefix",
            region.len()
        ));
    }
    let expected = LittleEndian::read_u32(&region[..COMPRESSED_PREFIX_LEN]) as usize;
    if expected > max_region_bytes {
        return Err(anyhow!(
            "compressed region declares {} bytes, exceeds max_region_bytes {}",
            expected,
            max_region_bytes
        ));
    }
    Ok((expected, &region[COMPRESSED_PREFIX_LEN..]))
}

/// Прочитать ровно expected байт; больше или меньше — ошибка.
fn read_bounded<R: Read>(reader: R, expected: usize, what: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(std::cmp::min(expected, 8 * 1024 * 1024));
    reader
        .take(expected as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| anyhow!("{} decode: {}", what, e))?;
    if out.len() != expected {
        return Err(anyhow!(
            "{} decoded {} bytes, region header declares {}",
            what,
            out.len(),
            expected
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Vec<u8> {
        (0..10_000u32).flat_map(|i| (i % 97).to_le_bytes()).collect()
    }

    #[test]
    fn none_is_identity_and_borrowed() {
        let data = payload();
        let c = NoCodec.compress(&data).unwrap();
        assert!(matches!(c, Cow::Borrowed(_)));
        assert_eq!(&*NoCodec.decompress(&c).unwrap(), &data[..]);
    }

    #[test]
    fn zstd_and_zlib_shrink_and_restore() {
        let data = payload();
        for kind in [CodecKind::Zstd, CodecKind::Zlib] {
            let codec = kind.build(0, DEFAULT_MAX_REGION_BYTES);
            let packed = codec.compress(&data).unwrap();
            assert!(packed.len() < data.len(), "{} did not shrink", codec.name());
            assert_eq!(LittleEndian::read_u32(&packed[..4]) as usize, data.len());
            let restored = codec.decompress(&packed).unwrap();
            assert_eq!(&*restored, &data[..]);
        }
    }

    #[test]
    fn wrong_declared_length_is_error() {
        let data = payload();
        let codec = ZstdCodec::default();
        let mut packed = codec.compress(&data).unwrap().into_owned();
        LittleEndian::write_u32(&mut packed[..4], data.len() as u32 - 1);
        assert!(codec.decompress(&packed).is_err());
        LittleEndian::write_u32(&mut packed[..4], data.len() as u32 + 1);
        assert!(codec.decompress(&packed).is_err());
    }

    #[test]
    fn max_region_guard() {
        let data = payload();
        let packed = ZlibCodec::default().compress(&data).unwrap();
        let tight = ZlibCodec { max_region_bytes: 100 };
        let err = tight.decompress(&packed).unwrap_err();
        assert!(err.to_string().contains("max_region_bytes"));
    }

    #[test]
    fn parse_codec_names() {
        assert_eq!(CodecKind::parse("ZSTD").unwrap(), CodecKind::Zstd);
        assert_eq!(CodecKind::parse("deflate").unwrap(), CodecKind::Zlib);
        assert_eq!(CodecKind::parse("").unwrap(), CodecKind::None);
        assert!(CodecKind::parse("lz4").is_err());
    }
}
