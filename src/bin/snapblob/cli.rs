use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI для snapshot blob: сборка, просмотр, извлечение регионов, проверка.
#[derive(Parser, Debug)]
#[command(name = "snapblob", version, about = "Snapshot blob tool")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionArg {
    Startup,
    ReadOnly,
    Context,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Assemble a blob from region files
    ///
    /// Пример:
    ///   snapblob pack --out snap.bin --startup s.bin --read-only ro.bin --context c0.bin --context c1.bin
    Pack {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        startup: PathBuf,
        #[arg(long)]
        read_only: PathBuf,
        /// Context region files, in index order (repeatable)
        #[arg(long)]
        context: Vec<PathBuf>,
        #[arg(long, default_value_t = false)]
        rehashable: bool,
        /// none | zstd | zlib (default: SNAPBLOB_CODEC or none)
        #[arg(long)]
        codec: Option<String>,
        /// 4 | 8 (default: SNAPBLOB_POINTER_SIZE or host)
        #[arg(long)]
        pointer_size: Option<usize>,
        /// Override the embedded version string (default: this build)
        #[arg(long)]
        version_string: Option<String>,
    },
    /// Print header, region table and integrity status
    Inspect {
        #[arg(long)]
        blob: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
        #[arg(long)]
        pointer_size: Option<usize>,
        /// Version to compare against (default: this build)
        #[arg(long)]
        version_string: Option<String>,
    },
    /// Write one region (decompressed) to a file
    Extract {
        #[arg(long)]
        blob: PathBuf,
        #[arg(long, value_enum)]
        region: RegionArg,
        /// Context index (with --region context)
        #[arg(long, default_value_t = 0)]
        index: u32,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        codec: Option<String>,
        #[arg(long)]
        pointer_size: Option<usize>,
    },
    /// Version + checksum gate; exits with 1 on failure
    Verify {
        #[arg(long)]
        blob: PathBuf,
        #[arg(long)]
        pointer_size: Option<usize>,
        #[arg(long)]
        version_string: Option<String>,
    },
}
