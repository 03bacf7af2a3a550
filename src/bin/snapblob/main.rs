use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_pack;
mod cmd_inspect;
mod cmd_extract;
mod cmd_verify;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./snapblob inspect --blob snapshot.bin
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();
    match cli.cmd {
        cli::Cmd::Pack {
            out,
            startup,
            read_only,
            context,
            rehashable,
            codec,
            pointer_size,
            version_string,
        } => cmd_pack::exec(
            out,
            startup,
            read_only,
            context,
            rehashable,
            codec,
            pointer_size,
            version_string,
        ),

        cli::Cmd::Inspect { blob, json, pointer_size, version_string } =>
            cmd_inspect::exec(blob, json, pointer_size, version_string),

        cli::Cmd::Extract { blob, region, index, out, codec, pointer_size } =>
            cmd_extract::exec(blob, region, index, out, codec, pointer_size),

        cli::Cmd::Verify { blob, pointer_size, version_string } =>
            cmd_verify::exec(blob, pointer_size, version_string),
    }
}
