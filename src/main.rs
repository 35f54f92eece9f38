//! Main entry point for the assetio CLI application.
//!
//! Opens one archive through the stream adapter, from a local asset
//! directory or an HTTP asset root, and prints its length or a byte range.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, Write};

use assetio::{ArchiveIo, ArchiveStream, Cli, ReadStatus};

const CHUNK: usize = 64 * 1024;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.is_quiet() { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    let source = cli
        .asset_root()
        .open_source(&cli.http_options())
        .context("failed to set up asset root")?;
    let mut stream = ArchiveStream::open(source, &cli.archive)?;

    if cli.info {
        println!(
            "{}  {} ({})",
            stream.name(),
            format_size(stream.length()),
            stream.length()
        );
        return Ok(());
    }

    if cli.offset > 0 {
        stream.seek(cli.offset)?;
    }

    let remaining = stream.length() - stream.tell();
    let count = cli.count.map_or(remaining, |n| n.min(remaining));

    let mut stdout = io::stdout().lock();
    if cli.verify_dup {
        let mut dup = stream.duplicate()?;
        let original = read_range(&mut stream, count)?;
        let copy = read_range(dup.as_mut(), count)?;
        if original != copy {
            bail!("duplicate read back different bytes");
        }
        dup.destroy();
        write_out(&mut stdout, &original, cli.offset, cli.hex)?;
    } else {
        let data = read_range(&mut stream, count)?;
        write_out(&mut stdout, &data, cli.offset, cli.hex)?;
    }
    stdout.flush()?;

    Ok(())
}

/// Read up to `count` bytes, stopping early at end of file.
fn read_range(reader: &mut dyn ArchiveIo, count: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; CHUNK];
    while (out.len() as u64) < count {
        let want = (count - out.len() as u64).min(CHUNK as u64) as usize;
        match reader.read(&mut buf[..want])? {
            ReadStatus::Read(n) => out.extend_from_slice(&buf[..n]),
            ReadStatus::Eof => break,
        }
    }
    Ok(out)
}

fn write_out(out: &mut impl Write, data: &[u8], base: u64, hex: bool) -> Result<()> {
    if !hex {
        out.write_all(data)?;
        return Ok(());
    }

    for (i, line) in data.chunks(16).enumerate() {
        write!(out, "{:08x}  ", base + (i * 16) as u64)?;
        for byte in line {
            write!(out, "{:02x} ", byte)?;
        }
        for _ in line.len()..16 {
            write!(out, "   ")?;
        }
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(out, " |{}|", ascii)?;
    }
    Ok(())
}

/// Archive length as shown by `-l`, in the largest unit that fits.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
