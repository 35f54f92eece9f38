use clap::Parser;
use std::time::Duration;

use crate::config::{AssetRoot, HttpOptions};

#[derive(Parser, Debug)]
#[command(name = "assetio")]
#[command(version)]
#[command(about = "Read archives through the asset stream adapter", long_about = None)]
#[command(after_help = "Examples:\n  \
  assetio -r assets -l data/game.pak         show the length of data/game.pak\n  \
  assetio -r assets -o 16 -n 64 -x game.pak  hex dump 64 bytes from offset 16\n  \
  assetio -r https://cdn.example.com/assets game.pak > game.pak")]
pub struct Cli {
    /// Archive identifier, relative to the asset root
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Asset root: a directory or an HTTP(S) base URL
    #[arg(short = 'r', long = "root", env = "ASSETIO_ROOT", default_value = ".")]
    pub root: String,

    /// Print archive length and exit
    #[arg(short = 'l')]
    pub info: bool,

    /// Start reading at this offset
    #[arg(short = 'o', value_name = "OFFSET", default_value_t = 0)]
    pub offset: u64,

    /// Read at most this many bytes (default: to end of archive)
    #[arg(short = 'n', value_name = "COUNT")]
    pub count: Option<u64>,

    /// Hex dump instead of raw bytes
    #[arg(short = 'x')]
    pub hex: bool,

    /// Read the range again through a duplicate and compare
    #[arg(long)]
    pub verify_dup: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// HTTP connection attempts per read
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub max_retry: u32,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn asset_root(&self) -> AssetRoot {
        AssetRoot::parse(&self.root)
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout),
            max_retry: self.max_retry.max(1),
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_range_flags() {
        let cli = Cli::try_parse_from(["assetio", "-r", "assets", "-o", "16", "-n", "64", "-x", "game.pak"])
            .unwrap();
        assert_eq!(cli.archive, "game.pak");
        assert_eq!(cli.asset_root(), AssetRoot::parse("assets"));
        assert_eq!(cli.offset, 16);
        assert_eq!(cli.count, Some(64));
        assert!(cli.hex);
        assert!(!cli.info);
    }

    #[test]
    fn http_defaults() {
        let cli = Cli::try_parse_from(["assetio", "-r", "https://cdn.example.com", "a.pak"]).unwrap();
        let options = cli.http_options();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.max_retry, 10);
        assert!(matches!(cli.asset_root(), AssetRoot::Url(_)));
    }
}
