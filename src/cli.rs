use clap::Parser;

use crate::zip::{ArchiveOptions, LegacyEncoding};

#[derive(Parser, Debug)]
#[command(name = "remotezip")]
#[command(version)]
#[command(about = "List and extract entries of remote ZIP archives using HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  remotezip -l https://example.com/archive.zip          list files from remote ZIP\n  \
  remotezip -p https://example.com/a.zip docs/README    print one entry to stdout\n  \
  remotezip data1.zip -x joe                            extract all files except joe from data1.zip")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Files to extract (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely with sizes and modification times
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Display the archive comment
    #[arg(short = 'z')]
    pub comment: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Decode names without the UTF-8 flag as Latin-1 instead of CP437
    #[arg(long)]
    pub latin1: bool,

    /// Skip CRC-32 verification of extracted files
    #[arg(long)]
    pub no_crc: bool,

    /// Print debug logs (RUST_LOG overrides)
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            legacy_encoding: if self.latin1 {
                LegacyEncoding::Latin1
            } else {
                LegacyEncoding::Cp437
            },
            verify_crc: !self.no_crc,
        }
    }
}
