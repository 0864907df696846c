//! Main entry point for the remotezip CLI application.
//!
//! Lists and extracts entries of ZIP archives on HTTP servers (through Range
//! requests) or on the local filesystem.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, LevelFilter};

use remotezip::{
    Cli, EntryDescriptor, HttpOptions, HttpRangeFetcher, LocalFileFetcher, RangeFetch, RemoteZip,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug)?;

    if cli.is_http_url() {
        let options = HttpOptions {
            timeout: Duration::from_secs(cli.timeout),
            ..HttpOptions::default()
        };
        let fetcher = Arc::new(HttpRangeFetcher::with_options(cli.file.as_str(), &options)?);

        let archive = RemoteZip::open_with_options(fetcher.clone(), cli.archive_options())
            .await
            .with_context(|| format!("Failed to open {}", cli.file))?;
        process_zip(&archive, &cli).await?;

        // Network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {}",
                format_size(fetcher.transferred_bytes())
            );
        }
    } else {
        let fetcher = Arc::new(LocalFileFetcher::new(Path::new(&cli.file))?);
        let archive = RemoteZip::open_with_options(fetcher, cli.archive_options())
            .await
            .with_context(|| format!("Failed to open {}", cli.file))?;
        process_zip(&archive, &cli).await?;
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` overrides the default filter.
fn setup_logging(debug: bool) -> Result<()> {
    let default_directive: Directive = if debug {
        "remotezip=debug".parse()?
    } else {
        LevelFilter::OFF.into()
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_directive)
        .from_env()
        .context("Invalid RUST_LOG directives")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Process an opened archive based on CLI options.
///
/// - Comment mode (`-z`): print the archive comment first
/// - List mode (`-l` or `-v`): display archive contents
/// - Extract mode: extract entries matching the positional and `-x` filters
///
/// # Arguments
///
/// * `archive` - The opened archive, over any range fetcher
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or the first extraction error.
async fn process_zip<F: RangeFetch>(archive: &RemoteZip<F>, cli: &Cli) -> Result<()> {
    if cli.comment {
        println!("{}", archive.comment_text());
        if !cli.list && !cli.verbose {
            return Ok(());
        }
    }

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        list_files(archive, cli.verbose);
        return Ok(());
    }

    // Skip directories (created during extraction), then apply the
    // positional selection and the -x exclusions.
    let files_to_extract: Vec<_> = archive
        .all()
        .iter()
        .filter(|e| !e.is_dir())
        .filter(|e| {
            cli.files.is_empty()
                || cli.files.iter().any(|f| {
                    if has_glob_chars(f) {
                        glob_match(f, &e.file_name)
                    } else {
                        e.file_name == *f || base_name(&e.file_name) == *f
                    }
                })
        })
        .filter(|e| {
            !cli.exclude
                .iter()
                .any(|x| e.file_name.contains(x.as_str()) || glob_match(x, &e.file_name))
        })
        .collect();

    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for entry in files_to_extract {
        extract_file(archive, entry, cli, multiple_files).await?;
    }

    Ok(())
}

/// Print the archive contents.
///
/// - Simple format (`-l`): entry names, one per line
/// - Verbose format (`-v`): sizes, compression ratio and timestamps, with totals
///
/// # Arguments
///
/// * `archive` - The opened archive
/// * `verbose` - If true, print the detailed table
fn list_files<F: RangeFetch>(archive: &RemoteZip<F>, verbose: bool) {
    if !verbose {
        for name in archive.list() {
            println!("{name}");
        }
        return;
    }

    println!(
        "{:>10}  {:>10}  {:>5}  {:>19}  Name",
        "Length", "Size", "Cmpr", "Modified"
    );
    println!("{}", "-".repeat(70));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.all() {
        println!(
            "{:>10}  {:>10}  {}  {}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            entry.modified,
            entry.file_name
        );

        if !entry.is_dir() {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {}  {:>19}  {} files",
        total_uncompressed,
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );
}

/// Extract a single entry from the archive.
///
/// - Pipe mode (`-p`): write to stdout instead of a file
/// - Output directory (`-d`): extract below the given directory
/// - Junk paths (`-j`): drop the directory part of the entry name
/// - Overwrite control (`-n`, `-o`): handle existing files
///
/// Names that would land outside the output directory are skipped.
///
/// # Arguments
///
/// * `archive` - The opened archive
/// * `entry` - The entry to extract
/// * `cli` - Parsed command-line arguments
/// * `show_filename` - If true, print a name marker before the content (pipe mode with several entries)
///
/// # Returns
///
/// Returns `Ok(())` on success or when the entry is skipped, or an error if
/// fetching, decompressing or writing fails.
async fn extract_file<F: RangeFetch>(
    archive: &RemoteZip<F>,
    entry: &EntryDescriptor,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    // Pipe mode: write the entry contents straight to stdout
    if cli.pipe {
        let data = archive.read_descriptor(entry).await?;
        let mut stdout = tokio::io::stdout();
        if show_filename {
            stdout
                .write_all(format!("--- {} ---\n", entry.file_name).as_bytes())
                .await?;
        }
        stdout.write_all(&data).await?;
        stdout.flush().await?;
        return Ok(());
    }

    // Junk paths: keep only the final component of the entry name
    let file_name = if cli.junk_paths {
        base_name(&entry.file_name)
    } else {
        entry.file_name.clone()
    };

    // The output path must stay inside the extraction directory
    let Some(relative) = enclosed_path(&file_name) else {
        warn!("Refusing to extract unsafe path `{}`", entry.file_name);
        if !cli.is_very_quiet() {
            eprintln!("Skipping: {} (unsafe path)", entry.file_name);
        }
        return Ok(());
    };
    let output_path = match cli.extract_dir {
        Some(ref dir) => PathBuf::from(dir).join(relative),
        None => relative,
    };

    // Existing files are kept unless -o is given; -n always wins
    if output_path.exists() && (cli.never_overwrite || !cli.overwrite) {
        if !cli.is_very_quiet() {
            if cli.never_overwrite {
                eprintln!("Skipping: {} (file exists)", entry.file_name);
            } else {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.file_name);
            }
        }
        return Ok(());
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.file_name);
    }

    let data = archive
        .read_descriptor(entry)
        .await
        .with_context(|| format!("Failed to extract {}", entry.file_name))?;

    // Create parent directories as needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(&output_path, &data).await?;

    Ok(())
}

/// Turn an entry name into a path relative to the extraction directory.
///
/// Only plain components are kept; `.` is dropped.
///
/// # Returns
///
/// Returns `None` if the name holds `..`, a root or a drive prefix, or has no
/// component left to write.
fn enclosed_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!path.as_os_str().is_empty()).then_some(path)
}

/// Final path component of an entry name, or the name itself when it has none.
fn base_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Space saved by compression, as a right-aligned percentage.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters, including `/`
/// - `?` matches exactly one character
///
/// # Arguments
///
/// * `pattern` - The glob pattern
/// * `text` - The entry name to test
///
/// # Returns
///
/// Returns `true` if the whole of `text` matches `pattern`.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if p == t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    do_match(&pattern, &text)
}

/// Format a byte size into a human-readable string.
///
/// # Arguments
///
/// * `size` - Size in bytes
///
/// # Returns
///
/// Returns the size with two decimals in the largest fitting binary unit
/// (e.g. "1.50 KB"), or plain bytes below 1 KiB.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosed_paths() {
        assert_eq!(enclosed_path("docs/readme.txt"), Some(PathBuf::from("docs/readme.txt")));
        assert_eq!(enclosed_path("./a/./b.txt"), Some(PathBuf::from("a/b.txt")));
        assert_eq!(enclosed_path("../escaped.txt"), None);
        assert_eq!(enclosed_path("a/../../b.txt"), None);
        assert_eq!(enclosed_path("/etc/passwd"), None);
        assert_eq!(enclosed_path("."), None);
        assert_eq!(enclosed_path(""), None);
    }

    #[test]
    fn globs() {
        assert!(glob_match("*.txt", "readme.txt"));
        assert!(glob_match("file?.dat", "file1.dat"));
        assert!(glob_match("docs/*", "docs/a/b.md"));
        assert!(!glob_match("*.txt", "readme.md"));
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
    }

    #[test]
    fn ratios() {
        assert_eq!(ratio(25, 100), "  75%");
        assert_eq!(ratio(0, 0), "  0%");
        assert_eq!(ratio(120, 100), "  0%");
    }
}
