//! s2arc - command-line tool for ADK/DNG game archives
//!
//! Decrypts and encrypts archive files, singly or over whole directory
//! trees, with the renaming discipline the games expect: decrypting
//! `stem.cmp.ext` writes `stem.<adk|dng>.ext`, encrypting that writes
//! `stem.cmp.ext` back.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use s2codec::{
    cleartext_name, compressed_name, decode_auto, encode, split_game_tag, tagged_name,
    ArchiveError, ArchiveHeader, Result as CodecResult, HEADER_LEN,
};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "s2arc")]
#[command(about = "Decrypt and encrypt ADK/DNG game archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt archives (files or directories, recursively)
    Decrypt {
        /// Files or directories to process
        paths: Vec<PathBuf>,
    },

    /// Encrypt unpacked files carrying an .adk/.dng tag
    Encrypt {
        /// Files or directories to process
        paths: Vec<PathBuf>,
    },

    /// Decrypt recognized archives, encrypt tagged cleartext files
    Auto {
        /// Files or directories to process
        paths: Vec<PathBuf>,
    },

    /// Round-trip archives in memory and report size changes
    Test {
        /// Files or directories to process
        paths: Vec<PathBuf>,
    },

    /// Show the header of an archive
    Info {
        /// Archive to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decrypt { paths } => run_batch(&paths, Mode::Decrypt, cli.verbose, cli.quiet),
        Commands::Encrypt { paths } => run_batch(&paths, Mode::Encrypt, cli.verbose, cli.quiet),
        Commands::Auto { paths } => run_batch(&paths, Mode::Auto, cli.verbose, cli.quiet),
        Commands::Test { paths } => run_batch(&paths, Mode::Test, cli.verbose, cli.quiet),
        Commands::Info { input } => show_info(&input).map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Decrypt,
    Encrypt,
    Auto,
    Test,
}

/// Per-run statistics, reported at the end of a batch.
#[derive(Default)]
struct Totals {
    processed: usize,
    skipped: usize,
    failed: usize,
    saved: i64,
}

fn run_batch(
    paths: &[PathBuf],
    mode: Mode,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = collect_files(paths)?;
    let bar = if quiet || files.len() < 2 {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} {msg}",
        )?);
        bar
    };

    let mut totals = Totals::default();
    for path in &files {
        bar.set_message(path.display().to_string());
        match process_file(path, mode, verbose) {
            Ok(Outcome::Done { saved }) => {
                totals.processed += 1;
                totals.saved += saved;
            }
            Ok(Outcome::Skipped) => totals.skipped += 1,
            Err(e) => {
                totals.failed += 1;
                bar.suspend(|| eprintln!("{}: {e}", path.display()));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if !quiet {
        println!(
            "{} processed, {} skipped, {} failed",
            totals.processed, totals.skipped, totals.failed
        );
        if mode == Mode::Test && totals.saved != 0 {
            if totals.saved > 0 {
                println!("re-encoding saved {} bytes", totals.saved);
            } else {
                println!("re-encoding lost {} bytes", -totals.saved);
            }
        }
    }

    if totals.failed > 0 {
        return Err(format!("{} file(s) failed", totals.failed).into());
    }
    Ok(())
}

enum Outcome {
    Done { saved: i64 },
    Skipped,
}

fn process_file(path: &Path, mode: Mode, verbose: bool) -> CodecResult<Outcome> {
    let bytes = fs::read(path)?;
    let is_archive = bytes.len() >= HEADER_LEN && ArchiveHeader::parse(&bytes).is_ok();

    match mode {
        Mode::Decrypt => {
            if !is_archive {
                return Ok(Outcome::Skipped);
            }
            decrypt_file(path, &bytes, verbose)?;
            Ok(Outcome::Done { saved: 0 })
        }
        Mode::Encrypt => {
            if is_archive {
                return Ok(Outcome::Skipped);
            }
            encrypt_file(path, &bytes, verbose)?;
            Ok(Outcome::Done { saved: 0 })
        }
        Mode::Auto => {
            if is_archive {
                decrypt_file(path, &bytes, verbose)?;
                Ok(Outcome::Done { saved: 0 })
            } else if file_name(path)
                .map(|name| split_game_tag(&name).is_ok())
                .unwrap_or(false)
            {
                encrypt_file(path, &bytes, verbose)?;
                Ok(Outcome::Done { saved: 0 })
            } else {
                Ok(Outcome::Skipped)
            }
        }
        Mode::Test => {
            if !is_archive {
                return Ok(Outcome::Skipped);
            }
            test_file(path, &bytes)
        }
    }
}

fn decrypt_file(path: &Path, bytes: &[u8], verbose: bool) -> CodecResult<()> {
    let name = file_name(path)?;
    let base = cleartext_name(&name);
    let header = ArchiveHeader::parse(bytes)?;

    let decoded = decode_auto(bytes, &base)?;
    if !decoded.crc_ok() {
        eprintln!(
            "{}: payload CRC mismatch (header {:08X}, data {:08X}), writing anyway",
            path.display(),
            decoded.stored_crc,
            decoded.computed_crc
        );
    }

    let out_path = path.with_file_name(tagged_name(&base, header.game));
    fs::write(&out_path, &decoded.data)?;
    if verbose {
        println!(
            "{} -> {} ({} bytes)",
            path.display(),
            out_path.display(),
            decoded.data.len()
        );
    }
    Ok(())
}

fn encrypt_file(path: &Path, bytes: &[u8], verbose: bool) -> CodecResult<()> {
    let name = file_name(path)?;
    let (game, base) = split_game_tag(&name)?;

    let archive = encode(bytes, &base, game);
    let out_path = path.with_file_name(compressed_name(&base));
    fs::write(&out_path, &archive)?;
    if verbose {
        println!(
            "{} -> {} ({} -> {} bytes)",
            path.display(),
            out_path.display(),
            bytes.len(),
            archive.len()
        );
    }
    Ok(())
}

/// Decrypt, re-encrypt and decrypt again without touching the filesystem;
/// report how the re-encoded size compares to the on-disk archive.
fn test_file(path: &Path, bytes: &[u8]) -> CodecResult<Outcome> {
    let name = file_name(path)?;
    let base = cleartext_name(&name);
    let header = ArchiveHeader::parse(bytes)?;

    let decoded = decode_auto(bytes, &base)?.verified()?;
    let rebuilt = encode(&decoded, &base, header.game);
    let again = decode_auto(&rebuilt, &base)?.verified()?;
    if again != decoded {
        return Err(std::io::Error::other(
            "re-encoded archive does not decrypt to the same payload",
        )
        .into());
    }

    Ok(Outcome::Done {
        saved: bytes.len() as i64 - rebuilt.len() as i64,
    })
}

fn show_info(path: &Path) -> CodecResult<()> {
    let bytes = fs::read(path)?;
    let header = ArchiveHeader::parse(&bytes)?;

    println!("file:        {}", path.display());
    println!("game:        {:?} ({:#010X})", header.game, header.game.type_tag());
    println!("payload CRC: {:08X}", header.payload_crc);
    println!("key CRC:     {:08X}", header.key_crc);
    println!("size:        {} bytes", header.size);
    println!("body:        {} bytes", bytes.len() - HEADER_LEN);
    Ok(())
}

fn collect_files(paths: &[PathBuf]) -> CodecResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path) {
                let entry = entry.map_err(std::io::Error::from)?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> CodecResult<String> {
    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => Err(ArchiveError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        ))),
    }
}
