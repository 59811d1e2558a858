//! CLI front-end: `offset` runs a vanity search, `add` reconstructs the
//! private key for a found offset.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use curve25519_vanity::error::Error;
use curve25519_vanity::field::FieldElement;
use curve25519_vanity::search::{self, SearchOutcome};
use curve25519_vanity::{codec, reconstruct};

#[derive(Parser)]
#[command(
    name = "curve25519-vanity",
    about = "Vanity public-key search for X25519 (Curve25519 Diffie-Hellman)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress the stderr timing/throughput summary.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Search for an offset whose vanity public key starts with PREFIX.
    Offset {
        /// 44-character base64 X25519 public key.
        public_key: String,
        /// 0-10 base64 characters to match at the start of the vanity key.
        prefix: String,
        /// Number of offsets to skip before starting the search.
        skip: u64,
        /// Maximum number of offsets to try (0 = unbounded).
        limit: u64,
    },
    /// Read a base64 private key from stdin and add OFFSET to it.
    Add {
        /// Offset previously printed by `offset`.
        offset: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(match cli.verbose {
                    0 => "warn",
                    1 => "info",
                    _ => "debug",
                })
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Offset { public_key, prefix, skip, limit } => {
            cmd_offset(&public_key, &prefix, skip, limit, cli.quiet)
        }
        Command::Add { offset } => cmd_add(offset),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}

/// Decodes a 44-character base64 key into its first 32 canonical bytes.
///
/// The lenient decoder (see `codec`) produces 33 bytes for a standard
/// padded 32-byte key, because it treats the final 18-bit tail group as
/// three output bytes instead of two — the original tool's decode call
/// writes this 33rd byte one past the end of its 32-byte stack buffer.
/// This crate has no such buffer to overrun; it reproduces the same
/// externally-visible behavior by decoding and keeping only the first 32
/// bytes, which is exactly what every downstream consumer of that buffer
/// in the original tool reads.
fn decode_key(s: &str) -> Result<[u8; 32], Error> {
    if s.len() != 44 {
        return Err(Error::InvalidBase64);
    }
    let decoded = codec::decode(s)?;
    if decoded.len() < 32 {
        return Err(Error::InvalidBase64);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&decoded[..32]);
    Ok(out)
}

fn cmd_offset(public_key: &str, prefix: &str, skip: u64, limit: u64, quiet: bool) -> Result<(), Error> {
    let public_key = decode_key(public_key)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))
            .expect("failed to install SIGINT handler");
    }

    tracing::info!(batch_size = search::DEFAULT_BATCH_SIZE, "starting search");
    let start = Instant::now();
    let outcome = search::search(
        &public_key,
        prefix,
        skip,
        limit,
        search::DEFAULT_BATCH_SIZE,
        &interrupted,
    )?;
    let elapsed = start.elapsed().as_secs_f64();

    let attempts = match outcome {
        SearchOutcome::Found { attempts } => {
            println!("{attempts}");
            attempts
        }
        SearchOutcome::LimitExhausted { attempts } => attempts,
    };

    if !quiet {
        eprintln!("seconds: {elapsed:.0}");
        if elapsed > 0.0 {
            eprintln!("attempts/s: {:.0}", attempts as f64 / elapsed);
        }
    }

    Ok(())
}

fn cmd_add(offset: u64) -> Result<(), Error> {
    let mut line = String::new();
    std::io::stdin().read_to_string(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).trim();

    let s0_bytes = decode_key(trimmed)?;
    let s0 = FieldElement::from_bytes(&s0_bytes);

    let s = reconstruct::reconstruct(&s0, offset)?;
    println!("{}", codec::encode(&s.to_bytes()));
    Ok(())
}
