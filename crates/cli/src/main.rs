//! # blockdump - Interactive Block Inspector
//!
//! A REPL for poking at a single SSTable data block (and optionally the
//! table's filter block). Reads commands from stdin, runs them against a
//! [`BlockIter`](sstable::BlockIter), and prints results to stdout. Works
//! interactively or scripted (pipe commands via stdin).
//!
//! ## Usage
//!
//! ```text
//! blockdump <block-file> [<filter-file>]
//! ```
//!
//! ## Commands
//!
//! ```text
//! FIRST               Position at the first entry
//! LAST                Position at the last entry
//! NEXT / PREV         Step the iterator
//! SEEK key            Position at the first entry >= key
//! SCAN [n]            Print up to n entries from the current position
//! MAYMATCH offset key Ask the filter block about a data block offset
//! STATS               Print block, iterator and filter debug info
//! EXIT / QUIT         Leave
//! ```
//!
//! ## Configuration
//!
//! ```text
//! BLOCKDUMP_BLOOM_BITS  bits per key of the bloom policy (default: 10)
//! BLOCKDUMP_USE_FILTER  load the filter file if given  (default: "true")
//! BLOCKDUMP_HEX         keys and values in hex         (default: "false")
//! BLOCKDUMP_LOG         tracing filter for stderr      (default: "warn")
//! ```
//!
//! With `BLOCKDUMP_HEX` set, `SEEK` and `MAYMATCH` also take their key
//! argument as hex, so binary keys can be entered.
//!
//! ## Example
//!
//! ```text
//! $ blockdump data.blk
//! blockdump: data.blk (48 bytes, 2 restarts, filter=none)
//! > SEEK key2
//! key2 -> value2
//! > SCAN
//! key2 -> value2
//! key3 -> value3
//! (2 entries)
//! > EXIT
//! bye
//! ```

mod session;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bloom::BloomFilterPolicy;
use config::Config;
use sstable::{Block, BlockContents, BytewiseComparator, FilterBlockReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::session::{Outcome, Session};

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config);
    debug!(?config, "configuration loaded");

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let block_path = match args.next() {
        Some(path) => path,
        None => bail!("usage: blockdump <block-file> [<filter-file>]"),
    };
    let filter_path = args.next();
    if args.next().is_some() {
        bail!("usage: blockdump <block-file> [<filter-file>]");
    }

    let raw = std::fs::read(&block_path)
        .with_context(|| format!("reading block file {}", block_path.display()))?;
    let block = Block::new(BlockContents::owned(raw));

    let filter_raw = match &filter_path {
        Some(path) if config.use_filter => Some(
            std::fs::read(path)
                .with_context(|| format!("reading filter file {}", path.display()))?,
        ),
        Some(path) => {
            info!(path = %path.display(), "filter file ignored, filters disabled");
            None
        }
        None => None,
    };

    let cmp = BytewiseComparator;
    let policy = BloomFilterPolicy::new(config.bloom_bits_per_key);
    let filter = filter_raw
        .as_deref()
        .map(|contents| FilterBlockReader::new(&policy, contents));

    println!(
        "blockdump: {} ({} bytes, {} restarts, filter={})",
        block_path.display(),
        block.size(),
        block.num_restarts(),
        match &filter {
            Some(f) => format!("{} filters", f.num_filters()),
            None => "none".to_string(),
        }
    );
    println!("Commands: FIRST | LAST | NEXT | PREV | SEEK key | SCAN [n]");
    println!("          MAYMATCH offset key | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let mut session = Session::new(&block, &cmp, filter, config.hex_output);
    let stdin = io::stdin();
    let stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut out = stdout.lock();
        if session.execute(&line, &mut out)? == Outcome::Exit {
            break;
        }
        write!(out, "> ")?;
        out.flush().ok();
    }

    Ok(())
}
