//! Command interpreter for the blockdump REPL.
//!
//! A [`Session`] owns one [`BlockIter`] for the loaded block and keeps it
//! positioned between commands, so `NEXT`/`PREV` continue from wherever the
//! last `SEEK`, `FIRST` or `LAST` left off.

use std::io::{self, Write};

use sstable::{Block, BlockIter, Comparator, FilterBlockReader};

/// What the REPL loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

pub struct Session<'a> {
    block: &'a Block<'a>,
    iter: BlockIter<'a>,
    filter: Option<FilterBlockReader<'a>>,
    hex: bool,
}

impl<'a> Session<'a> {
    pub fn new(
        block: &'a Block<'a>,
        cmp: &'a dyn Comparator,
        filter: Option<FilterBlockReader<'a>>,
        hex: bool,
    ) -> Self {
        Self {
            block,
            iter: block.iter(cmp),
            filter,
            hex,
        }
    }

    /// Runs one command line, writing its output to `out`.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Outcome> {
        let mut parts = line.split_whitespace();
        let cmd = match parts.next() {
            Some(cmd) => cmd,
            None => return Ok(Outcome::Continue),
        };

        match cmd.to_uppercase().as_str() {
            "FIRST" => {
                self.iter.seek_to_first();
                self.print_current(out)?;
            }
            "LAST" => {
                self.iter.seek_to_last();
                self.print_current(out)?;
            }
            "NEXT" => {
                if self.iter.valid() {
                    self.iter.next();
                }
                self.print_current(out)?;
            }
            "PREV" => {
                if self.iter.valid() {
                    self.iter.prev();
                }
                self.print_current(out)?;
            }
            "SEEK" => match parts.next().map(|arg| self.parse_key(arg)) {
                Some(Ok(target)) => {
                    self.iter.seek(&target);
                    self.print_current(out)?;
                }
                Some(Err(e)) => writeln!(out, "ERR bad hex key: {}", e)?,
                None => writeln!(out, "ERR usage: SEEK key")?,
            },
            "SCAN" => {
                let limit = match parts.next().map(str::parse::<usize>) {
                    None => usize::MAX,
                    Some(Ok(n)) => n,
                    Some(Err(_)) => {
                        writeln!(out, "ERR usage: SCAN [n]")?;
                        return Ok(Outcome::Continue);
                    }
                };
                self.scan(limit, out)?;
            }
            "MAYMATCH" => {
                let offset = parts.next().and_then(|o| o.parse::<u64>().ok());
                match (offset, parts.next().map(|arg| self.parse_key(arg))) {
                    (Some(_), Some(Err(e))) => writeln!(out, "ERR bad hex key: {}", e)?,
                    (Some(offset), Some(Ok(key))) => match &self.filter {
                        Some(filter) => {
                            if filter.key_may_match(offset, &key) {
                                writeln!(out, "may match")?;
                            } else {
                                writeln!(out, "absent")?;
                            }
                        }
                        None => writeln!(out, "(no filter)")?,
                    },
                    _ => writeln!(out, "ERR usage: MAYMATCH offset key")?,
                }
            }
            "STATS" => {
                writeln!(out, "{:?}", self.block)?;
                writeln!(out, "{:?}", self.iter)?;
                match &self.filter {
                    Some(filter) => writeln!(out, "{:?}", filter)?,
                    None => writeln!(out, "(no filter)")?,
                }
            }
            "EXIT" | "QUIT" => {
                writeln!(out, "bye")?;
                return Ok(Outcome::Exit);
            }
            other => {
                writeln!(out, "unknown command: {}", other)?;
            }
        }

        Ok(Outcome::Continue)
    }

    /// Prints up to `limit` entries from the current position (or the first
    /// entry if the iterator is not positioned).
    fn scan<W: Write>(&mut self, limit: usize, out: &mut W) -> io::Result<()> {
        if !self.iter.valid() {
            self.iter.seek_to_first();
        }

        let hex = self.hex;
        let mut count = 0;
        for (key, value) in self.iter.entries().take(limit) {
            writeln!(out, "{} -> {}", render(&key, hex), render(value, hex))?;
            count += 1;
        }

        if count == 0 {
            writeln!(out, "(empty)")?;
        } else {
            writeln!(out, "({} entries)", count)?;
        }
        if let Err(e) = self.iter.status() {
            writeln!(out, "ERR {}", e)?;
        }
        Ok(())
    }

    /// Key arguments are hex when the session prints hex, raw text otherwise.
    fn parse_key(&self, arg: &str) -> Result<Vec<u8>, hex::FromHexError> {
        if self.hex {
            hex::decode(arg)
        } else {
            Ok(arg.as_bytes().to_vec())
        }
    }

    fn print_current<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.iter.valid() {
            return writeln!(
                out,
                "{} -> {}",
                render(self.iter.key(), self.hex),
                render(self.iter.value(), self.hex)
            );
        }
        match self.iter.status() {
            Ok(()) => writeln!(out, "(invalid)"),
            Err(e) => writeln!(out, "ERR {}", e),
        }
    }
}

fn render(bytes: &[u8], hex: bool) -> String {
    if hex {
        hex::encode(bytes)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}
