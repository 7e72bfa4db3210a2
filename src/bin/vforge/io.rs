use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Returns `true` when stdin is attached to a terminal rather than a pipe.
pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

/// Buffered reader over a file, or over stdin when no path is given.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(p) => {
            let file =
                File::open(p).with_context(|| format!("cannot open {}", p.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin().lock())),
    })
}

/// Buffered writer into a file, or into stdout when no path is given.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            let file =
                File::create(p).with_context(|| format!("cannot create {}", p.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
