//! File I/O: the TOML system description and XYZ coordinates.
//!
//! The system file carries what an ingestion stage would otherwise build in
//! memory — the topology's molecules and the parameter collections — so the
//! CLI (and tests) can run the placement engine end to end. Coordinates
//! travel separately as XYZ, Ångströms on disk, nanometers in memory.

use std::fmt;

pub mod error;
pub mod store;
pub mod xyz;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    System,
    Xyz,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::System => write!(f, "system TOML"),
            Format::Xyz => write!(f, "XYZ"),
        }
    }
}
