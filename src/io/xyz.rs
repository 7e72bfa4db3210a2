//! XYZ coordinate reader and writer.
//!
//! Plain three-column XYZ: a count line, a comment line, then one
//! `symbol x y z` line per particle. Coordinates are Ångströms on disk
//! and nanometers in memory, converted at this boundary.

use std::io::{BufRead, Write};

use glam::DVec3;

use super::Format;
use super::error::Error;

/// Element symbols indexed by atomic number (index 0 unused). Virtual
/// sites, which have no element, are written as [`VIRTUAL_SITE_SYMBOL`].
const SYMBOLS: [&str; 119] = [
    "?", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg",
    "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

pub const VIRTUAL_SITE_SYMBOL: &str = "X";

/// Symbol for an atomic number, or `"?"` when out of range.
pub fn element_symbol(atomic_number: u8) -> &'static str {
    SYMBOLS.get(atomic_number as usize).copied().unwrap_or("?")
}

/// Reads an XYZ file, returning per-particle symbols and positions in
/// nanometers.
pub fn read<R: BufRead>(reader: R) -> Result<(Vec<String>, Vec<DVec3>), Error> {
    let mut lines = reader.lines().enumerate();

    let (_, count_line) = lines
        .next()
        .ok_or_else(|| Error::parse(Format::Xyz, 1, "empty file"))?;
    let count: usize = count_line?
        .trim()
        .parse()
        .map_err(|_| Error::parse(Format::Xyz, 1, "first line must be the particle count"))?;

    // Comment line, ignored.
    if lines.next().is_none() {
        return Err(Error::parse(Format::Xyz, 2, "missing comment line"));
    }

    let mut symbols = Vec::with_capacity(count);
    let mut positions = Vec::with_capacity(count);
    for (index, line) in lines {
        let ln = index + 1;
        let content = line?;
        if content.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::parse(
                Format::Xyz,
                ln,
                "expected 'symbol x y z' columns",
            ));
        }
        let mut coords = [0.0; 3];
        for (slot, token) in coords.iter_mut().zip(&tokens[1..4]) {
            *slot = token
                .parse::<f64>()
                .map_err(|_| Error::parse(Format::Xyz, ln, format!("invalid coordinate '{token}'")))?;
        }

        symbols.push(tokens[0].to_string());
        // Ångströms on disk, nanometers in memory.
        positions.push(DVec3::from_array(coords) * 0.1);
    }

    if positions.len() != count {
        return Err(Error::parse(
            Format::Xyz,
            1,
            format!("count line says {count} particles, found {}", positions.len()),
        ));
    }

    Ok((symbols, positions))
}

/// Writes positions (nanometers in memory) as an XYZ file in Ångströms.
pub fn write<'a, W, I>(writer: &mut W, comment: &str, particles: I) -> Result<(), Error>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, DVec3)>,
{
    let particles: Vec<(&str, DVec3)> = particles.into_iter().collect();
    writeln!(writer, "{}", particles.len())?;
    writeln!(writer, "{comment}")?;
    for (symbol, position) in particles {
        let a = position * 10.0;
        writeln!(writer, "{symbol:<4} {:>12.6} {:>12.6} {:>12.6}", a.x, a.y, a.z)?;
    }
    Ok(())
}
