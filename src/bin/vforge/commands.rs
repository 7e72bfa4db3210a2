use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use vsite_forge::io::{store as system_io, xyz};
use vsite_forge::model::store::ParameterStore;
use vsite_forge::model::topology::Topology;
use vsite_forge::place::{
    self, GeometryResolver, VirtualSiteDescriptor, VirtualSiteWeights,
    get_positions_with_virtual_sites,
};

use crate::cli::{Command, PositionsArgs, WeightsArgs};
use crate::io::{create_output, open_input, stdin_is_tty};

pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Positions(args) => run_positions(args),
        Command::Weights(args) => run_weights(args),
    }
}

fn read_system(path: &Path) -> Result<(Topology, ParameterStore)> {
    let reader = open_input(Some(path))?;
    system_io::read(reader)
        .with_context(|| format!("Failed to read system description: {}", path.display()))
}

fn run_positions(args: PositionsArgs) -> Result<()> {
    if args.input.is_none() && stdin_is_tty() {
        bail!(
            "No coordinate file specified and stdin is a terminal.\n\nUsage: vforge positions -s <SYSTEM> -i <XYZ> or pipe coordinates via stdin."
        );
    }

    let (topology, store) = read_system(&args.system.system)?;

    let input = open_input(args.input.as_deref())?;
    let (_, positions) = xyz::read(input).context("Failed to read coordinates")?;

    let all = get_positions_with_virtual_sites(&topology, &store, Some(&positions), args.zeros)
        .context("Virtual-site placement failed")?;
    let symbols = particle_symbols(&topology, &store);

    let mut writer = create_output(args.output.as_deref())?;
    xyz::write(
        &mut writer,
        "vforge positions",
        symbols.iter().map(String::as_str).zip(all.iter().copied()),
    )
    .context("Failed to write coordinates")?;
    writer.flush()?;

    Ok(())
}

/// Per-particle symbols in output order: each molecule's atoms, then one
/// placeholder row per virtual site owned by that molecule.
fn particle_symbols(topology: &Topology, store: &ParameterStore) -> Vec<String> {
    let mut site_counts: HashMap<usize, usize> = HashMap::new();
    if let Some(sites) = store.collection(ParameterStore::VIRTUAL_SITES) {
        for key in sites.virtual_site_keys() {
            if let Some(molecule) = topology.molecule_of_virtual_site(key) {
                *site_counts.entry(molecule).or_default() += 1;
            }
        }
    }

    let mut symbols = Vec::new();
    for molecule in 0..topology.molecule_count() {
        for atom in topology.atom_indices(molecule) {
            let z = topology.atomic_number(atom).unwrap_or(0);
            symbols.push(xyz::element_symbol(z).to_string());
        }
        for _ in 0..site_counts.get(&molecule).copied().unwrap_or(0) {
            symbols.push(xyz::VIRTUAL_SITE_SYMBOL.to_string());
        }
    }
    symbols
}

fn run_weights(args: WeightsArgs) -> Result<()> {
    let (topology, store) = read_system(&args.system.system)?;

    let Some(sites) = store.collection(ParameterStore::VIRTUAL_SITES) else {
        bail!("System has no VirtualSites collection");
    };
    if sites.is_empty() {
        bail!("System declares no virtual sites");
    }

    let resolver = GeometryResolver::new(&store);
    let mut writer = create_output(None)?;

    for key in sites.virtual_site_keys() {
        let descriptor = VirtualSiteDescriptor::from_store(key, &store)?;
        let label = format!(
            "{} ({}) on atoms {:?}",
            key.name, key.kind, key.orientation_atom_indices
        );

        match place::weights(&descriptor, resolver, &topology) {
            Ok(VirtualSiteWeights::Affine(w)) => {
                let terms: Vec<String> = w
                    .iter()
                    .zip(&key.orientation_atom_indices)
                    .map(|(weight, atom)| format!("{weight:+.6}*r{atom}"))
                    .collect();
                writeln!(writer, "{label}: {}", terms.join(" "))?;
            }
            Ok(VirtualSiteWeights::LocalFrame { w12, w13, wcross }) => {
                writeln!(
                    writer,
                    "{label}: r1 {w12:+.6}*(r2-r1) {w13:+.6}*(r3-r1) {wcross:+.6}/nm*(r2-r1)x(r3-r1)"
                )?;
            }
            Err(place::Error::VirtualSiteTypeNotImplemented(_)) => {
                writeln!(writer, "{label}: position-only placement, no weight form")?;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to resolve geometry for {label}"));
            }
        }
    }
    writer.flush()?;

    Ok(())
}
