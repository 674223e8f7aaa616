// Copyright 2025 Justin Hu
//
// This file is part of Far Horizons.
//
// Far Horizons is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Far Horizons is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with Far Horizons. If not, see <https://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    collections::BTreeMap,
    fs::{create_dir_all, read, write},
    io::ErrorKind,
    path::Path,
};

use anyhow::{Context, Result};
use far_horizons_common::{Galaxy, GalaxyFiles, Report, SpeciesId, TurnConfig, codec::ByteOrder};
use serde::{Deserialize, Serialize};
use serde_cbor::to_vec;
use tracing::{debug, warn};

pub const GALAXY_FILE: &str = "galaxy.dat";
pub const STARS_FILE: &str = "stars.dat";
pub const PLANETS_FILE: &str = "planets.dat";
pub const SNAPSHOT_FILE: &str = "galaxy.cbor";

/// The post-turn galaxy plus what it took to get there
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub seed: u64,
    pub byte_order: ByteOrder,
    pub galaxy: Galaxy,
}
impl Snapshot {
    pub fn new(galaxy: &Galaxy, config: &TurnConfig) -> Self {
        Self {
            seed: config.seed,
            byte_order: config.byte_order,
            galaxy: galaxy.clone(),
        }
    }

    #[cfg(test)]
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = read_file(path)?;
        let mut snapshot: Self = serde_cbor::from_slice(&file)
            .with_context(|| format!("while deserializing {}", path.to_string_lossy()))?;
        snapshot.galaxy.index_wormholes();
        Ok(snapshot)
    }

    pub fn to_path(&self, path: &Path) -> Result<()> {
        let bytes = to_vec(self)
            .with_context(|| format!("while serializing {}", path.to_string_lossy()))?;
        write_file(path, &bytes)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    read(path).with_context(|| format!("while reading {}", path.to_string_lossy()))
}

/// `None` if the file doesn't exist
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("while reading {}", path.to_string_lossy())),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .with_context(|| format!("while creating {}", parent.to_string_lossy()))?;
    }
    write(path, bytes).with_context(|| format!("while writing {}", path.to_string_lossy()))
}

/// Every species number that could have a save file
fn all_species() -> impl Iterator<Item = SpeciesId> {
    (1..=Galaxy::MAX_SPECIES).filter_map(SpeciesId::new)
}

fn species_file(id: SpeciesId, extension: &str) -> String {
    format!("sp{:02}.{extension}", id.get())
}

/// Load a galaxy from its save files
pub fn load_galaxy(dir: &Path, order: ByteOrder) -> Result<Galaxy> {
    let mut files = GalaxyFiles {
        galaxy: read_file(&dir.join(GALAXY_FILE))?,
        stars: read_file(&dir.join(STARS_FILE))?,
        planets: read_file(&dir.join(PLANETS_FILE))?,
        species: BTreeMap::new(),
    };
    for id in all_species() {
        if let Some(bytes) = read_optional(&dir.join(id.file_name()))? {
            files.species.insert(id, bytes);
        }
    }
    debug!(species = files.species.len(), "save files read");
    Galaxy::decode(&files, order)
        .with_context(|| format!("while decoding the galaxy in {}", dir.to_string_lossy()))
}

/// Write a galaxy's save files
pub fn write_galaxy(dir: &Path, galaxy: &Galaxy, order: ByteOrder) -> Result<()> {
    let files = galaxy.encode(order);
    write_file(&dir.join(GALAXY_FILE), &files.galaxy)?;
    write_file(&dir.join(STARS_FILE), &files.stars)?;
    write_file(&dir.join(PLANETS_FILE), &files.planets)?;
    for (id, bytes) in &files.species {
        write_file(&dir.join(id.file_name()), bytes)?;
    }
    Ok(())
}

/// Read the `spNN.ord` files of some species; a species without one has no orders
pub fn read_orders(dir: &Path, species: &[SpeciesId]) -> Result<BTreeMap<SpeciesId, Vec<u8>>> {
    let mut texts = BTreeMap::new();
    for &id in species {
        match read_optional(&dir.join(species_file(id, "ord")))? {
            Some(text) => {
                texts.insert(id, text);
            }
            None => warn!(species = %id, "no orders"),
        }
    }
    Ok(texts)
}

/// Write each report as `spNN.rpt.tT` and its default orders as `spNN.ord.tT`;
/// returns how many reports were written
pub fn write_reports<'a>(
    dir: &Path,
    turn: i32,
    reports: impl IntoIterator<Item = &'a Report>,
) -> Result<usize> {
    let mut written = 0;
    for report in reports {
        let report_file = format!("{}.t{turn}", species_file(report.species, "rpt"));
        write_file(&dir.join(report_file), report.text.as_bytes())?;
        let orders_file = format!("{}.t{turn}", species_file(report.species, "ord"));
        write_file(&dir.join(orders_file), report.orders.as_bytes())?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::{env::temp_dir, fs::remove_dir_all, path::PathBuf};

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = temp_dir().join(format!("far-horizons-{}-{name}", std::process::id()));
        let _ = remove_dir_all(&dir);
        dir
    }

    fn empty_galaxy() -> Galaxy {
        Galaxy::new(3, 20, 4, Vec::new(), Vec::new(), BTreeMap::new())
    }

    #[test]
    fn save_files_round_trip() {
        let dir = scratch("save");
        let galaxy = empty_galaxy();
        write_galaxy(&dir, &galaxy, ByteOrder::Big).expect("written");
        assert_eq!(load_galaxy(&dir, ByteOrder::Big).expect("loaded"), galaxy);
        let _ = remove_dir_all(&dir);
    }

    #[test]
    fn missing_galaxy_names_the_file() {
        let dir = scratch("missing");
        let error = load_galaxy(&dir, ByteOrder::Little).expect_err("nothing there");
        assert!(format!("{error:#}").contains(GALAXY_FILE));
    }

    #[test]
    fn orders_and_reports() {
        let dir = scratch("orders");
        let one = SpeciesId::new(1).expect("valid");
        let two = SpeciesId::new(2).expect("valid");
        write_file(&dir.join("sp01.ord"), b"START JUMPS\nEND\n").expect("written");

        let texts = read_orders(&dir, &[one, two]).expect("read");
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[&one], b"START JUMPS\nEND\n");

        let report = Report {
            species: two,
            text: "Turn 4 report".to_string(),
            orders: "START JUMPS\nEND\n".to_string(),
        };
        assert_eq!(write_reports(&dir, 4, [&report]).expect("written"), 1);
        assert_eq!(read_file(&dir.join("sp02.rpt.t4")).expect("read"), b"Turn 4 report");
        assert_eq!(
            read_file(&dir.join("sp02.ord.t4")).expect("read"),
            b"START JUMPS\nEND\n"
        );
        let _ = remove_dir_all(&dir);
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = scratch("snapshot");
        let snapshot = Snapshot::new(&empty_galaxy(), &TurnConfig::default());
        let path = dir.join(SNAPSHOT_FILE);
        snapshot.to_path(&path).expect("written");
        assert_eq!(Snapshot::from_path(&path).expect("read"), snapshot);
        let _ = remove_dir_all(&dir);
    }
}
