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

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result, bail};
use clap::Parser;
use far_horizons_common::{SpeciesId, TurnConfig, codec::ByteOrder, process_turn};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod model;

/// Run one turn of a Far Horizons game
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding galaxy.dat, stars.dat, planets.dat and the spNN.dat files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    /// Directory holding the spNN.ord order files; defaults to the data directory
    #[arg(long)]
    orders_dir: Option<PathBuf>,
    /// Where the new save files, reports and default orders go; defaults to the data directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Byte order of the save files
    #[arg(long, env = "FH_BYTE_ORDER", default_value = "little")]
    byte_order: ByteOrder,
    /// Random seed; defaults to the galaxy's turn number
    #[arg(long, env = "FH_SEED")]
    seed: Option<u64>,
    /// Only read orders and write reports for these species numbers
    #[arg(long, value_delimiter = ',')]
    species: Vec<u8>,
    /// Also write a CBOR snapshot of the new galaxy
    #[arg(long)]
    snapshot: bool,
    /// Run automatic orders for every species
    #[arg(long)]
    auto: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let orders_dir = args.orders_dir.as_deref().unwrap_or(&args.data_dir);
    let out_dir = args.out_dir.as_deref().unwrap_or(&args.data_dir);

    let galaxy = model::load_galaxy(&args.data_dir, args.byte_order)?;
    info!(turn = galaxy.turn, species = galaxy.species.len(), "galaxy loaded");

    let selected: Vec<SpeciesId> = if args.species.is_empty() {
        galaxy.species.keys().copied().collect()
    } else {
        args.species
            .iter()
            .map(|&n| match SpeciesId::new(n) {
                Some(id) if galaxy.species.contains_key(&id) => Ok(id),
                _ => bail!("there is no species {n} in this galaxy"),
            })
            .collect::<Result<Vec<_>>>()?
    };
    let texts = model::read_orders(orders_dir, &selected)?;
    info!(files = texts.len(), "orders read");

    let config = TurnConfig {
        seed: args
            .seed
            .unwrap_or_else(|| u64::try_from(galaxy.turn).unwrap_or_default()),
        byte_order: args.byte_order,
        auto_default: args.auto,
    };
    let outcome = process_turn(&galaxy, &texts, &config)
        .with_context(|| format!("while processing turn {}", galaxy.turn))?;

    model::write_galaxy(out_dir, &outcome.galaxy, args.byte_order)?;
    let reports = outcome
        .reports
        .values()
        .filter(|report| selected.contains(&report.species));
    let written = model::write_reports(out_dir, outcome.galaxy.turn, reports)?;
    if args.snapshot {
        let snapshot = model::Snapshot::new(&outcome.galaxy, &config);
        snapshot.to_path(&out_dir.join(model::SNAPSHOT_FILE))?;
    }
    info!(turn = outcome.galaxy.turn, reports = written, "turn written");
    Ok(())
}
