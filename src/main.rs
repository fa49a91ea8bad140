// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use eikonal_fmm::extrapolate::extrapolate_simple;
use eikonal_fmm::flags::{FlagGrid, OBSTACLE};
use eikonal_fmm::io;
use eikonal_fmm::reinit::Reinitializer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Fast Marching narrow band reinitialization
    Fmm,
    /// Layered extrapolation without solving the eikonal equation
    Simple,
}

#[derive(Parser)]
#[command(name = "eikonal-fmm", about = "Fast Marching level set reinitialization")]
struct Cli {
    /// Level set to reinitialize (.npy, [ny, nx] or [nz, ny, nx])
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output file path (.npy)
    #[arg(short = 'o', long, default_value = "output.npy")]
    output: PathBuf,

    /// Narrow band width in cells
    #[arg(short = 'w', long, default_value = "3.0")]
    band_width: f64,

    /// Cell classification flags (.npy, i32); every cell is empty if omitted
    #[arg(long)]
    flags: Option<PathBuf>,

    /// Vector field to carry along (.npy with a trailing axis of length 3)
    #[arg(long, requires = "velocity_output")]
    velocity: Option<PathBuf>,

    /// Output path for the carried vector field (.npy)
    #[arg(long, requires = "velocity")]
    velocity_output: Option<PathBuf>,

    /// Leave cells matching --obstacle-mask untouched
    #[arg(long)]
    ignore_obstacles: bool,

    /// Keep input values of outside cells at the interface
    #[arg(long)]
    preserve_interface: bool,

    /// Flag bits treated as obstacles
    #[arg(long, default_value_t = OBSTACLE)]
    obstacle_mask: i32,

    /// Reinitialization method
    #[arg(long, value_enum, default_value_t = Method::Fmm)]
    method: Method,

    /// Number of Rayon worker threads
    #[arg(long)]
    threads: Option<usize>,

    /// Log every sweep
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "eikonal_fmm=debug" } else { "eikonal_fmm=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the thread pool")?;
    }

    let mut phi = io::load_field(&cli.input)
        .with_context(|| format!("failed to load level set {}", cli.input.display()))?;
    let [nx, ny, nz] = phi.size();
    info!(nx, ny, nz, is_3d = phi.is_3d(), "loaded level set");

    let flags = match &cli.flags {
        Some(path) => io::load_npy_flags(path)
            .with_context(|| format!("failed to load flags {}", path.display()))?,
        None => FlagGrid::new(phi.size(), phi.is_3d())?,
    };
    let mut vel = match &cli.velocity {
        Some(path) => Some(
            io::load_npy_vector_field(path)
                .with_context(|| format!("failed to load vector field {}", path.display()))?,
        ),
        None => None,
    };

    match cli.method {
        Method::Fmm => {
            let report = Reinitializer::new(cli.band_width)?
                .with_ignore_obstacles(cli.ignore_obstacles)
                .with_preserve_interface(cli.preserve_interface)
                .with_obstacle_mask(cli.obstacle_mask)
                .run(&mut phi, &flags, vel.as_mut())?;
            info!(
                unreached_inside = report.unreached_inside,
                unreached_outside = report.unreached_outside,
                "reinitialization finished"
            );
        }
        Method::Simple => {
            let written = extrapolate_simple(&mut phi, &flags, cli.band_width, vel.as_mut())?;
            info!(written, "simple extrapolation finished");
        }
    }

    io::save_field(&phi, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    if let (Some(v), Some(path)) = (&vel, &cli.velocity_output) {
        io::save_npy_vector_field(v, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
