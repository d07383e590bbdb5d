use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tile_world::ascii;
use tile_world::assets::{detail_tile_set, primary_tile_set, AssetSource};
use tile_world::config::WorldConfig;
use tile_world::export;
use tile_world::maker::WorldMaker;
use tile_world::Result;

#[derive(Parser, Debug)]
#[command(name = "tile_world")]
#[command(about = "Generate tiled terrain worlds with lakes, rivers and decorations")]
struct Args {
    /// JSON world configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width of the world in tiles
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the world in tiles
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Directory holding the tile sheets (blank placeholder tiles if not specified)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Write the rendered world to an image file (e.g., "world.png")
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the ASCII preview
    #[arg(long)]
    no_preview: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tile_world=info")))
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let source = match args.assets {
        Some(dir) => AssetSource::Directory(dir),
        None => AssetSource::Blank,
    };
    let primary = primary_tile_set(&source)?;
    let detail = detail_tile_set(&source)?;

    let maker = WorldMaker::new(config, primary.index(), detail.index())?;
    println!("Generating world with seed: {}", maker.seeds().master);
    println!("Map size: {}x{}", maker.config().width, maker.config().height);

    let grid = maker.build()?;

    println!("Terrain:");
    let total = (grid.width() * grid.height()) as f64;
    for (id, count) in ascii::terrain_histogram(&grid.base, primary.index()) {
        println!("  {:<20} {:>8} ({:.1}%)", id.name(), count, 100.0 * count as f64 / total);
    }

    if !args.no_preview {
        println!();
        ascii::print_ascii_map(&grid, primary.index());
        println!();
        println!("Zone averages:");
        print!("{}", ascii::render_average(&grid, primary.index()));
        println!();
        print!("{}", ascii::terrain_legend());
    }

    if let Some(path) = args.output {
        export::export_world(&grid, &primary, &detail, &path)?;
        println!("Saved world image to {}", path.display());
    }

    Ok(())
}
