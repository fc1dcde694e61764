use anyhow::{bail, Context, Result};
use clap::Parser;
use geojson::GeoJson;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use strum::IntoEnumIterator;

mod columns;
mod output;
mod pack;

use columns::{collect_columns, rename_duplicated_columns};
use output::{split_by_geometry, write_layers, GeometryKind};
use pack::pack_feature;

#[derive(Parser, Debug)]
#[command(
    name = "parks-etl",
    author,
    version,
    about = "Prepare protected-area GeoJSON for the park map's vector tiles",
    long_about = "Reads a GeoJSON FeatureCollection of protected areas with arbitrary \
                  attribute columns and writes one GeoJSON file per geometry kind \
                  (points, lines, polygons), ready for tiling.\n\n\
                  Attribute names are normalized (lowercase, ':' to '_', spaces removed) \
                  and collisions are suffixed. Every attribute except 'name' is packed \
                  into a JSON string under 'properties', which the map popup decodes."
)]
struct Args {
    /// Input GeoJSON FeatureCollection
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for points.geojson, lines.geojson and polygons.geojson
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Country recorded for features that have no country attribute
    #[arg(long)]
    country: Option<String>,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Protected Areas ETL ===");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    if !args.input.exists() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    // Phase 1: Read input
    log::info!("");
    log::info!("Phase 1: Reading features...");
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let geojson: GeoJson = text.parse().context("Failed to parse GeoJSON")?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        bail!("Expected a FeatureCollection in {}", args.input.display());
    };
    log::info!("  Read {} features", collection.features.len());

    // Phase 2: Normalize attribute names
    log::info!("");
    log::info!("Phase 2: Normalizing attribute names...");
    let renames = {
        let columns = collect_columns(&collection.features);
        log::info!("  {} distinct attributes", columns.len());
        rename_duplicated_columns(columns)
    };
    let renamed = renames.iter().filter(|(from, to)| from != to).count();
    log::info!("  {renamed} attributes renamed");

    // Phase 3: Pack attributes
    log::info!("");
    log::info!("Phase 3: Packing attributes...");
    let total = collection.features.len();
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.green} {pos}/{len} {msg}")
            .context("Invalid progress template")?,
    );
    let packed: Vec<_> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            pb.inc(1);
            pack_feature(feature, &renames, args.country.as_deref())
        })
        .collect();
    pb.finish_and_clear();
    log::info!(
        "  Packed {} features, dropped {} without geometry",
        packed.len(),
        total - packed.len()
    );

    // Phase 4: Split and write
    log::info!("");
    log::info!("Phase 4: Writing layers...");
    let split = split_by_geometry(packed);
    if split.skipped > 0 {
        log::warn!("  Skipped {} geometry collections", split.skipped);
    }
    for kind in GeometryKind::iter() {
        log::info!("  {kind}: {} features", split.layer(kind).len());
    }
    write_layers(&split, &args.output_dir).context("Failed to write output layers")?;

    log::info!("");
    log::info!("Done!");

    Ok(())
}
