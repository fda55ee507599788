use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fieldmap::{geodesy, replay, units, Config, FieldMap, LngLat};

/// Field data collection engine
#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    #[arg(short, long, action, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a scripted session and write its exports
    Replay {
        /// JSON list of steps
        script: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Directory/folder of JPEGs to import into the session
        #[arg(long)]
        photos: Option<PathBuf>,
        /// TOML settings file
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, action)]
        no_geometry: bool,
        #[arg(long, action)]
        no_attributes: bool,
        /// Write a single CSV for every geometry instead of one per family
        #[arg(long, action)]
        combined: bool,
    },
    /// Great-circle distance between two locations
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Replay {
            script,
            out_dir,
            photos,
            config,
            no_geometry,
            no_attributes,
            combined,
        } => {
            let config = match config {
                Some(path) => Config::load(&path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => Config::default(),
            };
            let mut app = FieldMap::new(config)
                .with_geolocation(Box::new(replay::ScriptedGeolocation::default()));

            let text = fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps = replay::parse_script(&text)
                .with_context(|| format!("parsing script {}", script.display()))?;
            let events = replay::run_script(&mut app, &steps);
            info!(steps = steps.len(), events = events.len(), "script replayed");

            if let Some(dir) = photos {
                import_photos(&mut app, &dir)?;
            }

            let mut options = app.default_export_options();
            options.include_geometry &= !no_geometry;
            options.include_attributes &= !no_attributes;

            for path in write_outputs(&app, &out_dir, &options, combined)? {
                println!("{}", path.display());
            }
        }
        Command::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let meters = geodesy::distance_meters(LngLat::new(lon1, lat1), LngLat::new(lon2, lat2));
            println!("{}", units::format_distance(meters).label());
        }
    }
    Ok(())
}

fn import_photos(app: &mut FieldMap, dir: &Path) -> Result<()> {
    let paths = fieldmap::visit_paths(dir)
        .with_context(|| format!("scanning photos in {}", dir.display()))?;
    for path in paths {
        match fs::read(&path) {
            Ok(jpeg) => {
                let photo = app.import_photo(&jpeg, None);
                info!(id = %photo.id, path = %path.display(), "photo imported");
            }
            Err(err) => warn!(%err, path = %path.display(), "skipping photo"),
        }
    }
    Ok(())
}

fn write_outputs(
    app: &FieldMap,
    out_dir: &Path,
    options: &fieldmap::ExportOptions,
    combined: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let mut written = Vec::new();

    let csv_files: Vec<fieldmap::CsvFile> = if combined {
        app.export_all_csv(options).into_iter().collect()
    } else {
        app.export_csv(options)
    };
    for file in csv_files {
        let path = out_dir.join(&file.file_name);
        write(&path, file.contents.as_bytes())?;
        written.push(path);
    }

    let path = out_dir.join("features.geojson");
    write(&path, app.export_geojson().as_bytes())?;
    written.push(path);

    for layer in app.layers() {
        let path = out_dir.join(layer.file_name());
        write(&path, layer.to_geojson().as_bytes())?;
        written.push(path);
    }

    // Unlinked photos taken in the same second share a name.
    let mut names = HashSet::new();
    for photo in app.photos().iter() {
        let Some(jpeg) = photo.jpeg_bytes() else {
            warn!(id = %photo.id, "photo data is not base64 JPEG");
            continue;
        };
        let mut name = photo.file_name();
        if !names.insert(name.clone()) {
            name = format!("{}.jpg", photo.id);
            names.insert(name.clone());
        }
        let path = out_dir.join(name);
        write(&path, &jpeg)?;
        written.push(path);
    }

    Ok(written)
}

fn write(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
