use clap::{Parser, Subcommand};
use exifbatch::config::{self, SessionSettings};
use exifbatch::{ExifTool, Launcher};
use std::collections::HashMap;
use std::path::PathBuf;

/// Read and write image metadata through a persistent ExifTool worker
#[derive(Parser)]
#[command(name = "exifbatch")]
#[command(version)]
#[command(about = "Read and write image metadata through a persistent ExifTool worker")]
struct Cli {
    /// Settings file (default: $XDG_CONFIG_HOME/exifbatch/exifbatch.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ExifTool executable, overriding the settings file
    #[arg(long, global = true)]
    exiftool: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ExifTool version
    Version,
    /// Print all tags of a file
    Read {
        path: PathBuf,

        /// Print tags as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Write TAG=VALUE assignments to a file
    Write {
        path: PathBuf,

        #[arg(required = true, value_parser = parse_assignment)]
        tags: Vec<(String, String)>,
    },
    /// Delete *_original backup files below each path
    DeleteOriginals {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the totals as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Send raw arguments to the worker and print its output
    Exec {
        /// Print parsed tags and status counters as JSON instead of raw output
        #[arg(long)]
        json: bool,

        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected TAG=VALUE, got {:?}", s)),
    }
}

fn load_settings(cli: &Cli) -> CliResult<SessionSettings> {
    let settings = match &cli.config {
        Some(path) => config::load_settings_file(path)?,
        None => match config::load_user_config() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                log::warn!("Ignoring user config: {}", e);
                SessionSettings::default()
            }
        },
    };
    Ok(match &cli.exiftool {
        Some(executable) => settings.with_executable(executable),
        None => settings,
    })
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    // Workers are shut down when `run` returns, before the process exits.
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let settings = load_settings(&cli)?;

    match cli.command {
        Commands::Version => {
            let launcher = Launcher::validated(&settings.executable)?;
            println!("{}", launcher.version()?);
        }
        Commands::DeleteOriginals { paths, json } => {
            let launcher = Launcher::validated(&settings.executable)?;
            let result = exifbatch::bulk_delete::delete_originals(&launcher, Some(&paths[..]))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{} directories scanned", result.directories_scanned);
                println!("{} image files found", result.image_files_found);
                println!("{} original files deleted", result.original_files_deleted);
            }
        }
        Commands::Read { path, json } => {
            let mut exiftool = ExifTool::new(settings)?;
            let tags = exiftool.read_metadata(&path)?;
            exiftool.shutdown();

            let mut sorted: Vec<_> = tags.into_iter().collect();
            sorted.sort();
            if json {
                let object: serde_json::Map<String, serde_json::Value> = sorted
                    .into_iter()
                    .map(|(name, value)| (name, serde_json::Value::String(value)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&object)?);
            } else {
                for (name, value) in sorted {
                    println!("{}: {}", name, value);
                }
            }
        }
        Commands::Write { path, tags } => {
            let tags: HashMap<String, String> = tags.into_iter().collect();
            let mut exiftool = ExifTool::new(settings)?;
            let written = exiftool.write_metadata(&path, &tags)?;
            exiftool.shutdown();

            if !written {
                return Err(format!("ExifTool did not update {}", path.display()).into());
            }
        }
        Commands::Exec { json: true, args } => {
            let mut exiftool = ExifTool::new(settings)?;
            let result = exiftool.execute_parsed(&args)?;
            exiftool.shutdown();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Exec { json: false, args } => {
            let mut exiftool = ExifTool::new(settings)?;
            let output = exiftool.execute(&args)?;
            exiftool.shutdown();
            if !output.is_empty() {
                println!("{}", output);
            }
        }
    }
    Ok(())
}
