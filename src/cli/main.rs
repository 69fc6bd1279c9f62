use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use metadata_viewer::config::Config;
use metadata_viewer::pipeline::{self, ImageFileSource, MetadataReport};
use metadata_viewer::render;

#[derive(Parser, Debug)]
#[command(
    name = "metadata-viewer",
    version,
    about = "Show the IPTC and XMP metadata embedded in images"
)]
struct Cli {
    /// Image files or directories to inspect
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Only show IPTC metadata
    #[arg(long, conflicts_with = "xmp_only")]
    iptc_only: bool,

    /// Only show XMP metadata
    #[arg(long)]
    xmp_only: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let config = Config::load(cli.config.as_deref())?;

    let images = pipeline::collect_images(&cli.paths, &config.viewer.extensions);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }
    log::debug!("Found {} file(s) to inspect", images.len());

    let reports: Vec<MetadataReport> = images
        .iter()
        .map(|path| pipeline::load_metadata(&ImageFileSource, path))
        .collect();

    if cli.json {
        let json: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| -> serde_json::Result<serde_json::Value> {
                let mut entry = serde_json::json!({ "path": r.path.display().to_string() });
                if !cli.xmp_only {
                    entry["iptc"] = serde_json::to_value(&r.iptc)?;
                }
                if !cli.iptc_only {
                    entry["xmp"] = serde_json::to_value(&r.xmp)?;
                }
                Ok(entry)
            })
            .collect::<serde_json::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    let indent = config.output.tree_indent;
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("== {}", report.path.display());

        if !cli.xmp_only {
            println!("-- IPTC");
            for line in render::iptc_lines(&report.iptc, indent) {
                println!("{line}");
            }
        }

        if !cli.iptc_only {
            println!("-- XMP");
            let lines = render::tree_lines(&report.xmp, indent);
            if lines.is_empty() {
                println!("(no XMP packet)");
            }
            for line in lines {
                println!("{line}");
            }
        }
    }

    Ok(())
}
