//! Print JSON summaries of SW4 image files
//!
//! Usage: `sw4img-info [--kind KIND] [--config FILE] [--patch N] [--strict] <file-or-dir>...`

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sw4image::{
    list_image_files, ImageSeries, ImageSummary, QuantityKind, ReadOptions, SimulationConfig,
    StaticConfig,
};

#[derive(Parser, Debug)]
#[command(name = "sw4img-info")]
#[command(about = "Print JSON summaries of SW4/WPP image files")]
struct Args {
    /// Image files, or directories scanned for .sw4img files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Quantity kind of the images (displacement or velocity)
    #[arg(long)]
    kind: Option<QuantityKind>,

    /// JSON simulation configuration with sources and receivers
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the shared colour range of this patch across all inputs
    #[arg(long)]
    patch: Option<usize>,

    /// Fail on mode codes missing from the quantity table
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn read_options(&self) -> ReadOptions {
        let mut options = ReadOptions::new().with_strict_mode(self.strict);
        if let Some(kind) = self.kind {
            options = options.with_quantity_kind(kind);
        }
        options
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.read_options();

    let config: Option<Arc<dyn SimulationConfig>> = match &args.config {
        Some(path) => {
            let loaded = StaticConfig::load(path)
                .await
                .with_context(|| format!("reading configuration {}", path.display()))?;
            Some(Arc::new(loaded))
        }
        None => None,
    };

    let mut paths = Vec::new();
    for input in &args.inputs {
        if tokio::fs::metadata(input).await.map(|m| m.is_dir()).unwrap_or(false) {
            paths.extend(list_image_files(input).await?);
        } else {
            paths.push(input.clone());
        }
    }

    let series = ImageSeries::open(&paths, &options, config).await?;
    for image in series.iter() {
        println!("{}", ImageSummary::from(image).to_json()?);
    }

    log::info!("{}", series.stats().summary());
    if let Some(n) = args.patch {
        let range = series.value_range(n)?;
        println!("patch {} colour range: [{}, {}]", n, range.min, range.max);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "sw4img-info",
            "--kind=velocity",
            "--patch",
            "1",
            "--strict",
            "a.sw4img",
            "run",
        ])
        .unwrap();

        assert_eq!(args.kind, Some(QuantityKind::Velocity));
        assert_eq!(args.patch, Some(1));
        assert!(args.strict);
        assert!(args.config.is_none());
        assert_eq!(
            args.inputs,
            vec![PathBuf::from("a.sw4img"), PathBuf::from("run")]
        );

        let options = args.read_options();
        assert_eq!(options.quantity_kind, Some(QuantityKind::Velocity));
        assert!(options.strict_mode);
    }

    #[test]
    fn test_rejects_unknown_flags() {
        assert!(Args::try_parse_from(["sw4img-info", "--verbose", "a.sw4img"]).is_err());
        assert!(Args::try_parse_from(["sw4img-info", "--kind", "pressure", "a.sw4img"]).is_err());
        assert!(Args::try_parse_from(["sw4img-info"]).is_err());
    }
}
