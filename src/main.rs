use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use changeset_attributes::constants;
use changeset_attributes::logic::dataset::{self, DatasetWriter};
use changeset_attributes::logic::features::LayoutInfo;
use changeset_attributes::{
    AttributeAssembler, AttributeSchema, DirectoryChangesetSource, DirectoryUserDetails, ExportFormat,
    ExtractorConfig, MetricSpace, TagSampler,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract per-feature attributes from labelled changesets")]
struct Cli {
    /// CSV of `changeset_id,harmful` rows
    #[arg(long)]
    changesets: PathBuf,
    /// Directory holding `<changeset_id>.json` archives, already normalized
    /// to a GeoJSON FeatureCollection of feature versions
    #[arg(long)]
    real_changesets_dir: PathBuf,
    /// Directory holding `<username>.json` user statistics
    #[arg(long)]
    user_details_dir: PathBuf,
    /// Output file; stdout when omitted
    #[arg(long, conflicts_with = "output_dir")]
    output: Option<PathBuf>,
    /// Write a timestamped dataset file into this directory instead;
    /// without a value, into the local data directory
    #[arg(long, num_args = 0..=1)]
    output_dir: Option<Option<PathBuf>>,
    /// csv, jsonl or json
    #[arg(long, default_value = "csv", value_parser = parse_format)]
    format: ExportFormat,
    /// highway or extended (overrides CHANGESET_SCHEMA)
    #[arg(long, value_parser = parse_schema)]
    schema: Option<AttributeSchema>,
    /// geodesic or planar (overrides CHANGESET_METRIC)
    #[arg(long, value_parser = parse_metric)]
    metric: Option<MetricSpace>,
    /// Tag key a feature must carry to be sampled
    #[arg(long)]
    sample_tag: Option<String>,
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    ExportFormat::parse(value).ok_or_else(|| format!("unknown format '{}'", value))
}

fn parse_schema(value: &str) -> Result<AttributeSchema, String> {
    AttributeSchema::parse(value).ok_or_else(|| format!("unknown schema '{}'", value))
}

fn parse_metric(value: &str) -> Result<MetricSpace, String> {
    MetricSpace::parse(value).ok_or_else(|| format!("unknown metric '{}'", value))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    let mut config = ExtractorConfig::from_env();
    if let Some(schema) = cli.schema {
        config = config.with_schema(schema);
    }
    if let Some(metric) = cli.metric {
        config = config.with_metric(metric);
    }
    let layout = LayoutInfo::current(config.schema);
    log::info!(
        "Schema: {} (layout v{}, hash {:08x}, {} columns), metric: {}, blocked users: {:?}",
        config.schema.as_str(),
        layout.version,
        layout.hash,
        layout.column_count,
        config.metric.as_str(),
        config.blocked_users
    );

    let list = dataset::read_changeset_list(&cli.changesets)
        .with_context(|| format!("reading changeset list {}", cli.changesets.display()))?;

    let changesets = DirectoryChangesetSource::new(&cli.real_changesets_dir);
    let users = DirectoryUserDetails::new(&cli.user_details_dir);
    let sampler = TagSampler::new(cli.sample_tag.unwrap_or_else(constants::get_sample_tag));

    let assembler = AttributeAssembler::new(config, &changesets, &sampler, &users);
    let table = assembler.extract(&list);

    match (cli.output, cli.output_dir) {
        (Some(path), _) => {
            dataset::export_table(&table, &path, cli.format)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        (None, Some(dir)) => {
            let writer = match dir {
                Some(dir) => DatasetWriter::from_path(dir.clone())
                    .with_context(|| format!("creating dataset directory {}", dir.display()))?,
                None => DatasetWriter::new().context("creating default dataset directory")?,
            };
            let path = writer.write(&table, cli.format).context("writing dataset file")?;
            log::info!("Dataset written to {}", path.display());
        }
        (None, None) => {
            let stdout = io::stdout();
            dataset::write_table(&table, cli.format, BufWriter::new(stdout.lock()))
                .context("writing to stdout")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "changeset-attributes",
        "--changesets",
        "list.csv",
        "--real-changesets-dir",
        "archives",
        "--user-details-dir",
        "users",
    ];

    #[test]
    fn test_output_dir_value_is_optional() {
        let cli = Cli::try_parse_from(REQUIRED.iter().copied().chain(["--output-dir"])).unwrap();
        assert_eq!(cli.output_dir, Some(None));

        let cli = Cli::try_parse_from(REQUIRED.iter().copied().chain(["--output-dir", "out"])).unwrap();
        assert_eq!(cli.output_dir, Some(Some(PathBuf::from("out"))));

        let cli = Cli::try_parse_from(REQUIRED).unwrap();
        assert_eq!(cli.output_dir, None);
        assert_eq!(cli.format, ExportFormat::Csv);
    }

    #[test]
    fn test_output_conflicts_with_output_dir() {
        let args = REQUIRED.iter().copied().chain(["--output", "a.csv", "--output-dir", "out"]);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let args = REQUIRED.iter().copied().chain(["--schema", "railway"]);
        assert!(Cli::try_parse_from(args).is_err());
    }
}
