//! tsv2jsonld - Command-line entry point
//!
//! Two commands:
//! - `exec-flow`: download every TSV in a URL list and convert each one
//! - `convert`: convert a single TSV file with explicit input/output paths

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tsv2jsonld::progress::{LogProgress, NoopProgress, ProgressObserver};
use tsv2jsonld::{convert, fetch, taxonomy, SchemaConfig};

#[derive(Parser, Debug)]
#[command(name = "tsv2jsonld")]
#[command(about = "Convert tab-separated interaction tables to JSON-LD")]
#[command(version)]
struct Cli {
    /// Directory holding per-taxonomy column mapping files
    #[arg(long, default_value = "column_mapper", global = true)]
    mapping_dir: PathBuf,

    /// JSON-LD context document
    #[arg(long, default_value = "context.jsonld", global = true)]
    context_file: PathBuf,

    /// Taxonomy table (name -> id)
    #[arg(long, default_value = "taxonomy.json", global = true)]
    taxonomy_file: PathBuf,

    /// Optional schema configuration overriding the built-in defaults
    #[arg(long, global = true)]
    schema_file: Option<PathBuf>,

    /// Worker pool size (defaults to available parallelism)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download TSV files from a URL list and convert each one
    ExecFlow {
        /// File with one source URL per line
        #[arg(long, default_value = "urls.txt")]
        input_urls_file: PathBuf,

        /// Output directory for downloaded and converted files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        /// Suppress the progress output
        #[arg(long)]
        hide_progress: bool,

        /// Also produce batch-mode .jsonld files
        #[arg(long)]
        jsonld_output: bool,

        /// Reuse files already on disk instead of downloading
        #[arg(long)]
        skip_download: bool,
    },

    /// Convert a single TSV file
    Convert {
        /// Input TSV file
        input: PathBuf,

        /// Output JSONL file
        output: PathBuf,

        /// Taxonomy name; matched against the input filename when omitted
        #[arg(long, default_value = "")]
        taxonomy: String,

        /// Suppress the progress output
        #[arg(long)]
        hide_progress: bool,

        /// Also produce batch-mode .jsonld files
        #[arg(long)]
        jsonld_output: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tsv2jsonld=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let schema = match &cli.schema_file {
        Some(path) => SchemaConfig::from_file(path)
            .with_context(|| format!("load schema config {}", path.display()))?,
        None => SchemaConfig::default(),
    };

    match &cli.command {
        Command::ExecFlow {
            input_urls_file,
            output_dir,
            hide_progress,
            jsonld_output,
            skip_download,
        } => {
            info!("start flow execution");

            let urls = std::fs::read_to_string(input_urls_file)
                .with_context(|| format!("read URL list {}", input_urls_file.display()))?;
            let urls: Vec<&str> = urls.split_whitespace().collect();
            info!(targets = urls.len(), "URL list loaded");

            for url in urls {
                let tsv_path = fetch::download_and_extract(url, output_dir, *skip_download)?;
                let output_path = jsonl_sibling(output_dir, &tsv_path);
                run_convert(
                    &cli,
                    &schema,
                    &tsv_path,
                    &output_path,
                    "",
                    *hide_progress,
                    *jsonld_output,
                )?;
            }

            info!("flow execution completed");
        }

        Command::Convert {
            input,
            output,
            taxonomy,
            hide_progress,
            jsonld_output,
        } => {
            run_convert(
                &cli,
                &schema,
                input,
                output,
                taxonomy,
                *hide_progress,
                *jsonld_output,
            )?;
        }
    }

    Ok(())
}

fn run_convert(
    cli: &Cli,
    schema: &SchemaConfig,
    input: &Path,
    output: &Path,
    taxonomy_name: &str,
    hide_progress: bool,
    jsonld_output: bool,
) -> Result<()> {
    let table = taxonomy::load_table(&cli.taxonomy_file)
        .with_context(|| format!("load taxonomy table {}", cli.taxonomy_file.display()))?;
    let (tax_name, tax_id) = taxonomy::resolve(&table, taxonomy_name, input)?;

    let mapping_path = cli.mapping_dir.join(format!("{tax_name}.json"));
    let column_mapping = convert::load_column_mapping(&mapping_path)
        .with_context(|| format!("load column mapping {}", mapping_path.display()))?;

    let (raw_context, context) = convert::load_context(&cli.context_file)
        .with_context(|| format!("load context {}", cli.context_file.display()))?;

    let noop = NoopProgress;
    let log = LogProgress::default();
    let observer: &dyn ProgressObserver = if hide_progress { &noop } else { &log };

    let opts = convert::ConvertOptions {
        schema,
        column_mapping: &column_mapping,
        raw_context: &raw_context,
        context: &context,
        tax_id: &tax_id,
        observer,
        threads: cli.threads,
        batch_output: jsonld_output,
    };

    let summary = convert::convert_file(input, output, &opts)
        .with_context(|| format!("convert {}", input.display()))?;

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        total = summary.total,
        "done"
    );
    Ok(())
}

/// Output path for a downloaded TSV: same stem, `.jsonl` extension, in the
/// output directory.
fn jsonl_sibling(output_dir: &Path, tsv_path: &Path) -> PathBuf {
    let stem = tsv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{stem}.jsonl"))
}
