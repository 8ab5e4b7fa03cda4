use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use triage_io::{ExperimentName, ResultWriter};
use triage_model::{DEFAULT_N_TREES, Evaluation, Pipeline, PipelineConfig, Priority, SplitConfig};
use triage_rf::{RandomForestConfig, SplitCriterion};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Lesion image triage: feature extraction, priority labeling, and classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Seed shared by the stratified split and the forest
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Log at debug level
    #[arg(long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log errors only
    #[arg(long, global = true)]
    quiet: bool,

    /// Worker threads for extraction and training; all cores when omitted
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Where samples come from and where artifacts go.
#[derive(Args, Debug)]
struct DataArgs {
    /// Dataset root holding benign/ and malignant/ image folders
    #[arg(long)]
    data: PathBuf,

    /// Artifact file prefix, letters, digits, '_' and '-' only
    #[arg(long)]
    experiment: String,

    /// Artifact directory, created when missing
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CriterionArg {
    Gini,
    Entropy,
}

impl From<CriterionArg> for SplitCriterion {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::Gini => SplitCriterion::Gini,
            CriterionArg::Entropy => SplitCriterion::Entropy,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Extract features, label priorities, split, train, and evaluate
    Run {
        #[command(flatten)]
        io: DataArgs,

        /// Forest size
        #[arg(long, default_value_t = DEFAULT_N_TREES)]
        n_trees: usize,

        /// Depth cap per tree; trees grow until pure when omitted
        #[arg(long)]
        max_depth: Option<usize>,

        /// Impurity measure for split search
        #[arg(long, value_enum, default_value_t = CriterionArg::Gini)]
        criterion: CriterionArg,
    },

    /// Extract features and label priorities only; writes the features CSV
    Extract {
        #[command(flatten)]
        io: DataArgs,
    },
}

#[derive(Serialize)]
struct ExtractOutput {
    experiment: String,
    data_root: PathBuf,
    n_samples: usize,
    n_low: usize,
    n_medium: usize,
    n_high: usize,
    features_csv: PathBuf,
}

#[derive(Serialize)]
struct PartitionOutput {
    n_samples: usize,
    accuracy: f64,
    macro_f1: f64,
}

#[derive(Serialize)]
struct RunOutput {
    experiment: String,
    data_root: PathBuf,
    n_samples: usize,
    n_trees: usize,
    seed: u64,
    validation: PartitionOutput,
    test: PartitionOutput,
    features_csv: PathBuf,
    evaluation_json: PathBuf,
}

fn partition_output(eval: &Evaluation) -> PartitionOutput {
    PartitionOutput {
        n_samples: eval.confusion().as_rows().iter().flatten().sum(),
        accuracy: eval.accuracy(),
        macro_f1: eval.macro_f1(),
    }
}

fn log_evaluation(eval: &Evaluation) {
    info!(
        "{} classification report:\n{}\n{}",
        eval.partition(),
        eval.report(),
        eval.confusion().labeled(&Priority::NAMES)
    );
}

fn open_writer(io: &DataArgs) -> Result<ResultWriter> {
    let experiment = ExperimentName::new(io.experiment.clone())?;
    ResultWriter::new(&io.output_dir, experiment).context("failed to prepare output directory")
}

fn pipeline_config(data: &Path, seed: u64) -> Result<PipelineConfig> {
    Ok(PipelineConfig::new(data)?.with_split(SplitConfig::new(seed)))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode stdout summary")?;
    println!("{json}");
    Ok(())
}

/// Logs go to stderr so stdout carries only the JSON summary.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to size the rayon pool")?;
        info!(threads, "rayon pool sized");
    }

    match cli.command {
        Command::Extract { io } => {
            let writer = open_writer(&io)?;
            let pipeline = Pipeline::new(pipeline_config(&io.data, cli.seed)?);

            let labeled = pipeline
                .extract()
                .context("failed to build the dataset")?;
            writer
                .write_features(&labeled.dataset, &labeled.priorities.names())
                .context("failed to write features CSV")?;
            info!(path = %writer.features_path().display(), "features written");

            let p = &labeled.priorities;
            let output = ExtractOutput {
                experiment: io.experiment,
                data_root: pipeline.config().data_root().to_path_buf(),
                n_samples: labeled.dataset.n_samples(),
                n_low: p.count(Priority::Low),
                n_medium: p.count(Priority::Medium),
                n_high: p.count(Priority::High),
                features_csv: writer.features_path(),
            };
            print_json(&output)?;
        }

        Command::Run {
            io,
            n_trees,
            max_depth,
            criterion,
        } => {
            let writer = open_writer(&io)?;

            let forest = RandomForestConfig::new(n_trees)?
                .with_max_depth(max_depth)
                .with_criterion(criterion.into())
                .with_seed(cli.seed);
            let pipeline = Pipeline::new(pipeline_config(&io.data, cli.seed)?.with_forest(forest));

            let report = pipeline.run().context("pipeline failed")?;
            log_evaluation(&report.validation);
            log_evaluation(&report.test);

            writer
                .write_features(&report.labeled.dataset, &report.labeled.priorities.names())
                .context("failed to write features CSV")?;
            writer
                .write_evaluation(&report.artifact())
                .context("failed to write evaluation JSON")?;
            info!(dir = %io.output_dir.display(), "artifacts written");

            let config = pipeline.config();
            let output = RunOutput {
                experiment: io.experiment,
                data_root: config.data_root().to_path_buf(),
                n_samples: report.labeled.dataset.n_samples(),
                n_trees: config.forest().n_trees(),
                seed: config.split().seed(),
                validation: partition_output(&report.validation),
                test: partition_output(&report.test),
                features_csv: writer.features_path(),
                evaluation_json: writer.evaluation_path(),
            };
            print_json(&output)?;
        }
    }

    Ok(())
}
