use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

mod expand;
mod records;
mod terminal;
mod tree;

use anyhow::Context;
use clap::ArgAction;
use expand::Expand;
use meshvocab::{Config, Node, Record, RecordParser, RecordsIndex, TreeParser};
use records::Records;
use tracing::instrument;
use tree::Tree;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML parser configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(true)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Parse a descriptor file and look up records by tree number
    Records(Records),

    /// List the tree numbers below a prefix
    Tree(Tree),

    /// List the tree numbers below a prefix together with their headings
    Expand(Expand),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Records(command) => command.run(config)?,
            Self::Tree(command) => command.run()?,
            Self::Expand(command) => command.run(config)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    path.map_or_else(
        || Ok(Config::default()),
        |path| {
            Config::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        },
    )
}

fn open(path: &Path) -> anyhow::Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

#[instrument(level = "debug", skip(config))]
fn load_records(
    path: &Path,
    config: &Config,
) -> anyhow::Result<(Vec<Arc<Record>>, RecordsIndex)> {
    let reader = open(path)?;
    let (records, index) = RecordParser::with_config(reader, config.clone())
        .parse_all()
        .with_context(|| format!("failed to parse records from {}", path.display()))?;
    tracing::info!(
        records = records.len(),
        tree_numbers = index.len(),
        "loaded descriptor records"
    );
    Ok((records, index))
}

#[instrument(level = "debug")]
fn load_tree(path: &Path) -> anyhow::Result<Node> {
    let mut root = Node::new();
    let summary = TreeParser::new(open(path)?)
        .populate(&mut root)
        .with_context(|| format!("failed to parse tree listing {}", path.display()))?;
    if summary.skipped > 0 {
        tracing::warn!(
            skipped = summary.skipped,
            "some tree listing lines were malformed"
        );
    }
    Ok(root)
}
