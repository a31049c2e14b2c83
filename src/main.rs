mod config;
mod preview;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use graph::git_backend::{GitWalker, History};
use graph::{BranchGraph, GraphEngine, LayoutOptions, StrategyKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const DEFAULT_COUNT: usize = 1000;
const DEFAULT_WIDTH: usize = 120;

#[derive(Parser)]
#[command(name = "gitlane")]
#[command(about = "Lay out a commit graph into lanes and branches", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the laid-out graph
    Layout {
        #[command(flatten)]
        source: Source,
        /// Print the full graph as JSON
        #[arg(long)]
        json: bool,
        /// Maximum line width of the text preview
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: usize,
    },
    /// List discovered branches
    Branches {
        #[command(flatten)]
        source: Source,
    },
}

/// Where history comes from and how to lay it out
#[derive(Args)]
struct Source {
    /// Path to the repository
    #[arg(default_value = ".")]
    path: PathBuf,
    /// Read `{ "commits": [...], "refs": [...] }` JSON instead of a repository
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
    /// Lane assignment strategy
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Mainline branch name
    #[arg(long)]
    mainline: Option<String>,
    /// Number of commits to load
    #[arg(short = 'n', long)]
    count: Option<usize>,
    /// TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    BranchFirst,
    RowByRow,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::BranchFirst => StrategyKind::BranchFirst,
            StrategyArg::RowByRow => StrategyKind::RowByRow,
        }
    }
}

impl Source {
    fn options(&self, config: &Config) -> LayoutOptions {
        let mut options = config.layout.clone();
        if let Some(strategy) = self.strategy {
            options = options.with_strategy(strategy.into());
        }
        if let Some(mainline) = &self.mainline {
            options = options.with_mainline(mainline.clone());
        }
        options
    }

    fn history(&self, config: &Config) -> Result<History> {
        if let Some(input) = &self.input {
            return read_input(input);
        }
        let count = self.count.or(config.count).unwrap_or(DEFAULT_COUNT);
        let path = self.path.to_str().context("Repository path is not valid UTF-8")?;
        GitWalker::new(Some(path))?.load(Some(count))
    }

    fn compute(&self) -> Result<BranchGraph> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let options = self.options(&config);
        let history = self.history(&config)?;
        debug!(commits = history.commits.len(), refs = history.refs.len(), "history ready");

        let graph = GraphEngine::new(options).layout(history.commits, &history.refs)?;
        info!(
            commits = graph.commits.len(),
            branches = graph.branches.len(),
            lanes = graph.lane_count,
            "graph computed"
        );
        Ok(graph)
    }
}

fn read_input(path: &Path) -> Result<History> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid history JSON in {}", path.display()))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Layout { source, json, width } => {
            let graph = source.compute()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&graph)?);
            } else {
                for line in preview::render(&graph, width) {
                    println!("{line}");
                }
                println!(
                    "\n{} commits, {} branches, {} lanes ({})",
                    graph.commits.len(),
                    graph.branches.len(),
                    graph.lane_count,
                    graph.strategy.as_str()
                );
            }
        }
        Commands::Branches { source } => {
            let graph = source.compute()?;
            for line in preview::branch_table(&graph) {
                println!("{line}");
            }
        }
    }

    Ok(())
}
