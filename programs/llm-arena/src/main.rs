use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use llm_arena::{ExperimentConfig, Game, OpenAiCompleter, Overrides};

/// Run a repeated-game experiment against a chat completion model
#[derive(Debug, Parser)]
#[command(name = "llm-arena", version)]
struct Args {
    /// Game to play
    #[arg(value_enum)]
    game: Game,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Samples per grid cell
    #[arg(long)]
    samples: Option<usize>,
    /// Rounds per repeated game
    #[arg(long)]
    rounds: Option<usize>,
    /// Model identifier
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    temperature: Option<f32>,
    #[arg(long)]
    max_tokens: Option<u32>,
    /// Answer every turn with this text instead of calling the model
    #[arg(long)]
    dry_run: Option<String>,
    /// Samples in flight at once
    #[arg(long)]
    concurrency: Option<usize>,
    /// JSON Lines results file
    #[arg(long, default_value = "results.jsonl")]
    output: PathBuf,
    #[arg(long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            num_samples: self.samples,
            num_rounds: self.rounds,
            concurrency: self.concurrency,
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            dry_run: self.dry_run.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    llm_arena::log(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })?;

    let config = match &args.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ExperimentConfig::default(),
    }
    .apply(args.overrides());

    let completer = if config.model.dry_run.is_some() {
        OpenAiCompleter::new(config.api.clone(), "")
    } else {
        OpenAiCompleter::from_env(config.api.clone())?
    };

    let summary = llm_arena::experiments::run(args.game, &completer, &config, &args.output).await?;
    log::info!(
        "{:?}: {} rows ({} degraded) written to {}",
        args.game,
        summary.rows,
        summary.degraded,
        args.output.display()
    );
    Ok(())
}
