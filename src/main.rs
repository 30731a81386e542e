use anyhow::Context;
use rand::Rng;
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use maze_arena::config::SimConfig;
use maze_arena::game::game_loop::run_match;
use maze_arena::game::match_result::MatchSummary;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Maze Arena v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load_or_default();
    config.validate().context("invalid simulation configuration")?;
    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        "Configuration loaded: {}x{} maze, {} {} bots, {} match(es), seed {}",
        config.cols,
        config.rows,
        config.bot_count,
        config.difficulty.name(),
        config.matches,
        base_seed
    );

    let play = |index: usize| {
        let seed = config.match_seed(base_seed, index);
        run_match(&config, seed)
            .map(|(summary, _)| summary)
            .with_context(|| format!("failed to set up match with seed {seed}"))
    };

    // Matches are independent; each one stays single-threaded inside
    let summaries: Vec<MatchSummary> = if config.matches > 1 {
        (0..config.matches).into_par_iter().map(play).collect::<anyhow::Result<_>>()?
    } else {
        vec![play(0)?]
    };

    let wins = summaries.iter().filter(|s| s.primary_won()).count();
    let avg_duration = summaries.iter().map(|s| s.duration).sum::<f32>() / summaries.len() as f32;
    info!(
        "Batch complete: {}/{} won by the primary agent, average {:.1}s",
        wins,
        summaries.len(),
        avg_duration
    );

    let json = serde_json::to_string_pretty(&summaries).context("failed to encode summaries")?;
    println!("{json}");

    Ok(())
}
