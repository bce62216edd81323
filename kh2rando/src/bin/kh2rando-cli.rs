use anyhow::{bail, Context, Result};
use clap::Parser;
use kh2rando::assign::assign_all;
use kh2rando::randomize::randomize_seed;
use kh2rando::settings::{
    load_randomizer_settings, ItemPlacementDifficulty, ProgressionRate, RandomizerSettings,
};
use kh2rando::spoiler_log::get_spoiler_log;
use kh2rando_game::ItemCatalog;
use log::{error, info};
use rand::{RngCore, SeedableRng};
use std::path::{Path, PathBuf};

#[derive(Parser)]
struct Args {
    #[arg(long)]
    seed: Option<String>,
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    reverse: Option<bool>,
    #[arg(long)]
    progression_rate: Option<ProgressionRate>,
    #[arg(long)]
    item_placement_difficulty: Option<ItemPlacementDifficulty>,
    #[arg(long)]
    output_records: Option<PathBuf>,
    #[arg(long)]
    output_spoiler_log: Option<PathBuf>,
    #[arg(long)]
    check_reverse: bool,
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    std::fs::write(path, out).with_context(|| format!("Unable to write {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    let args = Args::parse();

    let catalog = ItemCatalog::load()?;
    let mut settings = match &args.settings {
        Some(path) => load_randomizer_settings(path)?,
        None => RandomizerSettings::default(),
    };
    if let Some(reverse) = args.reverse {
        settings.reverse = reverse;
    }
    let progression = &mut settings.item_progression_settings;
    if let Some(rate) = args.progression_rate {
        progression.progression_rate = rate;
    }
    if let Some(difficulty) = args.item_placement_difficulty {
        progression.item_placement_difficulty = difficulty;
    }
    let seed = match &args.seed {
        Some(s) => s.clone(),
        None => format!(
            "{}",
            rand::rngs::StdRng::from_entropy().next_u64() & 0xFFFFFFFF
        ),
    };
    info!(
        "Generating seed {seed} ({} graph, {} progression, {} placement)",
        if settings.reverse { "reverse" } else { "forward" },
        settings.item_progression_settings.progression_rate,
        settings.item_progression_settings.item_placement_difficulty,
    );

    let (graph, randomization) = match randomize_seed(&catalog, &settings, &seed) {
        Ok(out) => out,
        Err(e) => {
            error!("{e}");
            if let kh2rando::error::RandomizeError::ExhaustedRetries { failures } = &e {
                for (i, failure) in failures.iter().enumerate() {
                    error!("Attempt {}: {failure}", i + 1);
                }
            }
            bail!("Seed generation failed: {e}");
        }
    };
    info!(
        "Generated seed {} on attempt {}: {} of {} checks reachable",
        randomization.seed_name,
        randomization.attempt_num + 1,
        randomization.report.num_reachable_checks,
        graph.num_checks()
    );

    if args.check_reverse {
        let mut opposite = settings.clone();
        opposite.reverse = !settings.reverse;
        match randomize_seed(&catalog, &opposite, &seed) {
            Ok((_, r)) => info!(
                "Opposite direction also generates: {} checks reachable",
                r.report.num_reachable_checks
            ),
            Err(e) => bail!("Opposite direction failed: {e}"),
        }
    }

    if let Some(path) = &args.output_records {
        println!("Writing seed records to {}", path.display());
        let records = assign_all(&graph, &catalog, &settings, &randomization)?;
        write_json(path, &records)?;
    }
    if let Some(path) = &args.output_spoiler_log {
        println!("Writing spoiler log to {}", path.display());
        let spoiler_log = get_spoiler_log(&graph, &catalog, &randomization);
        write_json(path, &spoiler_log)?;
    }
    Ok(())
}
