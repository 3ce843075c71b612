#![deny(warnings)]

//! Headless driver: founds a corporation, runs market cycles and prints KPIs.

use anyhow::{bail, Context, Result};
use catalog::Catalog;
use corp_core::{CorpState, EngineConfig};
use corp_runtime::{Corporation, FlatDivision};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

const DIVISION_NAMES: [&str; 6] = [
    "Agriculture",
    "Tobacco",
    "Software",
    "Healthcare",
    "Robotics",
    "Real Estate",
];

/// Unlocks the driver buys up front when affordable.
const STARTER_UNLOCKS: [&str; 2] = ["Export", "Smart Supply"];

struct Args {
    cycles: u64,
    seed: u64,
    divisions: usize,
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
    save: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        cycles: 10,
        seed: 42,
        divisions: 2,
        config: None,
        catalog: None,
        save: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--cycles" => args.cycles = value()?.parse().context("--cycles")?,
            "--seed" => args.seed = value()?.parse().context("--seed")?,
            "--divisions" => args.divisions = value()?.parse().context("--divisions")?,
            "--config" => args.config = Some(value()?.into()),
            "--catalog" => args.catalog = Some(value()?.into()),
            "--save" => args.save = Some(value()?.into()),
            other => bail!("unknown argument {other}"),
        }
    }
    if args.divisions > DIVISION_NAMES.len() {
        bail!("at most {} divisions are supported", DIVISION_NAMES.len());
    }
    Ok(args)
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: EngineConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(
        cycles = args.cycles,
        seed = args.seed,
        divisions = args.divisions,
        build = env!("GIT_SHA"),
        "starting CLI"
    );

    let config = load_config(args.config.as_ref())?;
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };

    let mut corp: Corporation<FlatDivision> =
        Corporation::new("CLI Corp", false, config, args.seed)?;
    for (i, name) in DIVISION_NAMES.iter().take(args.divisions).enumerate() {
        let scale = (i + 1) as f64;
        corp.add_division(*name, FlatDivision::new(2e6 * scale, 8e5 * scale).with_growth(0.01))?;
    }
    for id in STARTER_UNLOCKS {
        match catalog.unlock(id) {
            Some(unlock) => {
                if let Err(e) = corp.purchase_unlock(unlock) {
                    warn!(unlock = id, error = %e, "skipping starter unlock");
                }
            }
            None => warn!(unlock = id, "starter unlock missing from catalog"),
        }
    }

    let phases_per_cycle = CorpState::ORDER.len() as u64;
    let per_phase = corp.config().cycles_per_market_cycle;
    let mut owner_income = 0.0;
    for _ in 0..args.cycles {
        corp.store_cycles(per_phase * phases_per_cycle);
        while corp.process().is_some() {}
        owner_income += corp.take_owner_income();
        for notice in corp.take_notices() {
            warn!(%notice, "corporation notice");
        }
    }

    println!(
        "Corp OK | name: {} | divisions: {} | unlocks: {} | build: {} ({})",
        corp.name(),
        corp.division_count(),
        corp.unlocks().count(),
        env!("GIT_SHA"),
        env!("BUILD_DATE")
    );
    println!(
        "KPI | cycles: {} | funds: ${:.0} | revenue/s: ${:.0} | expenses/s: ${:.0} | valuation: ${:.0} | share price: ${:.2} | owner income: ${:.0}",
        args.cycles,
        corp.funds(),
        corp.revenue(),
        corp.expenses(),
        corp.valuation(),
        corp.share_price(),
        owner_income
    );

    if let Some(path) = &args.save {
        persistence::save_json_file(&corp, path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
