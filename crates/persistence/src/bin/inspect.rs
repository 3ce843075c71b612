#![deny(warnings)]

use anyhow::Context;
use corp_runtime::{Corporation, FlatDivision};
use persistence::{default_save_path, load_json_file};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_save_path);
    let corp: Corporation<FlatDivision> = load_json_file(&path)
        .with_context(|| format!("reading save {}", path.display()))?;
    println!(
        "{} | funds: {:.2} | valuation: {:.2} | share price: {:.2} | public: {} | state: {} | divisions: {}",
        corp.name(),
        corp.funds(),
        corp.valuation(),
        corp.share_price(),
        corp.is_public(),
        corp.state().current(),
        corp.division_count()
    );
    Ok(())
}
