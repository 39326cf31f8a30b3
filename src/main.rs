use anyhow::{Context, Result};
use nevareport::{
    catalog::Catalog,
    config::{Config, OutputFormat},
    logging, render, report, Analysis, Report,
};
use std::env;
use tracing::{error, info};

fn main() -> Result<()> {
    // ─── 1) config + logging ─────────────────────────────────────────
    let cfg = Config::load().context("loading configuration")?;
    logging::init(&cfg.log_level);
    info!(data_dir = %cfg.data_dir.display(), "startup");

    // ─── 2) scan the data directory ──────────────────────────────────
    let catalog = Catalog::scan(&cfg.data_dir)
        .with_context(|| format!("scanning {}", cfg.data_dir.display()))?;

    let Some(selected) = env::args().nth(1) else {
        match cfg.format {
            OutputFormat::Text => print!("{}", render::render_catalog(&catalog)),
            OutputFormat::Json => println!("{}", render::catalog_json(&catalog)?),
        }
        return Ok(());
    };

    // ─── 3) analyse the selected file ────────────────────────────────
    let opts = cfg.extract_options();
    let (file_name, path) = catalog.resolve(&selected);
    let loaded = report::extract_with(&path, &opts);
    let report: Report = match loaded {
        Ok(r) => r,
        Err(e) => {
            error!(file = %file_name, "cannot analyse report: {}", e);
            return Err(e).with_context(|| format!("analysing {}", file_name));
        }
    };
    let analysis = Analysis::of(&report, cfg.lead_buckets);

    match cfg.format {
        OutputFormat::Text => {
            print!("{}", render::render_catalog(&catalog));
            println!();
            print!("{}", render::render_report(&file_name, &report, &analysis));
        }
        OutputFormat::Json => {
            println!("{}", render::report_json(&file_name, &report, &analysis)?)
        }
    }

    info!("all done");
    Ok(())
}
