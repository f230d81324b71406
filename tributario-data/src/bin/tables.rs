use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use tributario_core::calculations::sweep_all_annexes;
use tributario_core::{IRRF_TABLE_KEY, TableSource};
use tributario_data::FileSource;

/// Inspect a tax table bundle and optionally resolve every annex for a revenue.
///
/// The bundle is either JSON (keys `anexo_I`..`anexo_V`, `irrf_table`,
/// `cnae_rules`) or CSV with the columns:
/// - table: `anexo_I`..`anexo_V` or `irrf_table`
/// - upper_bound: upper bound of the bracket
/// - rate: rate as a decimal (e.g., 0.06)
/// - deduction: amount deducted (empty for zero)
#[derive(Parser, Debug)]
#[command(name = "tributario-tables")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the JSON or CSV table bundle
    #[arg(short, long)]
    file: PathBuf,

    /// Annual revenue to resolve against every annex table
    #[arg(short, long)]
    revenue: Option<Decimal>,

    /// Revenue of the reference month (defaults to revenue / 12)
    #[arg(short, long, requires = "revenue")]
    monthly_revenue: Option<Decimal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("Loading tables from: {}", args.file.display());

    let tables = FileSource::new(&args.file)
        .load()
        .await
        .with_context(|| format!("Failed to load tables: {}", args.file.display()))?;

    for (annex, table) in tables.annexes() {
        println!(
            "{:<12} {:>2} brackets, top bound {}",
            annex.table_key(),
            table.len(),
            table.top_bound().map(|b| b.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
    match &tables.irrf_table {
        Some(table) => println!(
            "{:<12} {:>2} brackets, top bound {}",
            IRRF_TABLE_KEY,
            table.len(),
            table.top_bound().map(|b| b.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        None => println!("{IRRF_TABLE_KEY:<12} missing"),
    }
    println!("{:<12} {:>2} rules", "cnae_rules", tables.cnae_rules.len());

    if let Some(revenue) = args.revenue {
        println!();
        println!("Annual revenue: {revenue}");

        let results = sweep_all_annexes(&tables, revenue, args.monthly_revenue);
        if results.is_empty() {
            println!("No annex table could be resolved.");
        }
        for result in results.values() {
            println!(
                "Anexo {:<4} rate {:<8} deduction {:<10} annual {:>12} monthly {:>10}",
                result.annex, result.rate, result.deduction, result.tax_annual, result.tax_monthly
            );
        }
    }

    Ok(())
}
