//! Balanco CLI binary.
//!
//! Provides command-line interface for financial statement analysis of
//! CVM-listed companies.

mod integration;

use balanco::{Analysis, AnalysisConfig, Model};
use balanco_output::{
    ExportFormat, Exporter, Plotter, TerminalChart, model_title, summarize_analysis,
};
use balanco_ratios::{
    AccountCatalog, IndicatorCategory, IndicatorInfo, available_indicators, get_indicator_info,
    indicators_by_category, indicators_by_model,
};
use chrono::Datelike;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::pipeline::{SourceOptions, run_analysis};
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "balanco")]
#[command(about = "Balanco: financial ratios and DuPont analysis from CVM filings", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute ratios and DuPont decompositions for a company
    Analyze {
        /// CVM company code (leading zeros optional)
        company: String,

        /// First fiscal year [default: four years before --to]
        #[arg(long)]
        from: Option<i32>,

        /// Last fiscal year [default: last year]
        #[arg(long)]
        to: Option<i32>,

        /// Read quarterly information (ITR) instead of annual statements (DFP)
        #[arg(long)]
        quarterly: bool,

        /// Read parent-only instead of consolidated statements
        #[arg(long)]
        individual: bool,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// JSON account catalog overriding the built-in rules
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Income tax rate for the adjusted DuPont model
        #[arg(long)]
        tax_rate: Option<f64>,

        /// Output format (text, csv or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the output to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Draw bar charts of every series
        #[arg(long)]
        chart: bool,
    },

    /// List the indicators the engine produces
    Indicators {
        /// Show a single indicator by machine name
        name: Option<String>,

        /// Only one model (ratios, traditional or adjusted)
        #[arg(long)]
        model: Option<String>,

        /// Only one category (liquidity, profitability, activity, capital or dupont)
        #[arg(long)]
        category: Option<String>,
    },

    /// Inspect or clear the row-set cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache location and contents
    Info,

    /// Delete cached row-sets
    Clear {
        /// Only this company
        #[arg(long)]
        company: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze {
            company,
            from,
            to,
            quarterly,
            individual,
            no_cache,
            refresh,
            catalog,
            tax_rate,
            format,
            output,
            chart,
        } => {
            let to = to.unwrap_or_else(|| chrono::Utc::now().year() - 1);
            let from = from.unwrap_or(to - 4);

            let mut config = AnalysisConfig::new(company, from, to);
            if let Some(path) = catalog {
                config = config.with_catalog(AccountCatalog::from_path(&path)?);
            }
            if let Some(rate) = tax_rate {
                config = config.with_tax_rate(rate);
            }

            let options = SourceOptions {
                quarterly,
                individual,
                use_cache: !no_cache,
                force_refresh: refresh,
            };
            analyze_company(config, &options, &format, output, chart).await?;
        }
        Commands::Indicators {
            name,
            model,
            category,
        } => match name {
            Some(name) => show_indicator(&name)?,
            None => list_indicators(model.as_deref(), category.as_deref())?,
        },
        Commands::Cache { action } => match action {
            CacheAction::Info => {
                println!("Balanco cache");
                cache_manager::print_cache_info();
            }
            CacheAction::Clear { company } => clear_cache(company.as_deref())?,
        },
    }

    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` applies unless `-v` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn analyze_company(
    config: AnalysisConfig,
    options: &SourceOptions,
    format: &str,
    output: Option<PathBuf>,
    chart: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    if !format.eq_ignore_ascii_case("text") {
        format.parse::<ExportFormat>()?;
    }

    // csv and json on stdout stay machine-readable
    if format.eq_ignore_ascii_case("text") || output.is_some() {
        print_header(&config, options);
    }

    let pb = ProgressBar::new(config.year_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let analysis = match run_analysis(config, options, Some(&pb)).await {
        Ok(analysis) => {
            pb.finish_with_message(format!(
                "Computed {} of {} fiscal years",
                analysis.years().len(),
                analysis.to - analysis.from + 1
            ));
            analysis
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    write_output(&analysis, format, output)?;

    if chart {
        let plotter = TerminalChart::stdout();
        for model in Model::ALL {
            plotter.render(analysis.series(model), model_title(model));
        }
    }

    Ok(())
}

fn print_header(config: &AnalysisConfig, options: &SourceOptions) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!(
        "║{:^62}║",
        format!("FINANCIAL STATEMENT ANALYSIS: {}", config.company)
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Fiscal years: {} to {}", config.from, config.to);
    println!(
        "Statements: {} ({})",
        if options.quarterly { "ITR" } else { "DFP" },
        if options.individual {
            "individual"
        } else {
            "consolidated"
        }
    );
    if options.use_cache {
        cache_manager::print_cache_info();
        if options.force_refresh {
            println!("  Mode: Force refresh (re-fetching all data)");
        }
    } else {
        println!("  Cache: Disabled");
    }
    println!();
}

fn write_output(
    analysis: &Analysis,
    format: &str,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if format.eq_ignore_ascii_case("text") {
        let text: String = summarize_analysis(analysis)
            .iter()
            .map(|summary| summary.to_ascii_table())
            .collect();
        match output {
            Some(path) => {
                std::fs::write(&path, text)?;
                println!("Wrote {}", path.display());
            }
            None => print!("{}", text),
        }
        return Ok(());
    }

    let format = match format.parse::<ExportFormat>()? {
        ExportFormat::Json if output.is_none() => ExportFormat::PrettyJson,
        other => other,
    };
    match output {
        Some(path) => {
            analysis.export_to_file(&path, format)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", analysis.export_to_string(format)?),
    }
    Ok(())
}

fn parse_model(name: &str) -> Result<Model, Box<dyn std::error::Error>> {
    match name.to_ascii_lowercase().as_str() {
        "ratios" => Ok(Model::Ratios),
        "traditional" | "traditional_dupont" => Ok(Model::TraditionalDupont),
        "adjusted" | "adjusted_dupont" => Ok(Model::AdjustedDupont),
        other => Err(format!(
            "Unknown model '{}'. Use ratios, traditional or adjusted",
            other
        )
        .into()),
    }
}

fn parse_category(name: &str) -> Result<IndicatorCategory, Box<dyn std::error::Error>> {
    match name.to_ascii_lowercase().as_str() {
        "liquidity" => Ok(IndicatorCategory::Liquidity),
        "profitability" => Ok(IndicatorCategory::Profitability),
        "activity" => Ok(IndicatorCategory::Activity),
        "capital" | "capital_structure" => Ok(IndicatorCategory::CapitalStructure),
        "dupont" => Ok(IndicatorCategory::Dupont),
        other => Err(format!(
            "Unknown category '{}'. Use liquidity, profitability, activity, capital or dupont",
            other
        )
        .into()),
    }
}

fn show_indicator(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let info = get_indicator_info(name).ok_or_else(|| format!("Unknown indicator '{}'", name))?;

    println!("{} ({})", info.label, info.name);
    println!("  Model:     {}", info.model);
    println!("  Category:  {:?}", info.category);
    println!("  Decimals:  {}", info.precision.decimals());
    println!("  {}", info.description);
    Ok(())
}

fn list_indicators(
    model: Option<&str>,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let infos: Vec<IndicatorInfo> = match (model, category) {
        (Some(model), Some(category)) => {
            let category = parse_category(category)?;
            indicators_by_model(parse_model(model)?)
                .into_iter()
                .filter(|info| info.category == category)
                .collect()
        }
        (Some(model), None) => indicators_by_model(parse_model(model)?),
        (None, Some(category)) => indicators_by_category(parse_category(category)?),
        (None, None) => available_indicators(),
    };

    println!(
        "{:<30} {:<28} {:<18} {:>8}",
        "Name", "Label", "Model", "Decimals"
    );
    println!("{}", "-".repeat(87));
    for info in &infos {
        println!(
            "{:<30} {:<28} {:<18} {:>8}",
            info.name,
            info.label,
            info.model.to_string(),
            info.precision.decimals()
        );
        println!("    {}", info.description);
    }
    println!("\n{} indicators", infos.len());
    Ok(())
}

fn clear_cache(company: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_manager::open_cache()?;
    match company {
        Some(company) => {
            let removed = cache.invalidate_company(company)?;
            println!("Removed {} cached row-sets for company {}", removed, company);
        }
        None => {
            cache.clear()?;
            println!("Cache cleared: {}", cache_manager::get_cache_path().display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_and_category() {
        assert_eq!(parse_model("Adjusted").unwrap(), Model::AdjustedDupont);
        assert_eq!(
            parse_category("capital").unwrap(),
            IndicatorCategory::CapitalStructure
        );
        assert!(parse_category("valuation").is_err());
    }

    #[test]
    fn test_indicator_lookup_by_name() {
        assert!(show_indicator("days_payables").is_ok());
        assert!(show_indicator("payback").is_err());
    }

    #[test]
    fn test_cli_parses_indicator_filters() {
        let cli = Cli::try_parse_from([
            "balanco",
            "indicators",
            "--model",
            "ratios",
            "--category",
            "liquidity",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Indicators {
                name: None,
                model: Some(_),
                category: Some(_),
            }
        ));
        assert!(list_indicators(Some("ratios"), Some("liquidity")).is_ok());
    }
}
