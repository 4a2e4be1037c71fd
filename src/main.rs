use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use email_campaign_kpis::cache::{ttl_from_secs, CsvLoader, SnapshotCache, DEFAULT_TTL_SECS};
use email_campaign_kpis::filter::FilterOptions;
use email_campaign_kpis::metrics::derive_records;
use email_campaign_kpis::pipeline::{build_view, DashboardView, ViewRequest};
use email_campaign_kpis::source::read_export;
use email_campaign_kpis::{report, DateWindow, FilterSet, PeriodPreset, PeriodSelection, RawTable};

#[derive(Parser)]
#[command(name = "campaign-kpis")]
#[command(about = "Period-over-period KPI reports for email campaign exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a KPI report for one period
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the values available for each filter and the export's date range
    Options {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Re-render the report on a timer; press Enter to reload the export
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long, default_value_t = 60)]
        refresh_secs: u64,
        #[arg(long, env = "KPI_CACHE_TTL_SECS", default_value_t = DEFAULT_TTL_SECS)]
        cache_ttl_secs: i64,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Campaign export as CSV
    #[arg(long, env = "KPI_EXPORT_CSV")]
    csv: PathBuf,
    /// Lines preceding the header row
    #[arg(long, env = "KPI_SKIP_ROWS", default_value_t = 1)]
    skip_rows: usize,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long, default_value_t = PeriodPreset::MonthToDate)]
    period: PeriodPreset,
    /// Cover every send in the export (overrides --period)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    all: bool,
    /// Custom period start (overrides --period)
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    /// Custom period end
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
    /// Anchor date for named periods, defaults to the local date
    #[arg(long)]
    today: Option<NaiveDate>,
    #[arg(long = "campaign")]
    campaigns: Vec<String>,
    #[arg(long = "recipient")]
    recipients: Vec<String>,
    #[arg(long = "email-type")]
    email_types: Vec<String>,
    #[arg(long = "message")]
    messages: Vec<String>,
    #[arg(long = "variant")]
    variants: Vec<String>,
}

impl ViewArgs {
    fn request(&self) -> ViewRequest {
        let period = match (self.from, self.to) {
            (Some(start), Some(end)) => PeriodSelection::Custom { start, end },
            _ if self.all => PeriodSelection::AllData,
            _ => PeriodSelection::Preset(self.period),
        };
        ViewRequest {
            today: self.today.unwrap_or_else(|| Local::now().date_naive()),
            period,
            filters: FilterSet::default()
                .with_campaigns(self.campaigns.iter().cloned())
                .with_recipients(self.recipients.iter().cloned())
                .with_email_types(self.email_types.iter().cloned())
                .with_messages(self.messages.iter().cloned())
                .with_variants(self.variants.iter().cloned()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn render(view: &DashboardView, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(report::build_report(view)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(view).context("failed to serialize dashboard view")
        }
    }
}

fn view_of(table: &RawTable, request: &ViewRequest) -> anyhow::Result<DashboardView> {
    build_view(table, request).context("export cannot be turned into a dashboard view")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "email_campaign_kpis=info,campaign_kpis=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            source,
            view,
            format,
            out,
        } => {
            let table = read_export(&source.csv, source.skip_rows)?;
            let dashboard = view_of(&table, &view.request())?;
            let rendered = render(&dashboard, format)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Options { source } => {
            let table = read_export(&source.csv, source.skip_rows)?;
            let load = derive_records(&table)
                .context("export cannot be turned into campaign records")?;
            let options = FilterOptions::from_records(&load.records);

            match DateWindow::spanning(&load.records) {
                Some(range) => println!("Sends between {range} ({} rows).", load.records.len()),
                None => println!("No sends found in this export."),
            }
            if load.dropped_rows > 0 {
                println!("{} rows skipped for unreadable dates.", load.dropped_rows);
            }
            for (name, values) in [
                ("Campaigns", &options.campaign_names),
                ("Recipients", &options.recipient_ids),
                ("Email types", &options.email_types),
                ("Messages", &options.messages),
                ("Variants", &options.variants),
            ] {
                println!("{name}:");
                for value in values {
                    println!("- {value}");
                }
            }
            println!("Periods: {}", PeriodPreset::names());
        }
        Commands::Watch {
            source,
            view,
            format,
            refresh_secs,
            cache_ttl_secs,
        } => {
            let ttl = ttl_from_secs(cache_ttl_secs)?;
            let mut cache = SnapshotCache::new(
                CsvLoader {
                    path: source.csv.clone(),
                    skip_rows: source.skip_rows,
                },
                ttl,
            );
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(refresh_secs.max(1)));
            let mut stdin = BufReader::new(tokio::io::stdin()).lines();
            let mut stdin_open = true;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    line = stdin.next_line(), if stdin_open => match line {
                        Ok(Some(_)) => {
                            info!("reload requested");
                            cache.invalidate();
                        }
                        _ => stdin_open = false,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }

                let (table, as_of) = match cache.get() {
                    Ok(snapshot) => snapshot,
                    Err(err) => {
                        warn!(error = %format!("{err:#}"), "export unavailable");
                        continue;
                    }
                };
                match view_of(table, &view.request()).and_then(|d| render(&d, format)) {
                    Ok(rendered) => {
                        println!("<!-- data as of {} -->", as_of.format("%Y-%m-%d %H:%M:%S"));
                        print!("{rendered}");
                    }
                    Err(err) => warn!(error = %format!("{err:#}"), "cannot render dashboard"),
                }
            }
        }
    }

    Ok(())
}
