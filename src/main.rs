use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::{path::PathBuf, time::Duration};

use square_sales::{
    aggregate_sales, Config, DateRange, EnrichmentPolicy, OrderFilter, Report, SortBy,
    SquareClient, DEFAULT_PAGE_LIMIT,
};

/// Generate a sales report for a time period.
///
/// Credentials are read from SQUARE_ACCESS_TOKEN and SQUARE_ENVIRONMENT,
/// or from a .env file in the current directory.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Start of the report period (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    start_date: String,

    /// End of the report period, inclusive for calendar dates (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    end_date: String,

    /// Location to report on
    #[arg(long, env = "SQUARE_LOCATION_ID")]
    location: String,

    /// Only include orders from this source (may be repeated), e.g. SEED_DATA
    #[arg(long = "source-name")]
    source_names: Vec<String>,

    /// Order states to include (may be repeated)
    #[arg(long = "state", default_value = "COMPLETED")]
    states: Vec<String>,

    /// Orders to request per page
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    limit: u32,

    /// Also write the report rows to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Don't print the report table
    #[arg(long)]
    no_table: bool,

    /// Row order for the report
    #[arg(long, value_enum, default_value_t = SortBy::None)]
    sort: SortBy,

    /// Report sales figures even if catalog or inventory lookups fail
    #[arg(long)]
    partial_enrichment: bool,

    /// Request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Log progress (orders and pages retrieved) to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    let range = DateRange::parse(&args.start_date, &args.end_date)?;
    let filter = OrderFilter::new(args.location, range)
        .with_states(args.states)
        .with_source_names(args.source_names)
        .with_limit(args.limit);
    let config = Config::from_env()
        .context("loading Square credentials")?
        .with_timeout(Duration::from_secs(args.timeout));
    let client = SquareClient::new(&config)?;

    let policy = if args.partial_enrichment {
        EnrichmentPolicy::Partial
    } else {
        EnrichmentPolicy::FailFast
    };
    let tally = aggregate_sales(&client, &filter, policy)?;

    let mut report = Report::new(&args.start_date, &args.end_date, tally);
    report.sort_by = args.sort;
    if !args.no_table {
        println!();
        print!("{report}");
    }
    if let Some(path) = args.csv {
        report
            .write_csv_file(&path)
            .with_context(|| format!("{}", path.display()))?;
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
