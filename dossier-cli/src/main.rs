use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use dossier_client::{
    ClientConfig, DEFAULT_BASE_URL, HttpSearchApi, SearchApi, SearchRequest, SearchSession,
    SearchState,
};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod ui;

#[derive(Parser)]
#[command(
    name = "dossier",
    version,
    about = "Terminal client for the dossier person-search service"
)]
struct Cli {
    /// Server base URL
    #[arg(long, global = true, env = "DOSSIER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a search and stream its progress
    Search {
        /// Person's full name
        #[arg(long)]
        name: String,

        /// City to narrow the search
        #[arg(long, default_value = "")]
        city: String,

        /// Extra search terms, comma separated
        #[arg(long, default_value = "")]
        terms: String,

        /// Generate a server-side report once the search completes
        #[arg(long)]
        report: bool,

        /// Print the result as JSON instead of a summary block
        #[arg(long)]
        json: bool,
    },
    /// Check that the service is reachable
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = ClientConfig::default().with_base_url(cli.base_url.as_str());

    match cli.command {
        Command::Search {
            name,
            city,
            terms,
            report,
            json,
        } => run_search(config, name, city, terms, report, json).await,
        Command::Ping => run_ping(config).await,
    }
}

fn init_tracing() -> Result<()> {
    // Progress bars own the terminal; logs go to stderr and stay quiet unless
    // RUST_LOG says otherwise.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run_search(
    config: ClientConfig,
    name: String,
    city: String,
    terms: String,
    want_report: bool,
    json: bool,
) -> Result<()> {
    let request = SearchRequest::new(name)
        .with_city(city)
        .with_extra_terms(terms);
    let session = SearchSession::connect(config)?;

    let handle = session.submit(request).await?;
    eprintln!("search accepted: {}", handle.search_id);

    match ui::watch_search(&session).await? {
        SearchState::Completed { record } => {
            ui::print_record(&record, json)?;
            if want_report {
                let report = session.generate_report().await?;
                eprintln!("report saved on the server at {}", report.report_path);
            }
            Ok(())
        }
        SearchState::Failed { message } => bail!("search failed: {message}"),
        SearchState::Idle | SearchState::Running { .. } => {
            bail!("search ended without a result")
        }
    }
}

async fn run_ping(config: ClientConfig) -> Result<()> {
    let api = HttpSearchApi::new(&config)?;
    let banner = api.ping().await?;
    println!("{banner}");
    Ok(())
}
