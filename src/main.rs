use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn, Instrument};

use tabkit::app::export_use_case::ExportViewUseCase;
use tabkit::app::load_use_case::LoadDatasetUseCase;
use tabkit::app::ports::PayloadSourcePort;
use tabkit::config::{Config, DEFAULT_CONFIG_PATH};
use tabkit::console::{self, BrowseCommand, BROWSE_HELP};
use tabkit::constants::EPISODES_PROFILE;
use tabkit::infra::{FileExportSink, FilePayloadSource, StdinPayloadSource, StdoutExportSink};
use tabkit::observability;
use tabkit::pipeline::debounce::Debouncer;
use tabkit::pipeline::Session;

#[derive(Parser)]
#[command(name = "tabkit")]
#[command(about = "Normalize, validate, filter, sort and export ranked JSON tables")]
#[command(version)]
struct Cli {
    /// Config file (missing file means defaults)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LoadArgs {
    /// JSON payload to read; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Dataset profile
    #[arg(short, long, default_value = EPISODES_PROFILE)]
    profile: String,
}

#[derive(Args)]
struct ViewArgs {
    /// Case-insensitive free-text search
    #[arg(short, long)]
    query: Option<String>,

    /// Category filter, repeatable
    #[arg(long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,

    /// Sort key, repeatable; the first is primary
    #[arg(long = "sort", value_name = "FIELD[:asc|desc]")]
    sorts: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filtered, sorted view as a table
    View {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        view: ViewArgs,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Report integrity warnings; exits non-zero when there are any
    Validate {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Write the filtered, sorted view as CSV
    Export {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        view: ViewArgs,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the available dataset profiles
    Profiles,
    /// Interactive search over a dataset, one command per line
    Browse {
        #[command(flatten)]
        load: LoadArgs,
    },
}

async fn load_session(config: &Config, load: &LoadArgs) -> anyhow::Result<Session> {
    let registry = config.build_registry()?;
    let normalizer = registry.get_normalizer(&load.profile)?;
    let source: Box<dyn PayloadSourcePort> = match &load.input {
        Some(path) => Box::new(FilePayloadSource::new(path)),
        None => Box::new(StdinPayloadSource),
    };
    LoadDatasetUseCase::new(source, normalizer, config.pipeline.validator())
        .execute()
        .await
}

fn print_view(session: &Session, limit: Option<usize>) {
    let view = session.view();
    println!("{}", console::render_table(session.schema(), &view, limit));
    println!("📊 {} of {} records", view.len(), session.records().len());
}

async fn browse(config: &Config, mut session: Session) -> anyhow::Result<()> {
    let (mut debouncer, mut settled) = Debouncer::new(config.pipeline.debounce_window());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<String> = None;

    println!("{}", BROWSE_HELP);
    print_view(&session, Some(20));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // EOF: apply whatever is still pending, then stop
                    if let Some(query) = pending.take() {
                        debouncer.cancel();
                        session.set_query(&query);
                        print_view(&session, Some(20));
                    }
                    break;
                };
                match BrowseCommand::parse(&line) {
                    Ok(BrowseCommand::Query(text)) => {
                        pending = Some(text.clone());
                        debouncer.push(text);
                    }
                    Ok(BrowseCommand::Quit) => break,
                    Ok(BrowseCommand::Help) => println!("{}", BROWSE_HELP),
                    Ok(BrowseCommand::Warnings) => {
                        print!("{}", console::render_warnings(session.warnings()));
                    }
                    Ok(BrowseCommand::Reset) => {
                        pending = None;
                        debouncer.cancel();
                        session.reset();
                        print_view(&session, Some(20));
                    }
                    Ok(BrowseCommand::Sort { field, mode }) => match session.toggle_sort(&field, mode) {
                        Ok(()) => print_view(&session, Some(20)),
                        Err(e) => println!("⚠️  {}", e),
                    },
                    Ok(BrowseCommand::Filter { field, value }) => match session.set_category(&field, &value) {
                        Ok(()) => print_view(&session, Some(20)),
                        Err(e) => println!("⚠️  {}", e),
                    },
                    Ok(BrowseCommand::Export(path)) => {
                        println!("{}", console::browse_export(&session, &path).await);
                    }
                    Err(e) => println!("⚠️  {}", e),
                }
            }
            Some(query) = settled.recv() => {
                pending = None;
                session.set_query(&query);
                print_view(&session, Some(20));
            }
        }
    }
    Ok(())
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<bool> {
    match cli.command {
        Commands::View { load, view, limit } => {
            let mut session = load_session(&config, &load)
                .instrument(tracing::info_span!("view", profile = %load.profile))
                .await?;
            console::apply_view_args(&mut session, view.query.as_deref(), &view.filters, &view.sorts)?;
            print_view(&session, limit);
            if !session.warnings().is_empty() {
                println!("⚠️  {} warnings (run `tabkit validate` for details)", session.warnings().len());
            }
        }
        Commands::Validate { load } => {
            let session = load_session(&config, &load).await?;
            let warnings = session.warnings();
            if warnings.is_empty() {
                println!("✅ {} records, no warnings", session.records().len());
            } else {
                println!("⚠️  {} records, {} warnings:", session.records().len(), warnings.len());
                print!("{}", console::render_warnings(warnings));
                return Ok(false);
            }
        }
        Commands::Export { load, view, output } => {
            let mut session = load_session(&config, &load).await?;
            console::apply_view_args(&mut session, view.query.as_deref(), &view.filters, &view.sorts)?;
            let use_case = match &output {
                Some(path) => ExportViewUseCase::new(Box::new(FileExportSink::new(path))),
                None => ExportViewUseCase::new(Box::new(StdoutExportSink)),
            };
            let rows = use_case.execute(&session).await?;
            if let Some(path) = output {
                println!("✅ Wrote {} rows to {}", rows, path.display());
            }
        }
        Commands::Profiles => {
            let registry = config.build_registry()?;
            println!("📋 Available profiles:");
            for name in registry.list_profiles() {
                let schema = registry.get_schema(name)?;
                let labels = schema.labels().join(", ");
                println!("   {} ({})", name, labels);
            }
        }
        Commands::Browse { load } => {
            if load.input.is_none() {
                anyhow::bail!("browse reads commands from stdin; pass --input for the dataset");
            }
            let session = load_session(&config, &load).await?;
            browse(&config, session).await?;
        }
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    observability::init_logging(&config.logging);

    let show_metrics = cli.metrics;
    if show_metrics {
        if let Err(e) = observability::init() {
            warn!("metrics disabled: {}", e);
        }
    }

    let outcome = run(cli, config).await;

    if show_metrics {
        if let Some(text) = observability::render() {
            eprintln!("{}", text);
        }
    }

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => {
            info!("finished with warnings");
            std::process::exit(2);
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}
