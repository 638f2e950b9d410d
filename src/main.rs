// query-intent - label search query intent and the entities behind your keywords
//
// Entry point. Parses CLI args, sets up logging and dispatches to handlers.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use query_intent_lib::{
    config::{parse_keyword_list, AnalysisConfig},
    data::QueryReader,
    intelligence::{AnalysisReport, Analyzer, EnrichmentStatus, IntentClassifier},
    report::{save_intent_table, save_keyword_table, ReportAssembler},
    QueryIntentError,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "query-intent", version, about = "Search Console query intent, keyword and entity analysis")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify intent, count keywords and look up entities
    Analyze(AnalyzeArgs),
    /// Rank noun/verb keywords without any lookups
    Keywords(KeywordArgs),
    /// Show which intent a few queries would get
    Intent(IntentArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Search Console query export (CSV)
    input: PathBuf,

    /// Custom intent words, comma separated (brand variations etc.)
    #[arg(long)]
    custom: Option<String>,

    /// Google Knowledge Graph API key; leave unset to skip entities
    #[arg(long, env = "KG_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON config file (default: ~/.query-intent/config.json if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write query-intent.csv and freq-entity.csv here
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// How many keywords to rank and look up
    #[arg(long)]
    top: Option<usize>,

    /// Lookups in flight at once (1 = strictly sequential)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Lookups per second
    #[arg(long)]
    rate: Option<f64>,

    /// Per-lookup timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print a JSON document instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct KeywordArgs {
    /// Search Console query export (CSV)
    input: PathBuf,

    /// How many keywords to rank
    #[arg(long)]
    top: Option<usize>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct IntentArgs {
    /// Query texts, one per argument
    #[arg(required = true)]
    queries: Vec<String>,

    /// Custom intent words, comma separated
    #[arg(long)]
    custom: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

// Exit status for unreadable or malformed input files
const EXIT_INPUT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let outcome = match cli.command {
        Command::Analyze(args) => handle_analyze(args).await,
        Command::Keywords(args) => handle_keywords(args),
        Command::Intent(args) => handle_intent(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // show the friendly message for our own errors
            match e.downcast_ref::<QueryIntentError>() {
                Some(err) if err.is_input_error() => {
                    eprintln!("Error: {}", err.user_message());
                    eprintln!("Check that the file is a Search Console queries export.");
                    ExitCode::from(EXIT_INPUT_ERROR)
                }
                Some(err) => {
                    eprintln!("Error: {}", err.user_message());
                    ExitCode::FAILURE
                }
                None => {
                    eprintln!("Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

// Logs go to stderr so the report on stdout stays clean
fn init_logging(verbose: bool) {
    let default = if verbose {
        "query_intent=debug,query_intent_lib=debug"
    } else {
        "query_intent=info,query_intent_lib=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    AnalysisConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to load default config".to_string(),
    })
}

async fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    // CLI flags win over the file
    if let Some(custom) = &args.custom {
        config.custom_keywords = parse_keyword_list(custom);
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key.clone();
    }
    if let Some(top) = args.top {
        config.top_keywords = top;
    }
    if let Some(concurrency) = args.concurrency {
        config.enrichment.max_concurrent_lookups = concurrency;
    }
    if let Some(rate) = args.rate {
        config.enrichment.requests_per_second = rate;
    }
    if let Some(timeout) = args.timeout {
        config.enrichment.timeout_secs = timeout;
    }

    let analyzer = Analyzer::new(&config)?;
    let records = QueryReader::new(config.columns.clone())
        .read_path(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if config.enrichment_key().is_some() && !args.json {
        println!("Working on entities...");
    }

    let report = analyzer.analyze(&records).await?;

    if let Some(dir) = &args.out_dir {
        save_intent_table(&report.intent, dir)?;
        if let Some(table) = report.keyword_table() {
            save_keyword_table(table, dir)?;
        }
    }

    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    Ok(())
}

fn handle_keywords(args: KeywordArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(top) = args.top {
        config.top_keywords = top;
    }
    // no lookups here, whatever the config says
    config.api_key = None;

    let analyzer = Analyzer::new(&config)?;
    let records = QueryReader::new(config.columns.clone())
        .read_path(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let frequency = analyzer.keywords(&records)?;

    println!("\nQuery Keyword Frequency");
    println!("{}", "=".repeat(60));
    println!("Total Tokens: {}", frequency.total_tokens);
    for (i, stat) in frequency.keywords.iter().enumerate() {
        println!(
            "{:3}. {:<30} {:>5} | {:.1}%",
            i + 1,
            stat.keyword,
            stat.count,
            stat.percent
        );
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

fn handle_intent(args: IntentArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(custom) = &args.custom {
        config.custom_keywords = parse_keyword_list(custom);
    }
    config.validate()?;

    let classifier =
        IntentClassifier::new(&config.custom_keywords)?.with_precedence(config.precedence.clone());

    for query in &args.queries {
        println!("{:<40} {}", query, classifier.category_of(query));
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    let intent = &report.intent;

    println!("\nQuery Intent Table");
    println!("{}", "=".repeat(60));
    println!("Total Queries: {}", intent.total_queries);
    for stat in &intent.categories {
        println!("{}", ReportAssembler::category_line(stat));
    }
    println!("{}", "-".repeat(60));
    for row in &intent.rows {
        println!(
            "{:<40} {:>6} {:>8}  {:<14} {:>6.1}% {:>5.1}",
            row.query, row.clicks, row.impressions, row.intent, row.ctr, row.position
        );
    }
    println!("{}", "=".repeat(60));

    match &report.enrichment {
        EnrichmentStatus::Disabled => {}
        EnrichmentStatus::NoKeywords { corpus_tokens } => {
            println!("\nNo nouns or verbs found among {} words.", corpus_tokens);
            println!("Total Tokens: 0");
        }
        EnrichmentStatus::Failed(e) => {
            eprintln!("\nEntity lookup skipped: {}", e.user_message());
        }
        EnrichmentStatus::Completed(table) => {
            println!("\nQuery Keyword Frequency and Entities");
            println!("{}", "=".repeat(60));
            println!("Total Entities: {}", table.total_entities);
            for stat in &table.top_labels {
                println!("{}", ReportAssembler::label_line(stat));
            }
            println!("{}", "-".repeat(60));
            for row in &table.rows {
                println!(
                    "{:<30} {:>5} {:>6.1}%  {}",
                    row.keyword, row.count, row.percent, row.entity_labels
                );
            }
            println!("{}", "=".repeat(60));
        }
    }
}

fn print_json(report: &AnalysisReport) -> anyhow::Result<()> {
    let enrichment = match &report.enrichment {
        EnrichmentStatus::Disabled => json!({ "status": "disabled" }),
        EnrichmentStatus::NoKeywords { corpus_tokens } => {
            json!({ "status": "no_keywords", "corpus_tokens": corpus_tokens, "total_tokens": 0 })
        }
        EnrichmentStatus::Failed(e) => json!({ "status": "failed", "error": e.to_string() }),
        EnrichmentStatus::Completed(table) => json!({ "status": "completed", "table": table }),
    };

    let document = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "intent": report.intent,
        "enrichment": enrichment,
    });

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
