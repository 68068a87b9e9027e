use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use jtester::analyzer::{analyze, BuildOutcome};
use jtester::config;
use jtester::executor::MavenRunner;
use jtester::llm::client::{LlmClient, Provider};
use jtester::logger::{self, log, LogLevel};
use jtester::machine::RunOutcome;
use jtester::orchestrator::{Collaborators, Orchestrator};
use jtester::scaffold::init_project;
use jtester::scanner::{render_context, DependencyScanner};
use jtester::source::load_java_file;
use jtester::testgen::FsSourceStore;

const EXIT_FAILED: i32 = 1;
const EXIT_UNRELATED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "jtester",
    version,
    about = "Generates JUnit tests for a Java class and repairs them until Maven passes."
)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Generate and repair a test for one source file
    Run(RunArgs),
    /// Classify a saved Maven log against a target test class
    Analyze(AnalyzeArgs),
    /// Create a minimal Maven project layout
    Init(InitArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[arg(help = "Java source file to cover")]
    file: PathBuf,

    #[arg(long, help = "Model name (overrides config)")]
    model: Option<String>,

    #[arg(long, value_enum, help = "LLM provider (overrides config)")]
    provider: Option<Provider>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum attempts (overrides config)"
    )]
    retries: Option<u32>,

    #[arg(long, default_value = ".", help = "Maven project root")]
    project_root: PathBuf,

    #[arg(long, help = "Write a JSON run report to this path")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    #[arg(help = "Captured Maven output")]
    log: PathBuf,

    #[arg(long, help = "Test class the log should be judged against, e.g. FooTest")]
    target: String,

    #[arg(long, default_value_t = false, help = "Print the classification as JSON")]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct InitArgs {
    #[arg(long, default_value = ".", help = "Directory to scaffold")]
    project_root: PathBuf,

    #[arg(long, default_value_t = false, help = "Overwrite an existing pom.xml")]
    force: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let code = match cli.command {
        CliCommand::Run(args) => run(args)?,
        CliCommand::Analyze(args) => analyze_log(args)?,
        CliCommand::Init(args) => {
            init_project(&args.project_root, args.force)?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn run(args: RunArgs) -> Result<i32, Box<dyn Error>> {
    let mut cfg = config::load();
    if let Some(model) = args.model {
        cfg.llm.model = model;
    }
    if let Some(provider) = args.provider {
        cfg.llm.provider = provider;
    }
    let max_attempts = args.retries.unwrap_or(cfg.run.max_retries);

    let unit = load_java_file(&args.file)?;
    log(
        LogLevel::Info,
        format!("🚀 Starting agent for: {} ({})", unit.class_name, unit.package),
    );

    let scanner = DependencyScanner::new(&args.project_root);
    let entries = scanner.entries(&unit.text, &unit.package);
    let context = render_context(&entries);
    if entries.is_empty() {
        log(LogLevel::Info, "No local dependencies resolved.");
    }

    let oracle = LlmClient::new(cfg.llm)?;
    let runner = MavenRunner::new(&args.project_root, cfg.run.maven_command);
    let store = FsSourceStore::new(&args.project_root);

    let (outcome, report) = Orchestrator::new(
        &unit,
        context,
        Collaborators {
            oracle: &oracle,
            runner: &runner,
            store: &store,
        },
        max_attempts,
    )
    .with_context_types(entries.into_iter().map(|e| e.type_name).collect())
    .run()?;

    if let Some(path) = args.report {
        report.write(&path)?;
        log(LogLevel::Info, format!("Report written to {}", path.display()));
    }

    Ok(match outcome {
        RunOutcome::Succeeded { .. } => 0,
        RunOutcome::AbortedUnrelated { .. } => EXIT_UNRELATED,
        RunOutcome::Exhausted { .. } => EXIT_FAILED,
    })
}

fn analyze_log(args: AnalyzeArgs) -> Result<i32, Box<dyn Error>> {
    let text = fs::read_to_string(&args.log)?;
    let outcome = analyze(&text, &args.target);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(if outcome.succeeded {
        0
    } else if outcome.has_unrelated_breakage() {
        EXIT_UNRELATED
    } else {
        EXIT_FAILED
    })
}

fn print_outcome(outcome: &BuildOutcome) {
    if outcome.succeeded {
        println!("BUILD SUCCESS");
        return;
    }

    if !outcome.relevant.is_empty() {
        println!("Relevant errors:");
        println!("{}", outcome.relevant_text());
    }

    if outcome.has_unrelated_breakage() {
        println!("Unrelated files:");
        for f in &outcome.unrelated_files {
            println!("   > {f}");
        }
    }
}
