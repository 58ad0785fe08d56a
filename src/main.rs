use std::io::Read;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use tollgate_classify::{Classifier, Tally};
use tollgate_core::{ChangeSet, Classification, OutputFormat, TollgateConfig, TollgateError};
use tollgate_github::actions::{self, ActionsOutput};
use tollgate_github::client::{parse_repository, ChangedFileSource, GitHubClient, Repository};
use tollgate_github::event::EventPayload;

#[derive(Parser)]
#[command(
    name = "tollgate",
    version,
    about = "Decide from a pull request's changed files whether to release and whether to test",
    long_about = "Tollgate inspects the files changed by a pull request and publishes two\n\
                   step outputs for downstream workflow steps:\n\n  \
                     is_semantic_release_required  the metadata file and the version marker changed together\n  \
                     is_testing_required           source files changed without a full release-marker pair\n\n\
                   Examples:\n  \
                     tollgate check                      Classify the triggering pull request (GitHub Actions)\n  \
                     tollgate check --repo o/r --pr 12   Classify a pull request from anywhere\n  \
                     git diff --name-only main | tollgate classify --package fqr\n  \
                     tollgate init                       Write a default .tollgate.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .tollgate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for the report (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a pull request fetched from GitHub and publish step outputs
    #[command(long_about = "Classify a pull request fetched from GitHub and publish step outputs.\n\n\
        Fetches a single page of the pull request's changed files, classifies them, and\n\
        writes is_semantic_release_required / is_testing_required to GITHUB_OUTPUT\n\
        (stdout when unset). A full page of files fails the step.\n\n\
        Examples:\n  tollgate check\n  tollgate check --repo dan1hc/fqr --pr 42")]
    Check {
        /// Pull request number (default: from GITHUB_EVENT_PATH)
        #[arg(long)]
        pr: Option<u64>,
        /// Repository as owner/name (default: config, then GITHUB_REPOSITORY)
        #[arg(long)]
        repo: Option<Repository>,
        /// GitHub token (default: `token` input, then GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,
        /// GitHub API base URL (default: config, then GITHUB_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Classify newline-separated filenames read from a file or stdin
    #[command(long_about = "Classify newline-separated filenames read from a file or stdin.\n\n\
        Applies the same rules as `check` without contacting GitHub.\n\n\
        Examples:\n  git diff --name-only main | tollgate classify --package fqr\n  tollgate classify --file changed.txt --format json")]
    Classify {
        /// Read filenames from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Package whose __init__.py is the version marker
        #[arg(long)]
        package: Option<String>,
        /// Also publish step outputs like `check` does
        #[arg(long)]
        write_outputs: bool,
    },
    /// Create a default .tollgate.toml in the current directory
    Init,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# Tollgate Configuration

[github]
# owner = "dan1hc"
# repo = "fqr"
# api_url = "https://api.github.com"
# page_size = 100

[classify]
# metadata_file = "pyproject.toml"
# package = "fqr"                        # version marker: fqr/__init__.py
# version_file = "src/fqr/__init__.py"   # overrides package
# source_suffix = ".py"
"#;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("TOLLGATE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loaded = match &cli.config {
        Some(path) => TollgateConfig::from_file(path),
        None => TollgateConfig::discover(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            if matches!(cli.command, Command::Check { .. }) {
                actions::set_failed(&e.to_string());
            }
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Check {
            pr,
            repo,
            token,
            api_url,
        } => {
            let request = CheckRequest {
                pr,
                repo,
                token,
                api_url,
            };
            let (repository, pr_number, files, tally, result) =
                match run_check(&config, request).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        actions::set_failed(&e.to_string());
                        return Err(e.into());
                    }
                };
            print_report(
                cli.format,
                Some((&repository, pr_number)),
                &files,
                &tally,
                &result,
            )?;
        }
        Command::Classify {
            ref file,
            ref package,
            write_outputs,
        } => {
            let input = read_input(file)?;
            let files = ChangeSet::from_lines(&input);
            let outcome = classify_offline(&config, package.as_deref(), &files);
            let (tally, result) = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    if write_outputs {
                        actions::set_failed(&e.to_string());
                    }
                    return Err(e.into());
                }
            };
            if write_outputs {
                ActionsOutput::from_env().set_outputs(&result.outputs())?;
            }
            print_report(cli.format, None, &files, &tally, &result)?;
        }
        Command::Init => {
            let path = std::path::Path::new(".tollgate.toml");
            if path.exists() {
                miette::bail!(".tollgate.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .tollgate.toml with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tollgate", &mut std::io::stdout());
        }
    }

    Ok(())
}

struct CheckRequest {
    pr: Option<u64>,
    repo: Option<Repository>,
    token: Option<String>,
    api_url: Option<String>,
}

type CheckOutcome = (Repository, u64, ChangeSet, Tally, Classification);

/// Resolve inputs, fetch one page of files, classify, and publish outputs.
///
/// Outputs are written only after classification succeeds, so a failed run
/// publishes nothing.
async fn run_check(
    config: &TollgateConfig,
    request: CheckRequest,
) -> std::result::Result<CheckOutcome, TollgateError> {
    let event = match EventPayload::from_env() {
        Ok(event) => Some(event),
        // GITHUB_EVENT_PATH unset: running outside Actions
        Err(TollgateError::Config(_)) => None,
        Err(e) => return Err(e),
    };

    let repository = resolve_repository(config, request.repo, event.as_ref())?;
    let pr_number = match request.pr {
        Some(n) => n,
        None => event
            .as_ref()
            .ok_or_else(|| {
                TollgateError::Config(
                    "no pull request number; pass --pr or run from a pull_request workflow".into(),
                )
            })?
            .pull_request_number()?,
    };
    let token = request.token.or_else(|| actions::get_input("token"));
    let api_url = request
        .api_url
        .or_else(|| config.github.api_url.clone())
        .or_else(|| std::env::var("GITHUB_API_URL").ok());
    let page_size = config.github.page_size;

    tracing::info!(repository = %repository, pr = pr_number, "checking pull request");

    let classifier = Classifier::from_config(&config.classify, page_size, Some(&repository.name))?;
    let client = GitHubClient::new(
        token.as_deref(),
        api_url.as_deref(),
        repository.clone(),
        page_size,
    )?;

    let (files, tally, result) = classify_pull_request(&client, &classifier, pr_number).await?;
    ActionsOutput::from_env().set_outputs(&result.outputs())?;

    Ok((repository, pr_number, files, tally, result))
}

async fn classify_pull_request(
    source: &dyn ChangedFileSource,
    classifier: &Classifier,
    pr_number: u64,
) -> std::result::Result<(ChangeSet, Tally, Classification), TollgateError> {
    let files = source.fetch_changed_files(pr_number).await?;
    let (tally, result) = classifier.classify_detailed(&files)?;
    Ok((files, tally, result))
}

fn resolve_repository(
    config: &TollgateConfig,
    flag: Option<Repository>,
    event: Option<&EventPayload>,
) -> std::result::Result<Repository, TollgateError> {
    if let Some(repo) = flag {
        return Ok(repo);
    }
    if let (Some(owner), Some(name)) = (&config.github.owner, &config.github.repo) {
        return Ok(Repository::new(owner.clone(), name.clone()));
    }
    if let Ok(full_name) = std::env::var("GITHUB_REPOSITORY") {
        return parse_repository(&full_name);
    }
    if let Some(repo) = event.map(EventPayload::repository).transpose()?.flatten() {
        return Ok(repo);
    }
    Err(TollgateError::Config(
        "no repository; pass --repo, set [github] owner/repo, or set GITHUB_REPOSITORY".into(),
    ))
}

fn classify_offline(
    config: &TollgateConfig,
    package: Option<&str>,
    files: &ChangeSet,
) -> std::result::Result<(Tally, Classification), TollgateError> {
    let mut classify = config.classify.clone();
    if let Some(pkg) = package {
        classify.package = Some(pkg.to_string());
    }
    let repo_name = config.github.repo.clone().or_else(|| {
        std::env::var("GITHUB_REPOSITORY")
            .ok()
            .and_then(|full| parse_repository(&full).ok())
            .map(|r| r.name)
    });
    let classifier = Classifier::from_config(&classify, config.github.page_size, repo_name.as_deref())?;
    classifier.classify_detailed(files)
}

fn read_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).into_diagnostic(),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .into_diagnostic()?;
            Ok(buf)
        }
    }
}

fn print_report(
    format: OutputFormat,
    pull_request: Option<(&Repository, u64)>,
    files: &ChangeSet,
    tally: &Tally,
    result: &Classification,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "repository": pull_request.map(|(repo, _)| repo.to_string()),
                "pullRequest": pull_request.map(|(_, n)| n),
                "filesChanged": files.len(),
                "files": files,
                "tally": tally,
                "result": result,
            });
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Text => {
            if let Some((repo, number)) = pull_request {
                println!("{repo}#{number}");
            }
            println!(
                "{} files changed, {} release markers, source changed: {}",
                files.len(),
                tally.release_markers,
                tally.source_changed
            );
            print!("{result}");
        }
    }
    Ok(())
}
