use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, warn};

use github_cloner::config::{FileConfig, RunConfiguration, Target, Transport, DEFAULT_API_URL};
use github_cloner::error::{ClonerError, Exit};
use github_cloner::logging::init_logging;
use github_cloner::cloner;

#[derive(Parser)]
#[command(name = "github-cloner")]
#[command(about = "Clone all repositories from a GitHub user or organization")]
#[command(version)]
#[command(group(ArgGroup::new("target").required(true).args(["organization", "user"])))]
#[command(after_help = "Examples:
  github-cloner -o myorg
  github-cloner -u username
  github-cloner -o myorg -p /path/to/repos --dry-run
  github-cloner -u username --exclude archived
  github-cloner -o myorg --url https://github.enterprise.com/api/v3")]
struct Cli {
    /// Base URL of the GitHub API [default: https://api.github.com]
    #[arg(long)]
    url: Option<String>,

    /// GitHub API token (can also use GITHUB_TOKEN env var)
    #[arg(short, long)]
    token: Option<String>,

    /// GitHub organization to clone repositories from
    #[arg(short, long)]
    organization: Option<String>,

    /// GitHub user to clone repositories from
    #[arg(short, long)]
    user: Option<String>,

    /// Destination path for cloned projects [default: current directory]
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Do not create root organization folder in path
    #[arg(long)]
    disable_root: bool,

    /// List the repositories without clone/fetch
    #[arg(short, long)]
    dry_run: bool,

    /// Pattern to exclude from repository names
    #[arg(short, long)]
    exclude: Option<String>,

    /// Clone method [default: https]
    #[arg(long, value_enum)]
    clone_method: Option<Transport>,

    /// Number of repositories to clone/fetch in parallel [default: 1]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Timeout for a single git operation in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let file_config = match FileConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, !cli.no_color);
            error!("{:#}", e);
            return Exit::ExecutionError.into();
        }
    };

    init_logging(cli.verbose, !cli.no_color && file_config.logging.color);

    let config = match build_config(cli, file_config) {
        Ok(config) => config,
        Err(e) => {
            error!("error: {}", e);
            return e.exit().into();
        }
    };

    match cloner::run(&config).await {
        Ok(_) => Exit::Success.into(),
        Err(e) => {
            error!("error: {}", e);
            e.exit().into()
        }
    }
}

/// Layer command-line flags over the defaults file
fn build_config(cli: Cli, file: FileConfig) -> Result<RunConfiguration, ClonerError> {
    let token = match cli.token.filter(|token| !token.is_empty()) {
        Some(token) => {
            warn!("warning: token provided via command line argument (prefer GITHUB_TOKEN)");
            token
        }
        None => std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or(ClonerError::MissingToken)?,
    };

    let target = match (cli.organization, cli.user) {
        (Some(org), _) => Target::Organization(org),
        (None, Some(user)) => Target::User(user),
        (None, None) => {
            return Err(ClonerError::Unexpected(anyhow::anyhow!(
                "one of --organization or --user is required"
            )))
        }
    };

    let timeout = match cli.timeout {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => file.timeout_duration(),
    };

    let base_path = match cli.path.or_else(|| file.path.map(PathBuf::from)) {
        Some(path) => path,
        None => std::env::current_dir().map_err(|e| ClonerError::Unexpected(e.into()))?,
    };

    Ok(RunConfiguration {
        api_url: cli
            .url
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        token,
        target,
        base_path,
        omit_root_segment: cli.disable_root || file.disable_root.unwrap_or(false),
        dry_run: cli.dry_run,
        exclude: cli.exclude.or(file.exclude),
        transport: cli.clone_method.or(file.clone_method).unwrap_or_default(),
        jobs: cli.jobs.or(file.jobs).unwrap_or(1).max(1),
        timeout,
    })
}
