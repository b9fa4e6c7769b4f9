use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public GitHub API endpoint; anything else is treated as GitHub Enterprise
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Whether `api_url` addresses anything but the public GitHub API
pub fn is_enterprise_url(api_url: &str) -> bool {
    api_url.trim_end_matches('/') != DEFAULT_API_URL
}

/// URL family used to address a remote repository when cloning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// https://github.com/owner/repo.git
    #[default]
    Https,
    /// git@github.com:owner/repo.git
    Ssh,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Https => write!(f, "https"),
            Transport::Ssh => write!(f, "ssh"),
        }
    }
}

/// The account whose repositories are mirrored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Organization(String),
    User(String),
}

impl Target {
    /// Name as supplied on the command line
    pub fn name(&self) -> &str {
        match self {
            Target::Organization(name) | Target::User(name) => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Target::Organization(_) => "organization",
            Target::User(_) => "user",
        }
    }

    pub fn kind_title(&self) -> &'static str {
        match self {
            Target::Organization(_) => "Organization",
            Target::User(_) => "User",
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Target::User(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.kind())
    }
}

/// Immutable settings for a single run
///
/// Built once at startup from command-line flags layered over the optional
/// defaults file, then only ever borrowed.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Base URL of the GitHub API
    pub api_url: String,

    /// Bearer token used for every API call
    pub token: String,

    pub target: Target,

    /// Destination directory every repository path is resolved under
    pub base_path: PathBuf,

    /// Drop the target-name segment from resolved paths
    pub omit_root_segment: bool,

    /// Enumerate only, never clone or fetch
    pub dry_run: bool,

    /// Literal substring; repositories whose name contains it are skipped
    pub exclude: Option<String>,

    pub transport: Transport,

    /// Maximum concurrent clone/fetch operations (1 = strictly sequential)
    pub jobs: usize,

    /// Deadline for a single git operation
    pub timeout: Option<Duration>,
}

impl RunConfiguration {
    /// Whether the API endpoint is something other than public GitHub
    pub fn is_enterprise(&self) -> bool {
        is_enterprise_url(&self.api_url)
    }
}

/// Optional YAML defaults file
///
/// Every key is optional; command-line flags always take precedence.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FileConfig {
    /// Base URL of the GitHub API
    pub url: Option<String>,

    /// Destination base path (supports `~` and `$VARS`)
    pub path: Option<String>,

    /// Clone method
    pub clone_method: Option<Transport>,

    /// Exclusion substring
    pub exclude: Option<String>,

    /// Omit the target-name segment
    pub disable_root: Option<bool>,

    /// Maximum parallel clone/fetch operations
    pub jobs: Option<usize>,

    /// Timeout for git operations in seconds
    pub timeout: Option<u64>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            color: default_true(),
        }
    }
}

impl FileConfig {
    /// Load the file at `path`, or the default location when `path` is `None`
    ///
    /// A missing default file yields the empty configuration; an explicitly
    /// requested file must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_config_path() {
                Some(default_path) if default_path.exists() => Self::load(&default_path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: FileConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_paths()?;

        Ok(config)
    }

    /// Default configuration file path (XDG compliant)
    pub fn default_config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("github-cloner").join("config.yml"))
    }

    /// Expand `~` and environment variables in configured paths
    pub fn expand_paths(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            let expanded = shellexpand::full(path)
                .context("Failed to expand path")?
                .into_owned();
            self.path = Some(expanded);
        }

        Ok(())
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.filter(|secs| *secs > 0).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_target_accessors() {
        let org = Target::Organization("Acme".to_string());
        assert_eq!(org.name(), "Acme");
        assert_eq!(org.kind(), "organization");
        assert_eq!(org.kind_title(), "Organization");
        assert!(!org.is_user());
        assert_eq!(org.to_string(), "Acme (organization)");

        let user = Target::User("octocat".to_string());
        assert!(user.is_user());
        assert_eq!(user.kind_title(), "User");
    }

    #[test]
    fn test_transport_default_is_https() {
        assert_eq!(Transport::default(), Transport::Https);
        assert_eq!(Transport::Ssh.to_string(), "ssh");
    }

    #[test]
    fn test_enterprise_detection() {
        let mut config = RunConfiguration {
            api_url: DEFAULT_API_URL.to_string(),
            token: "t".to_string(),
            target: Target::User("u".to_string()),
            base_path: PathBuf::from("."),
            omit_root_segment: false,
            dry_run: false,
            exclude: None,
            transport: Transport::Https,
            jobs: 1,
            timeout: None,
        };
        assert!(!config.is_enterprise());

        config.api_url = "https://api.github.com/".to_string();
        assert!(!config.is_enterprise());

        config.api_url = "https://github.example.com/api/v3".to_string();
        assert!(config.is_enterprise());
        assert!(is_enterprise_url("https://github.example.com/api/v3"));
        assert!(!is_enterprise_url("https://api.github.com/"));
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml_content = r#"
url: "https://github.example.com/api/v3"
path: "/srv/mirrors"
clone_method: ssh
exclude: "-archived"
disable_root: true
jobs: 4
timeout: 600
logging:
  color: false
"#;

        let config: FileConfig = serde_yaml::from_str(yaml_content).expect("Failed to parse YAML");

        assert_eq!(config.url.as_deref(), Some("https://github.example.com/api/v3"));
        assert_eq!(config.path.as_deref(), Some("/srv/mirrors"));
        assert_eq!(config.clone_method, Some(Transport::Ssh));
        assert_eq!(config.exclude.as_deref(), Some("-archived"));
        assert_eq!(config.disable_root, Some(true));
        assert_eq!(config.jobs, Some(4));
        assert_eq!(config.timeout_duration(), Some(Duration::from_secs(600)));
        assert!(!config.logging.color);
    }

    #[test]
    fn test_empty_yaml_is_all_defaults() {
        let config: FileConfig = serde_yaml::from_str("{}").expect("Failed to parse YAML");
        assert_eq!(config, FileConfig::default());
        assert!(config.logging.color);
        assert!(config.timeout_duration().is_none());
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = FileConfig {
            timeout: Some(0),
            ..Default::default()
        };
        assert!(config.timeout_duration().is_none());
    }

    #[test]
    fn test_invalid_clone_method_rejected() {
        let result: Result<FileConfig, _> = serde_yaml::from_str("clone_method: ftp");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let nonexistent_path = Path::new("/nonexistent/path/config.yml");
        assert!(FileConfig::load(nonexistent_path).is_err());
        assert!(FileConfig::load_or_default(Some(nonexistent_path)).is_err());
    }

    #[test]
    #[serial]
    fn test_load_expands_path() {
        env::set_var("TEST_GITHUB_CLONER_HOME", "/test/home");

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.yml");
        std::fs::write(&config_path, "path: \"${TEST_GITHUB_CLONER_HOME}/mirrors\"\n")
            .expect("Failed to write config");

        let config = FileConfig::load(&config_path).expect("Failed to load config");
        assert_eq!(config.path.as_deref(), Some("/test/home/mirrors"));

        env::remove_var("TEST_GITHUB_CLONER_HOME");
    }

    #[test]
    fn test_default_path_is_namespaced() {
        if let Some(default_path) = FileConfig::default_config_path() {
            assert!(default_path.to_string_lossy().contains("github-cloner"));
            assert!(default_path.to_string_lossy().ends_with("config.yml"));
        }
    }
}
