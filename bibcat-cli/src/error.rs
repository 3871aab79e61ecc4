use colored::Colorize;
use std::fmt;
use std::process;

pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Rule compilation or execution failed.
    Rml(bibcat_rml::RmlError),
    /// Triplestore or HTTP failure.
    Remote(bibcat_remote::RemoteError),
    /// Harvest failed; partial progress is reported separately.
    Harvest(bibcat_harvest::HarvestError),
    /// Deduplication failed.
    Dedup(bibcat_dedup::DedupError),
    /// Configuration file issues.
    Config(String),
    /// Unreadable input or unwritable output.
    Io(String),
    /// Argument / usage errors.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = "error:".red().bold();
        match self {
            CliError::Rml(e) => write!(f, "{label} {e}"),
            CliError::Remote(e) => write!(f, "{label} {e}"),
            CliError::Harvest(e) => {
                write!(f, "{label} {e}")?;
                if let Some(partial) = e.partial() {
                    write!(
                        f,
                        "\n  {} {} identifiers were listed before the failure",
                        "note:".cyan().bold(),
                        partial.len()
                    )?;
                }
                Ok(())
            }
            CliError::Dedup(e) => write!(f, "{label} {e}"),
            CliError::Config(msg) => write!(f, "{label} {msg}"),
            CliError::Io(msg) => write!(f, "{label} {msg}"),
            CliError::Usage(msg) => write!(f, "{label} {msg}"),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bibcat_rml::RmlError> for CliError {
    fn from(e: bibcat_rml::RmlError) -> Self {
        CliError::Rml(e)
    }
}

impl From<bibcat_remote::RemoteError> for CliError {
    fn from(e: bibcat_remote::RemoteError) -> Self {
        CliError::Remote(e)
    }
}

impl From<bibcat_harvest::HarvestError> for CliError {
    fn from(e: bibcat_harvest::HarvestError) -> Self {
        CliError::Harvest(e)
    }
}

impl From<bibcat_dedup::DedupError> for CliError {
    fn from(e: bibcat_dedup::DedupError) -> Self {
        CliError::Dedup(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    let code = match &err {
        CliError::Usage(_) => EXIT_USAGE,
        _ => EXIT_ERROR,
    };
    process::exit(code)
}

pub type CliResult<T> = std::result::Result<T, CliError>;
