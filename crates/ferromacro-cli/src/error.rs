use ferromacro_core::{ConfigError, CoreError, LoadError, ValidationError};
use ferromacro_report::ReportError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid argument: {0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Config(error) => Self::Config(error),
            CoreError::Load(error) => Self::Load(error),
            CoreError::Serialization(error) => Self::Serialization(error),
            CoreError::Io(error) => Self::Io(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Usage(_) => 2,
            Self::Load(_) => 3,
            Self::Report(ReportError::Write { .. }) => 10,
            Self::Report(_) => 3,
            Self::Serialization(_) => 4,
            Self::Config(_) => 7,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferromacro_core::{SourceError, DateWindow};

    #[test]
    fn exit_codes_follow_categories() {
        let validation = DateWindow::parse("2024-02-01", "2024-01-01").expect_err("inverted");
        assert_eq!(CliError::from(validation).exit_code(), 2);
        assert_eq!(CliError::Usage(String::from("bad")).exit_code(), 2);

        let load = LoadError::Source {
            entry: String::from("SPY"),
            source: SourceError::unavailable("down"),
        };
        assert_eq!(CliError::from(load).exit_code(), 3);
        assert_eq!(CliError::from(ReportError::EmptyTable).exit_code(), 3);
        assert_eq!(CliError::from(ConfigError::MissingFredApiKey).exit_code(), 7);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(CliError::from(io).exit_code(), 10);
    }

    #[test]
    fn core_errors_keep_their_category() {
        let parse = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(CliError::from(CoreError::from(parse)).exit_code(), 4);
        assert_eq!(
            CliError::from(CoreError::from(ConfigError::MissingFredApiKey)).exit_code(),
            7
        );
    }

    #[test]
    fn load_error_message_names_the_entry() {
        let load = LoadError::Source {
            entry: String::from("Fed_Total_Assets"),
            source: SourceError::unauthorized("fred rejected the API key"),
        };
        assert!(CliError::from(load).to_string().contains("Fed_Total_Assets"));
    }
}
