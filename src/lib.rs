//! Shared start-up for the `wsb-sentiment` and `wsb-distribution` binaries.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wsb_core::{CoreError, ErrorExt, ErrorReporter};

pub const DEFAULT_LOG_FILTER: &str = "wsb_sentiment=info,wsb_distribution=info,\
ticker_analysis=info,reddit_client=info,sentiment_engine=info,wsb_core=info";

/// Loads `.env` and installs the stderr log subscriber. `RUST_LOG` overrides the filter.
pub fn init() {
    // A missing .env is fine; the variables may already be exported.
    let _ = dotenv::dotenv();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The single optional positional argument; anything more is rejected.
pub fn positional_argument(
    mut args: impl Iterator<Item = String>,
) -> Result<Option<String>, CoreError> {
    let first = args.next();
    if let Some(extra) = args.next() {
        return Err(CoreError::InvalidInput {
            message: format!("unexpected argument '{}'", extra),
        });
    }
    Ok(first)
}

pub fn parse_limit(argument: Option<&str>, default: usize) -> Result<usize, CoreError> {
    match argument {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => Err(CoreError::InvalidInput {
                message: format!("limit must be a positive integer, got '{}'", raw),
            }),
        },
    }
}

/// Logs a failed run and maps it to the process exit status.
pub fn finish(result: Result<(), CoreError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ErrorReporter::new().report_error(&err);
            eprintln!("error: {}", err.user_friendly_message());
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_positional_argument() {
        assert_eq!(positional_argument(args(&[])).unwrap(), None);
        assert_eq!(positional_argument(args(&["25"])).unwrap(), Some("25".to_string()));
        assert!(positional_argument(args(&["25", "--verbose"])).is_err());
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, 100).unwrap(), 100);
        assert_eq!(parse_limit(Some("25"), 100).unwrap(), 25);
        for bad in ["0", "-3", "ten"] {
            let err = parse_limit(Some(bad), 100).unwrap_err();
            assert_eq!(err.exit_code(), 5);
        }
    }
}
