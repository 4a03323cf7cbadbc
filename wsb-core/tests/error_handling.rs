use wsb_core::{
    ConfigError, CoreError, ErrorExt, ErrorReporter, ExportError, RedditApiError, RunWarning,
    SentimentError,
};

#[test]
fn test_error_codes() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    assert_eq!(reddit_error.error_code(), "REDDIT_API");

    let export_error = CoreError::Export(ExportError::DirectoryNotWritable {
        path: "/readonly".to_string(),
    });
    assert_eq!(export_error.error_code(), "EXPORT");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_SECRET".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let label_error = CoreError::Sentiment(SentimentError::InvalidLabel {
        row: 3,
        value: "maybe".to_string(),
    });
    assert_eq!(label_error.error_code(), "SENTIMENT");
}

#[test]
fn test_fetch_and_io_failures_exit_non_zero() {
    let fetch = CoreError::RedditApi(RedditApiError::AuthenticationFailed {
        reason: "invalid_grant".to_string(),
    });
    let io = CoreError::Export(ExportError::DirectoryNotWritable {
        path: "/readonly".to_string(),
    });
    assert_eq!(fetch.exit_code(), 2);
    assert_eq!(io.exit_code(), 3);
    assert_ne!(fetch.exit_code(), io.exit_code());

    let internal = CoreError::Internal {
        message: "bad pattern".to_string(),
    };
    assert_ne!(internal.exit_code(), 0);
}

#[test]
fn test_from_conversions() {
    let err: CoreError = RedditApiError::ServerError { status_code: 503 }.into();
    assert!(matches!(
        err,
        CoreError::RedditApi(RedditApiError::ServerError { status_code: 503 })
    ));

    let io: CoreError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
    assert_eq!(io.error_code(), "IO");
    assert_eq!(io.exit_code(), 3);
}

#[test]
fn test_user_friendly_messages() {
    let reddit_error = CoreError::RedditApi(RedditApiError::InvalidToken);
    let message = reddit_error.user_friendly_message();
    assert!(message.contains("authentication token is invalid"));

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "REDDIT_CLIENT_ID".to_string(),
    });
    let message = config_error.user_friendly_message();
    assert!(message.contains("REDDIT_CLIENT_ID"));

    let export_error = CoreError::Export(ExportError::DirectoryNotWritable {
        path: "/readonly".to_string(),
    });
    assert!(export_error.user_friendly_message().contains("/readonly"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new();
    let error = CoreError::RedditApi(RedditApiError::InvalidToken);

    // This test just ensures the methods don't panic
    reporter.report_error(&error);
    reporter.report_warning(&RunWarning::EmptyResult { posts: 0 });
}
