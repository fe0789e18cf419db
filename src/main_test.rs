use super::*;

use agri_chat::config::{API_TIMEOUT_VAR, DEFAULT_API_TIMEOUT_MS};

#[test]
fn garbage_timeout_env_does_not_abort_parsing() {
    // Only test in this binary that touches the environment.
    unsafe { std::env::set_var(API_TIMEOUT_VAR, "abc") };

    let cli = Cli::try_parse_from(["agri-chat", "examples"]).unwrap();
    assert_eq!(cli.timeout_ms, None);
    assert!(matches!(cli.command, Some(Command::Examples)));

    let config = ClientConfig::from_env().with_overrides(cli.api_url.as_deref(), cli.timeout_ms);
    assert_eq!(config.timeout_ms, DEFAULT_API_TIMEOUT_MS);

    unsafe { std::env::remove_var(API_TIMEOUT_VAR) };
}

#[test]
fn timeout_flag_overrides_default() {
    let cli = Cli::try_parse_from(["agri-chat", "--timeout-ms", "1500", "health"]).unwrap();
    assert_eq!(cli.timeout_ms, Some(1500));
    assert!(matches!(cli.command, Some(Command::Health)));
}

#[test]
fn ask_takes_query_argument() {
    let cli = Cli::try_parse_from(["agri-chat", "ask", "Top 5 crops in Maharashtra"]).unwrap();
    match cli.command {
        Some(Command::Ask { query }) => assert_eq!(query, "Top 5 crops in Maharashtra"),
        other => panic!("unexpected command: {other:?}"),
    }
}
