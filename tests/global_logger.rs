//! Process-wide entry points.

use common_log::observability::global;
use common_log::LoggerBuilder;

mod common;

use common::{pod_lookup, split_line, CapturedConsole};

#[test]
fn test_free_functions_use_installed_logger() {
    let console = CapturedConsole::default();
    let logger = LoggerBuilder::new(common::settings("debug"))
        .console_writer(console.clone())
        .env_lookup(pod_lookup)
        .build()
        .unwrap();

    assert!(global::install(logger.clone()).is_ok());
    assert!(global::install(logger).is_err());

    common_log::trace("hidden");
    common_log::debug("d");
    common_log::info("i");
    common_log::warn("w");
    common_log::error("e");

    let lines = console.lines();
    let seen: Vec<(&str, &str)> = lines
        .iter()
        .map(|line| {
            let (_, level, caller, body) = split_line(line);
            assert!(caller.starts_with("global_logger.rs:"), "{line}");
            (level, body)
        })
        .collect();
    assert_eq!(
        seen,
        vec![
            ("DEBUG", "[[[((g-01)) d ]]]"),
            ("INFO", "[[[((g-01)) i ]]]"),
            ("WARN", "[[[((g-01)) w ]]]"),
            ("ERROR", "[[[((g-01)) e ]]]"),
        ]
    );
}
