//! Logging infrastructure for the routine generator.
//!
//! Prompts and raw model responses are emitted as `debug` events instead of
//! being written to disk, so run with `RUST_LOG=routine_core=debug` to see them.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose events follow the requested level
const OWN_TARGETS: &[&str] = &["routine_core", "routine_cli"];

/// Filter directives for `level` on our own crates; the HTTP stack stays at warn.
pub fn default_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in OWN_TARGETS {
        directives.push_str(&format!(",{}={}", target, level));
    }
    directives
}

/// Initialize logging to stderr with a specific default level
///
/// `RUST_LOG` still takes precedence when set. Stdout is left for command
/// output such as `--json`.
pub fn init_with_level(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new(default_directives("debug")))
        .try_init();
}
