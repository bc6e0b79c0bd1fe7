//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Map `-v` repetitions to a default filter for both crates.
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("spritegrid={level},spritegrid_cli={level}")
}

/// Install the global subscriber. `RUST_LOG` wins over `-v`.
///
/// Logs go to stderr so stdout only carries the list of written files.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0), "spritegrid=warn,spritegrid_cli=warn");
        assert_eq!(default_filter(1), "spritegrid=info,spritegrid_cli=info");
        assert_eq!(default_filter(4), "spritegrid=debug,spritegrid_cli=debug");
    }
}
