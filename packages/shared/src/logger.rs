//! Logging setup for the Parley binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crate whose spans and events are enabled by default alongside the binary.
const SERVER_CRATE: &str = "parley_server";

/// Initialize the tracing subscriber with the specified default log level.
///
/// Enables the server library and the calling binary at `default_log_level`.
/// `RUST_LOG` overrides the default filter entirely.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "parley-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use parley_shared::logger::setup_logger;
///
/// setup_logger("parley-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let mut directives = vec![format!("{}={}", SERVER_CRATE, default_log_level)];
    let binary_target = binary_name.replace('-', "_");
    if binary_target != SERVER_CRATE {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }
    directives.push(format!("tower_http={}", default_log_level));
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_normalizes_binary_name() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに置換される
        // given (前提条件):
        let binary_name = "parley-admin";

        // when (操作):
        let filter = default_filter(binary_name, "debug");

        // then (期待する結果):
        assert_eq!(
            filter,
            "parley_server=debug,parley_admin=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_default_filter_skips_binary_named_like_server_crate() {
        // テスト項目: バイナリ名がサーバークレートと同名なら重複して出力しない
        // given (前提条件):
        let binary_name = "parley-server";

        // when (操作):
        let filter = default_filter(binary_name, "info");

        // then (期待する結果):
        assert_eq!(filter, "parley_server=info,tower_http=info");
    }
}
