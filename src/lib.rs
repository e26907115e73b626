pub mod archive; // Session history, profile and feedback persistence
pub mod cli; // Terminal front-end
pub mod config;
pub mod diagnosis; // Condition scoring and archival summary
pub mod intake; // Conversation state machine

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
/// Logs go to stderr so they never interleave with the conversation.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
