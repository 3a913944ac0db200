use std::time::Duration;

/// Tunables for the live service. The defaults mirror the observed product
/// behavior (3s typing staleness, last-100 message window) but are plain
/// parameters, overridable from the environment.
#[derive(Clone, Debug)]
pub struct LiveConfig {
    /// A typing marker older than this is filtered out by readers.
    pub typing_stale_after: Duration,
    /// How many trailing messages a new subscriber receives as backlog.
    pub message_history_limit: usize,
    /// How many notifications a listing returns, newest first.
    pub notification_limit: usize,
    /// Buffer size of per-session and per-subscription channels.
    pub session_buffer: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            typing_stale_after: Duration::from_secs(3),
            message_history_limit: 100,
            notification_limit: 50,
            session_buffer: 100,
        }
    }
}

impl LiveConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<u64>("TYPING_STALE_MS") {
            config.typing_stale_after = Duration::from_millis(ms);
        }
        if let Some(limit) = env_parse("MESSAGE_HISTORY_LIMIT") {
            config.message_history_limit = limit;
        }
        if let Some(limit) = env_parse("NOTIFICATION_LIMIT") {
            config.notification_limit = limit;
        }
        if let Some(size) = env_parse("SESSION_BUFFER") {
            config.session_buffer = size;
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
