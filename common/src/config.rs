use std::time::Duration;

/// Browse type used when no service type is requested.
pub const DEFAULT_SERVICE_TYPE: &str = "_services._dns-sd._udp.local.";

/// Length of the collection window when none is configured.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(5_000);

pub struct Config {
    /// Service type handed to the backend. `None` lets the backend browse
    /// [`DEFAULT_SERVICE_TYPE`].
    pub service_type: Option<String>,
    /// How long entries accumulate before they are read back.
    pub window: Duration,
    /// Timeout passed through to `collect_count`.
    pub collect_timeout: Duration,
    /// Deadline the session itself puts around `collect_count` and `stop_scan`.
    ///
    /// Disabled by default: backends enforce their own limits.
    pub call_timeout: Option<Duration>,
    pub quiet: u8,
    pub no_banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_type: None,
            window: DEFAULT_WINDOW,
            collect_timeout: DEFAULT_WINDOW,
            call_timeout: None,
            quiet: 0,
            no_banner: false,
        }
    }
}
