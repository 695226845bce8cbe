use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for a `shopreach` session, resolved from `SHOPREACH_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub data_dir: PathBuf,
    /// File name of the group store inside `data_dir`.
    pub groups_file: String,
    pub webdriver_url: String,
    /// Browser user-data directory holding the logged-in profiles.
    pub profile_dir: PathBuf,
    pub profile_name: String,
    pub shop_base_url: String,
    pub social_base_url: String,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub page_settle_ms: u64,
    pub post_page_settle_ms: u64,
    pub post_step_settle_ms: u64,
    pub status_settle_ms: u64,
    pub dispatch_delay_secs: u64,
}

impl AppConfig {
    /// Pause after loading a shop listing or product page.
    #[must_use]
    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    /// Pause after opening a group page or submitting a post.
    #[must_use]
    pub fn post_page_settle(&self) -> Duration {
        Duration::from_millis(self.post_page_settle_ms)
    }

    #[must_use]
    pub fn post_step_settle(&self) -> Duration {
        Duration::from_millis(self.post_step_settle_ms)
    }

    #[must_use]
    pub fn status_settle(&self) -> Duration {
        Duration::from_millis(self.status_settle_ms)
    }

    /// Pacing between two delivery attempts.
    #[must_use]
    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_secs(self.dispatch_delay_secs)
    }

    /// Path of the lock file guarding `data_dir` against a second session.
    #[must_use]
    pub fn session_lock_path(&self) -> PathBuf {
        self.data_dir.join(".session.lock")
    }
}
