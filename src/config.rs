use std::path::PathBuf;
use std::time::Duration;

/// Runtime-tunable knobs for the supervisor. Defaults match the historical
/// constants in the original `cli.c` (`MAX_PRINTERS`, `MAX_JOBS`, the 10s
/// retention window); each can be overridden via an environment variable
/// read once at startup (`from_env`). No config-file format is introduced:
/// the teacher carries no config crate, and the spec's Non-goals exclude
/// persistence, so environment variables are the lightest ambient
/// mechanism consistent with that.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub max_printers: usize,
    pub max_jobs: usize,
    pub retention_window: Duration,
    pub spool_dir: PathBuf,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_printers: 32,
            max_jobs: 32,
            retention_window: Duration::from_secs(10),
            spool_dir: std::env::temp_dir().join("imprimer-spool"),
        }
    }
}

impl SupervisorConfig {
    /// Layer environment overrides onto the defaults. Unparseable or
    /// absent variables silently fall back to the default value — this is
    /// a convenience for local/test runs, not a validated config format.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_usize("IMPRIMER_MAX_PRINTERS") {
            config.max_printers = v.min(64);
        }
        if let Some(v) = env_usize("IMPRIMER_MAX_JOBS") {
            config.max_jobs = v;
        }
        if let Some(v) = env_usize("IMPRIMER_RETENTION_SECS") {
            config.retention_window = Duration::from_secs(v as u64);
        }
        if let Ok(dir) = std::env::var("IMPRIMER_SPOOL_DIR") {
            config.spool_dir = PathBuf::from(dir);
        }

        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok()?.parse().ok()
}
