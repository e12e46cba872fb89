use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[derive(Debug, Clone)]
pub struct TickMetrics {
    pub tick_number: u64,
    pub duration_us: u128,
    pub command_count: usize,
    pub session_count: usize,
}

impl TickMetrics {
    /// Warn when a tick overruns its budget; idle ticks stay quiet.
    pub fn log(&self, budget_us: u128) {
        if self.duration_us > budget_us {
            tracing::warn!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                commands = self.command_count,
                sessions = self.session_count,
                "tick exceeded budget ({}us > {}us)",
                self.duration_us,
                budget_us
            );
        } else if self.command_count > 0 {
            tracing::debug!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                commands = self.command_count,
                sessions = self.session_count,
                "tick completed"
            );
        }
    }
}
