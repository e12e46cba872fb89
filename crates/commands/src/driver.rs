//! Per-tick session draining.

use session::SessionRegistry;
use world::{PermissionGate, World};

use crate::router;

#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Ceiling on commands executed per session per tick; the remainder of
    /// a burst stays queued for later ticks.
    pub max_commands_per_tick: usize,
    /// Build radius handed out at handshake when no permission gate is
    /// configured.
    pub default_build_radius: i32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_commands_per_tick: 9000,
            default_build_radius: 32,
        }
    }
}

/// What one tick did, for metrics and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Commands executed across all sessions.
    pub commands: usize,
    /// Sessions drained this tick.
    pub sessions: usize,
    /// Sessions finalized and removed this tick.
    pub removed: usize,
}

/// Drains every registered session once per simulation step, on the tick
/// thread. Command execution is therefore never concurrent with another
/// command.
#[derive(Debug)]
pub struct TickDriver {
    config: DriverConfig,
}

impl TickDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> DriverConfig {
        self.config
    }

    /// One tick: finalize sessions flagged for removal, then drain the rest
    /// up to the per-session ceiling.
    ///
    /// A session whose reader has stopped is only marked for removal once
    /// its inbound queue is empty, so commands sent before a disconnect are
    /// never dropped. Removal itself drops the session, which releases the
    /// outbound sender and lets the writer task flush and close the socket.
    pub fn tick<W: World>(
        &self,
        registry: &mut SessionRegistry,
        world: &mut W,
        gate: Option<&dyn PermissionGate>,
    ) -> TickSummary {
        let mut summary = TickSummary::default();
        registry.retain_sessions(|session| {
            if session.pending_removal() {
                summary.removed += 1;
                return false;
            }
            summary.sessions += 1;

            let mut handled = 0;
            while handled < self.config.max_commands_per_tick {
                let Some(line) = session.poll_line() else { break };
                let cmd = protocol::parse(&line);
                router::dispatch(session, world, gate, self.config.default_build_radius, &cmd);
                handled += 1;
                if session.pending_removal() {
                    break;
                }
            }
            summary.commands += handled;

            let backlog = session.queued_lines();
            if handled == self.config.max_commands_per_tick && backlog > 0 {
                tracing::warn!(
                    session = %session.id(),
                    handled,
                    backlog,
                    "per-tick command ceiling reached, deferring backlog"
                );
            }
            if !session.pending_removal() && !session.running() && backlog == 0 {
                session.begin_close();
            }
            true
        });
        summary
    }
}
