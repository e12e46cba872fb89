//! Command routing, the handler groups, and the per-tick session driver.
//!
//! Everything in this crate runs on the simulation tick thread. Handlers
//! answer recoverable problems (bad argument counts, unparseable
//! coordinates, unknown names) inline with an `Error:` reply and leave the
//! session open; anything surfaced as a [`HandlerError`] closes it.

mod block;
mod driver;
mod entity;
mod misc;
mod player;
mod router;

pub use block::BlockCmd;
pub use driver::{DriverConfig, TickDriver, TickSummary};
pub use entity::EntityCmd;
pub use misc::QueryCmd;
pub use router::{dispatch, resolve, CommandKind};

use session::{Origin, Session};
use thiserror::Error;
use world::{BlockPos, WorldError};

/// Fault that aborts the current command and tears the session down.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("session has no origin")]
    MissingOrigin,
    #[error(transparent)]
    World(#[from] WorldError),
}

fn require_origin(session: &Session) -> Result<Origin, HandlerError> {
    session.origin().cloned().ok_or(HandlerError::MissingOrigin)
}

/// Resolve client coordinates, given relative to the session origin, into
/// an absolute block position. Fractional input is truncated toward zero.
fn parse_relative_block(origin: &Origin, xs: &str, ys: &str, zs: &str) -> Option<BlockPos> {
    let x = xs.trim().parse::<f64>().ok()? as i32;
    let y = ys.trim().parse::<f64>().ok()? as i32;
    let z = zs.trim().parse::<f64>().ok()? as i32;
    Some(BlockPos::new(origin.x + x, origin.y + y, origin.z + z))
}

/// Send an `Error:` reply and log the same message.
fn reply_warn(session: &Session, msg: impl std::fmt::Display) {
    let msg = msg.to_string();
    tracing::warn!(session = %session.id(), "{msg}");
    session.send(format!("{}{msg}", protocol::ERROR_PREFIX));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin {
            x: 100,
            y: 64,
            z: -200,
            world: "world".to_string(),
        }
    }

    #[test]
    fn relative_coordinates_offset_from_origin() {
        let pos = parse_relative_block(&origin(), "3", "0", "-5").unwrap();
        assert_eq!(pos, BlockPos::new(103, 64, -205));
    }

    #[test]
    fn fractional_coordinates_truncate() {
        let pos = parse_relative_block(&origin(), "1.9", "-0.5", "0.2").unwrap();
        assert_eq!(pos, BlockPos::new(101, 64, -200));
    }

    #[test]
    fn garbage_coordinates_rejected() {
        assert!(parse_relative_block(&origin(), "a", "0", "0").is_none());
        assert!(parse_relative_block(&origin(), "1", "", "0").is_none());
    }
}
