//! The `setPlayer` handshake: identity, permission, origin.

use session::{Origin, Session};
use world::{PermissionGate, World};

use crate::{reply_warn, HandlerError};

const DEFAULT_WORLD: &str = "world";

/// `setPlayer(name, x, y, z[, world])`.
///
/// Unresolvable identity, a permission denial, or an unknown world name
/// close the session; a bad argument count or non-integer coordinates only
/// produce an error reply.
pub(crate) fn handle_set_player<W: World>(
    session: &mut Session,
    world: &W,
    gate: Option<&dyn PermissionGate>,
    default_build_radius: i32,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 4 && args.len() != 5 {
        reply_warn(session, "Invalid arguments for setPlayer command.");
        return Ok(());
    }

    let name = args[0].trim();
    let Some(player) = world.resolve_player(name) else {
        reply_warn(session, format!("Player {name} not found. Bye."));
        session.begin_close();
        return Ok(());
    };

    let build_radius = match gate {
        Some(gate) => {
            let allowed = if player.online {
                gate.can_construct_online(&player)
            } else {
                gate.can_construct_offline(&player)
            };
            if !allowed {
                let state = if player.online { "online" } else { "offline" };
                reply_warn(
                    session,
                    format!(
                        "Player {} is not allowed remote construction while {state}. Bye.",
                        player.name
                    ),
                );
                session.begin_close();
                return Ok(());
            }
            gate.build_radius(&player)
        }
        None => {
            tracing::warn!(player = %player.name, "no permission gate configured, allowing");
            default_build_radius
        }
    };

    let (Ok(x), Ok(y), Ok(z)) = (
        args[1].trim().parse::<i32>(),
        args[2].trim().parse::<i32>(),
        args[3].trim().parse::<i32>(),
    ) else {
        reply_warn(session, "x, y, z must be integers.");
        return Ok(());
    };

    let world_name = match args.get(4) {
        Some(requested) => requested.trim(),
        None => DEFAULT_WORLD,
    };
    if !world.has_world(world_name) {
        reply_warn(session, format!("{world_name} is invalid world name. Bye."));
        session.begin_close();
        return Ok(());
    }

    session.set_player(&player.name);
    session.set_build_radius(build_radius);
    session.set_origin(Origin {
        x,
        y,
        z,
        world: world_name.to_string(),
    });
    tracing::info!(
        session = %session.id(),
        player = %player.name,
        x, y, z,
        world = %world_name,
        build_radius,
        "handshake complete"
    );
    session.send(format!(
        "Player {} set to location: {x}, {y}, {z} in world \"{world_name}\"",
        player.name
    ));
    Ok(())
}
