//! Spawn/query handlers and chat broadcast.

use session::Session;
use world::{World, WorldError};

use crate::{parse_relative_block, reply_warn, require_origin, HandlerError};

const DEFAULT_NEARBY_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCmd {
    SpawnEntity,
    SpawnParticle,
    Height,
    Nearby,
}

pub(crate) fn handle<W: World>(
    session: &Session,
    world: &mut W,
    op: QueryCmd,
    args: &[String],
) -> Result<(), HandlerError> {
    match op {
        QueryCmd::SpawnEntity => spawn_entity(session, world, args),
        QueryCmd::SpawnParticle => spawn_particle(session, world, args),
        QueryCmd::Height => height(session, world, args),
        QueryCmd::Nearby => nearby_entities(session, world, args),
    }
}

/// Broadcast the message to everyone. Arguments were split on commas by
/// the codec; rejoin them with spaces. No reply.
pub(crate) fn handle_chat<W: World>(world: &mut W, args: &[String]) -> Result<(), HandlerError> {
    let message = args.join(" ");
    world.broadcast(message.trim());
    Ok(())
}

fn spawn_entity<W: World>(
    session: &Session,
    world: &mut W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 4 {
        reply_warn(session, "Invalid arguments for spawnEntity command.");
        return Ok(());
    }
    let origin = require_origin(session)?;
    let Some(pos) = parse_relative_block(&origin, &args[0], &args[1], &args[2]) else {
        reply_warn(session, "Invalid coordinates for spawnEntity command.");
        return Ok(());
    };
    let kind = args[3].trim().to_uppercase();
    match world.spawn_entity(&origin.world, pos, &kind) {
        Ok(id) => session.send(id),
        Err(WorldError::UnknownEntityType(k)) => {
            reply_warn(session, format!("No such entity type: {k} for spawnEntity command."));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn spawn_particle<W: World>(
    session: &Session,
    world: &mut W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 9 && args.len() != 10 {
        reply_warn(session, "Invalid arguments for spawnParticle command.");
        return Ok(());
    }
    let origin = require_origin(session)?;
    let Some(pos) = parse_relative_block(&origin, &args[0], &args[1], &args[2]) else {
        reply_warn(session, "Invalid coordinates for spawnParticle command.");
        return Ok(());
    };
    let (Ok(ox), Ok(oy), Ok(oz), Ok(speed), Ok(count)) = (
        args[3].trim().parse::<f32>(),
        args[4].trim().parse::<f32>(),
        args[5].trim().parse::<f32>(),
        args[7].trim().parse::<f64>(),
        args[8].trim().parse::<u32>(),
    ) else {
        reply_warn(session, "Invalid values for spawnParticle command.");
        return Ok(());
    };
    // Any value other than a literal `true` counts as false.
    let force = args.get(9).map(|s| s.trim().eq_ignore_ascii_case("true")).unwrap_or(true);

    let kind = args[6].trim().to_uppercase();
    match world.spawn_particle(&origin.world, pos, [ox, oy, oz], &kind, speed, count, force) {
        Ok(()) => session.send("Particle spawn successful"),
        Err(WorldError::UnknownParticle(k)) => {
            reply_warn(session, format!("No such particle type: {k} for spawnParticle command."));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn height<W: World>(session: &Session, world: &W, args: &[String]) -> Result<(), HandlerError> {
    if args.len() != 2 {
        reply_warn(session, "Invalid arguments for getHeight command.");
        return Ok(());
    }
    let origin = require_origin(session)?;
    let Some(pos) = parse_relative_block(&origin, &args[0], "0", &args[1]) else {
        reply_warn(session, "Invalid coordinates for getHeight command.");
        return Ok(());
    };
    session.send(world.height_at(&origin.world, pos.x, pos.z)?);
    Ok(())
}

fn nearby_entities<W: World>(
    session: &Session,
    world: &W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 3 && args.len() != 4 {
        reply_warn(session, "Invalid arguments for getNearbyEntities command.");
        return Ok(());
    }
    let origin = require_origin(session)?;
    let Some(pos) = parse_relative_block(&origin, &args[0], &args[1], &args[2]) else {
        reply_warn(session, "Invalid coordinates for getNearbyEntities command.");
        return Ok(());
    };
    let radius = match args.get(3) {
        None => DEFAULT_NEARBY_RADIUS,
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(r) => r,
            Err(_) => {
                reply_warn(session, "Invalid radius for getNearbyEntities command.");
                return Ok(());
            }
        },
    };

    let found = world.nearby_entities(&origin.world, pos, radius)?;
    let reply = found
        .iter()
        .map(|(name, id)| format!("{name}:{id}"))
        .collect::<Vec<_>>()
        .join(",");
    session.send(reply);
    Ok(())
}
