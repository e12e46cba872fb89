//! Entity handlers, addressed by the id token returned from spawnEntity.

use session::Session;
use world::{EntityId, World, WorldError};

use crate::{parse_relative_block, reply_warn, require_origin, HandlerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityCmd {
    GetPos,
    SetPos,
    GetRotation,
    SetRotation,
    GetPitch,
    SetPitch,
    GetYaw,
    SetYaw,
    Remove,
}

pub(crate) fn handle<W: World>(
    session: &Session,
    world: &mut W,
    op: EntityCmd,
    args: &[String],
) -> Result<(), HandlerError> {
    let origin = require_origin(session)?;
    let Some(first) = args.first() else {
        reply_warn(session, "Missing entity id.");
        return Ok(());
    };
    let Ok(id) = first.trim().parse::<EntityId>() else {
        reply_warn(session, format!("Invalid entity id: {first}"));
        return Ok(());
    };

    let outcome: Result<(), WorldError> = match op {
        EntityCmd::GetPos => world.entity_position(id).map(|(x, y, z)| {
            session.send(format!("{x},{y},{z}"));
        }),
        EntityCmd::SetPos => {
            if args.len() != 4 {
                reply_warn(session, "Invalid arguments for setPos command.");
                return Ok(());
            }
            match parse_relative_block(&origin, &args[1], &args[2], &args[3]) {
                Some(pos) => world.set_entity_position(id, pos),
                None => {
                    reply_warn(session, "Invalid coordinates for setPos command.");
                    return Ok(());
                }
            }
        }
        EntityCmd::GetRotation => world.entity_rotation(id).map(|(yaw, pitch)| {
            session.send(format!("{yaw},{pitch}"));
        }),
        EntityCmd::SetRotation => {
            if args.len() != 3 {
                reply_warn(session, "Invalid arguments for setRotation command.");
                return Ok(());
            }
            let (Ok(yaw), Ok(pitch)) =
                (args[1].trim().parse::<f32>(), args[2].trim().parse::<f32>())
            else {
                reply_warn(session, "Invalid rotation values for setRotation command.");
                return Ok(());
            };
            world.set_entity_rotation(id, yaw, pitch)
        }
        EntityCmd::GetPitch => world.entity_rotation(id).map(|(_, pitch)| {
            session.send(pitch);
        }),
        EntityCmd::SetPitch => {
            if args.len() != 2 {
                reply_warn(session, "Invalid arguments for setPitch command.");
                return Ok(());
            }
            let Ok(pitch) = args[1].trim().parse::<f32>() else {
                reply_warn(session, "Invalid pitch value for setPitch command.");
                return Ok(());
            };
            world
                .entity_rotation(id)
                .and_then(|(yaw, _)| world.set_entity_rotation(id, yaw, pitch))
        }
        EntityCmd::GetYaw => world.entity_rotation(id).map(|(yaw, _)| {
            session.send(yaw);
        }),
        EntityCmd::SetYaw => {
            if args.len() != 2 {
                reply_warn(session, "Invalid arguments for setYaw command.");
                return Ok(());
            }
            let Ok(yaw) = args[1].trim().parse::<f32>() else {
                reply_warn(session, "Invalid yaw value for setYaw command.");
                return Ok(());
            };
            world
                .entity_rotation(id)
                .and_then(|(_, pitch)| world.set_entity_rotation(id, yaw, pitch))
        }
        EntityCmd::Remove => world.remove_entity(id),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(WorldError::EntityNotFound(id)) => {
            reply_warn(session, format!("entity not found: {id}"));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
