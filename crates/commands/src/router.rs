use protocol::Command;
use session::Session;
use world::{PermissionGate, World};

use crate::block::BlockCmd;
use crate::entity::EntityCmd;
use crate::misc::QueryCmd;
use crate::{block, entity, misc, player};

/// Statically resolved command groups. Names are matched once, here;
/// handlers receive a variant, never the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    SetPlayer,
    Block(BlockCmd),
    Query(QueryCmd),
    Entity(EntityCmd),
    Chat,
}

pub fn resolve(name: &str) -> Option<CommandKind> {
    use CommandKind::*;
    Some(match name {
        "setPlayer" => SetPlayer,
        "world.getBlock" => Block(BlockCmd::Get),
        "world.getBlocks" => Block(BlockCmd::GetRange),
        "world.getBlockWithData" => Block(BlockCmd::GetWithData),
        "world.setBlock" => Block(BlockCmd::Set),
        "world.setBlocks" => Block(BlockCmd::SetRange),
        "world.spawnEntity" => Query(QueryCmd::SpawnEntity),
        "world.spawnParticle" => Query(QueryCmd::SpawnParticle),
        "world.getHeight" => Query(QueryCmd::Height),
        "world.getNearbyEntities" => Query(QueryCmd::Nearby),
        "entity.getPos" => Entity(EntityCmd::GetPos),
        "entity.setPos" => Entity(EntityCmd::SetPos),
        "entity.getRotation" => Entity(EntityCmd::GetRotation),
        "entity.setRotation" => Entity(EntityCmd::SetRotation),
        "entity.getPitch" => Entity(EntityCmd::GetPitch),
        "entity.setPitch" => Entity(EntityCmd::SetPitch),
        "entity.getYaw" => Entity(EntityCmd::GetYaw),
        "entity.setYaw" => Entity(EntityCmd::SetYaw),
        "entity.remove" => Entity(EntityCmd::Remove),
        "chat.post" => Chat,
        _ => return None,
    })
}

/// Route one parsed command to its handler.
///
/// Until the handshake has set an origin, `setPlayer` is the only command
/// a session may issue; anything else is answered with an error and the
/// session is closed. An unknown name after the handshake is recoverable.
pub fn dispatch<W: World>(
    session: &mut Session,
    world: &mut W,
    gate: Option<&dyn PermissionGate>,
    default_build_radius: i32,
    cmd: &Command,
) {
    if session.origin().is_none() && cmd.name != "setPlayer" {
        tracing::error!(session = %session.id(), command = %cmd.name, "command before handshake");
        session.send("Error: Player and its origin are not set, please use setPlayer() first.");
        session.begin_close();
        return;
    }

    let Some(kind) = resolve(&cmd.name) else {
        tracing::warn!(session = %session.id(), command = %cmd.name, "unknown command");
        session.send(format!("Error: No such command: {}", cmd.name));
        return;
    };

    let outcome = match kind {
        CommandKind::SetPlayer => {
            player::handle_set_player(session, world, gate, default_build_radius, &cmd.args)
        }
        CommandKind::Block(op) => block::handle(session, world, op, &cmd.args),
        CommandKind::Query(op) => misc::handle(session, world, op, &cmd.args),
        CommandKind::Entity(op) => entity::handle(session, world, op, &cmd.args),
        CommandKind::Chat => misc::handle_chat(world, &cmd.args),
    };

    if let Err(e) = outcome {
        tracing::error!(
            session = %session.id(),
            command = %cmd.name,
            error = %e,
            "command handler fault, closing session"
        );
        session.begin_close();
    }
}
