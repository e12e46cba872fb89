//! Block get/set handlers, including the cuboid range forms.

use session::{Origin, Session};
use world::{BlockPos, Facing, World, WorldError};

use crate::{parse_relative_block, reply_warn, require_origin, HandlerError};

// Well inside the host's hard world border; y is clamped to the build band.
const WORLD_LIMIT: i32 = 1_000_000;
const SKY_LIMIT: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCmd {
    Get,
    GetRange,
    GetWithData,
    Set,
    SetRange,
}

pub(crate) fn handle<W: World>(
    session: &Session,
    world: &mut W,
    op: BlockCmd,
    args: &[String],
) -> Result<(), HandlerError> {
    let origin = require_origin(session)?;
    match op {
        BlockCmd::Get => get_block(session, &origin, world, args),
        BlockCmd::GetRange => get_blocks(session, &origin, world, args),
        BlockCmd::GetWithData => get_block_with_data(session, &origin, world, args),
        BlockCmd::Set => set_block(session, &origin, world, args),
        BlockCmd::SetRange => set_blocks(session, &origin, world, args),
    }
}

fn get_block<W: World>(
    session: &Session,
    origin: &Origin,
    world: &W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 3 {
        reply_warn(session, "Invalid arguments for getBlock command.");
        return Ok(());
    }
    let Some(pos) = parse_relative_block(origin, &args[0], &args[1], &args[2]) else {
        reply_warn(session, "Invalid coordinates for getBlock command.");
        return Ok(());
    };
    session.send(world.get_block(&origin.world, pos)?);
    Ok(())
}

fn get_blocks<W: World>(
    session: &Session,
    origin: &Origin,
    world: &W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 6 {
        reply_warn(session, "Invalid arguments for getBlocks command.");
        return Ok(());
    }
    let (Some(a), Some(b)) = (
        parse_relative_block(origin, &args[0], &args[1], &args[2]),
        parse_relative_block(origin, &args[3], &args[4], &args[5]),
    ) else {
        reply_warn(session, "Invalid coordinates for getBlocks command.");
        return Ok(());
    };

    let mut names = Vec::new();
    for x in a.x.min(b.x)..=a.x.max(b.x) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for z in a.z.min(b.z)..=a.z.max(b.z) {
                names.push(world.get_block(&origin.world, BlockPos::new(x, y, z))?);
            }
        }
    }
    session.send(names.join(","));
    Ok(())
}

fn get_block_with_data<W: World>(
    session: &Session,
    origin: &Origin,
    world: &W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() != 3 {
        reply_warn(session, "Invalid arguments for getBlockWithData command.");
        return Ok(());
    }
    let Some(pos) = parse_relative_block(origin, &args[0], &args[1], &args[2]) else {
        reply_warn(session, "Invalid coordinates for getBlockWithData command.");
        return Ok(());
    };
    let (material, data) = world.get_block_with_data(&origin.world, pos)?;
    session.send(format!("{material},{data}"));
    Ok(())
}

fn set_block<W: World>(
    session: &Session,
    origin: &Origin,
    world: &mut W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() < 4 {
        reply_warn(session, "Invalid arguments for setBlock command.");
        return Ok(());
    }
    let Some(pos) = parse_relative_block(origin, &args[0], &args[1], &args[2]) else {
        reply_warn(session, "Invalid coordinates for setBlock command.");
        return Ok(());
    };
    if !coordinate_in_range(pos) {
        reply_warn(
            session,
            format!(
                "Coordinates out of range for setBlock command. Location: ({}, {}, {})",
                pos.x, pos.y, pos.z
            ),
        );
        return Ok(());
    }
    let Some(facing) = parse_facing(args.get(4)) else {
        reply_warn(session, "Invalid facing value for setBlock command.");
        return Ok(());
    };

    let material = args[3].trim().to_uppercase();
    match world.set_block(&origin.world, pos, &material, facing) {
        Ok(()) => session.send(format!(
            "Block {material} set successfully at: ({}, {}, {})",
            pos.x, pos.y, pos.z
        )),
        Err(WorldError::UnknownMaterial(m)) => {
            reply_warn(session, format!("No such material: {m} for setBlock command."));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn set_blocks<W: World>(
    session: &Session,
    origin: &Origin,
    world: &mut W,
    args: &[String],
) -> Result<(), HandlerError> {
    if args.len() < 7 {
        reply_warn(session, "Invalid arguments for setBlocks command.");
        return Ok(());
    }
    let (Some(a), Some(b)) = (
        parse_relative_block(origin, &args[0], &args[1], &args[2]),
        parse_relative_block(origin, &args[3], &args[4], &args[5]),
    ) else {
        reply_warn(session, "Invalid coordinates for setBlocks command.");
        return Ok(());
    };
    if !coordinate_in_range(a) || !coordinate_in_range(b) {
        reply_warn(
            session,
            format!(
                "Coordinates out of range for setBlocks command. Location: ({}, {}, {}) - ({}, {}, {})",
                a.x, a.y, a.z, b.x, b.y, b.z
            ),
        );
        return Ok(());
    }
    let Some(facing) = parse_facing(args.get(7)) else {
        reply_warn(session, "Invalid facing value for setBlocks command.");
        return Ok(());
    };

    let material = args[6].trim().to_uppercase();
    match fill_cuboid(world, &origin.world, a, b, &material, facing) {
        Ok(count) => session.send(format!(
            "Blocks {material} set successfully: {count} blocks at ({}, {}, {}) - ({}, {}, {})",
            a.x, a.y, a.z, b.x, b.y, b.z
        )),
        Err(WorldError::UnknownMaterial(m)) => {
            reply_warn(session, format!("No such material: {m} for setBlocks command."));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn fill_cuboid<W: World>(
    world: &mut W,
    world_name: &str,
    a: BlockPos,
    b: BlockPos,
    material: &str,
    facing: Facing,
) -> Result<usize, WorldError> {
    let mut count = 0;
    for x in a.x.min(b.x)..=a.x.max(b.x) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for z in a.z.min(b.z)..=a.z.max(b.z) {
                world.set_block(world_name, BlockPos::new(x, y, z), material, facing)?;
                count += 1;
            }
        }
    }
    Ok(count)
}

fn coordinate_in_range(pos: BlockPos) -> bool {
    (-WORLD_LIMIT..=WORLD_LIMIT).contains(&pos.x)
        && (0..=SKY_LIMIT).contains(&pos.y)
        && (-WORLD_LIMIT..=WORLD_LIMIT).contains(&pos.z)
}

/// Absent argument means the default facing; present but unparseable or
/// out of range means rejection.
fn parse_facing(arg: Option<&String>) -> Option<Facing> {
    match arg {
        None => Some(Facing::default()),
        Some(raw) => raw.trim().parse::<usize>().ok().and_then(Facing::from_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_bounds() {
        assert!(coordinate_in_range(BlockPos::new(0, 0, 0)));
        assert!(coordinate_in_range(BlockPos::new(1_000_000, 1000, -1_000_000)));
        assert!(!coordinate_in_range(BlockPos::new(1_000_001, 0, 0)));
        assert!(!coordinate_in_range(BlockPos::new(0, -1, 0)));
        assert!(!coordinate_in_range(BlockPos::new(0, 1001, 0)));
        assert!(!coordinate_in_range(BlockPos::new(0, 0, -1_000_001)));
    }

    #[test]
    fn facing_defaults_and_rejects() {
        assert_eq!(parse_facing(None), Some(Facing::Down));
        assert_eq!(parse_facing(Some(&"5".to_string())), Some(Facing::East));
        assert_eq!(parse_facing(Some(&"6".to_string())), None);
        assert_eq!(parse_facing(Some(&"north".to_string())), None);
    }
}
