use crate::PlayerRef;

/// Policy provider consulted during the handshake.
///
/// The online right applies when the player is currently connected to the
/// host simulation, the offline right otherwise. `build_radius` is the
/// per-player construction range in blocks.
pub trait PermissionGate {
    fn can_construct_online(&self, player: &PlayerRef) -> bool;
    fn can_construct_offline(&self, player: &PlayerRef) -> bool;
    fn build_radius(&self, player: &PlayerRef) -> i32;
}

/// Gate used when no real policy backend is wired in: allows everyone and
/// hands out a fixed build radius.
#[derive(Debug, Clone)]
pub struct FallbackGate {
    online_node: String,
    offline_node: String,
    default_radius: i32,
}

impl FallbackGate {
    pub fn new(online_node: &str, offline_node: &str, default_radius: i32) -> Self {
        tracing::info!(default_radius, "fallback permission gate initialized");
        Self {
            online_node: online_node.to_string(),
            offline_node: offline_node.to_string(),
            default_radius,
        }
    }
}

impl PermissionGate for FallbackGate {
    fn can_construct_online(&self, player: &PlayerRef) -> bool {
        tracing::debug!(player = %player.name, node = %self.online_node, "fallback gate: allowing");
        true
    }

    fn can_construct_offline(&self, player: &PlayerRef) -> bool {
        tracing::debug!(player = %player.name, node = %self.offline_node, "fallback gate: allowing");
        true
    }

    fn build_radius(&self, _player: &PlayerRef) -> i32 {
        self.default_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_allows_everyone() {
        let gate = FallbackGate::new("remote.online", "remote.offline", 32);
        let online = PlayerRef {
            name: "Steve".into(),
            online: true,
        };
        let offline = PlayerRef {
            name: "Alex".into(),
            online: false,
        };
        assert!(gate.can_construct_online(&online));
        assert!(gate.can_construct_offline(&offline));
        assert_eq!(gate.build_radius(&online), 32);
    }
}
