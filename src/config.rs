use std::path::Path;

use serde::Deserialize;

use commands::DriverConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetSection {
    pub listen_addr: String,
}

impl Default for NetSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4711".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TickSection {
    pub tps: u32,
}

impl Default for TickSection {
    fn default() -> Self {
        Self { tps: 20 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_commands_per_tick: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_commands_per_tick: 9000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BanSection {
    /// Path to a text file with one banned IP per line. Empty means no
    /// ban list.
    pub file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PermissionsSection {
    pub enabled: bool,
    pub online_node: String,
    pub offline_node: String,
    pub default_build_radius: i32,
}

impl Default for PermissionsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            online_node: "remote.construct.online".to_string(),
            offline_node: "remote.construct.offline".to_string(),
            default_build_radius: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldSection {
    /// Worlds created in addition to the default `world`.
    pub extra_worlds: Vec<String>,
    /// Player directory entries treated as offline.
    pub players: Vec<String>,
    /// Player directory entries treated as online.
    pub online_players: Vec<String>,
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            extra_worlds: Vec::new(),
            players: vec!["steve".to_string(), "alex".to_string()],
            online_players: Vec::new(),
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub net: NetSection,
    pub tick: TickSection,
    pub limits: LimitsSection,
    pub ban: BanSection,
    pub permissions: PermissionsSection,
    pub world: WorldSection,
}

impl ServerConfig {
    /// Load configuration from an optional TOML file path.
    /// Falls back to defaults if path is None or file doesn't exist.
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) if Path::new(path).exists() => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            _ => Self::default(),
        };
        Ok(config)
    }

    pub fn to_driver_config(&self) -> DriverConfig {
        DriverConfig {
            max_commands_per_tick: self.limits.max_commands_per_tick,
            default_build_radius: self.permissions.default_build_radius,
        }
    }
}

/// Parse CLI arguments. Supports: --config <path>
pub fn parse_cli_args() -> ServerConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if let Some(val) = args.get(i + 1) {
                    config_path = Some(val.as_str());
                    i += 2;
                } else {
                    eprintln!("--config requires a path argument");
                    std::process::exit(1);
                }
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
    }

    match ServerConfig::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}
