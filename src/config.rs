use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Error};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "HEALTH_EVENTS_NOTIFIER_CONFIG";

const CONFIG_FILE_NAME: &str = ".healthEventsNotifier.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_address: IpAddr,
    pub port: u16,
    /// Largest event body accepted on `POST /events`.
    pub body_limit_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3030,
            body_limit_bytes: 256 * 1024,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Error> {
        let config_path = build_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Config, Error> {
        if !config_path.exists() {
            debug!("No config at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        let data = read_config_file(config_path)?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("Invalid json in {:?}", config_path))?;
        debug!("Loaded config {:?} from {:?}", config, config_path);
        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.port)
    }
}

fn build_config_path() -> Result<PathBuf, Error> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Missing home directory"))?;
    let config_path = Path::new(home_dir.as_path()).join(CONFIG_FILE_NAME);
    Ok(config_path)
}

fn read_config_file(config_path: &Path) -> Result<String, Error> {
    let mut config_file =
        File::open(config_path).with_context(|| format!("could not read {:?}", config_path))?;
    let mut data = String::new();
    config_file.read_to_string(&mut data)?;
    Ok(data)
}
