use crate::catalog::DeviceKind;
use crate::registry::Exposure;
use crate::streaming::StreamingOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Load environment variables from a .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv(env_path: &Path) {
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let mut value = value.trim();

            if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
                || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
            {
                value = &value[1..value.len() - 1];
            }

            // Env vars take precedence
            if std::env::var(key).is_err() {
                // SAFETY: only called from `main` before the tokio runtime is built
                unsafe { std::env::set_var(key, value) };
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub platform: PlatformConfig,
    pub accessory: AccessoryConfig,
    pub listener: ListenerConfig,
    pub cache: CacheConfig,
    pub streaming: StreamingOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: String,
    /// Prefix mixed into every derived accessory id
    pub namespace: String,
    pub exposure: Exposure,
    pub device_kind: DeviceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryConfig {
    pub manufacturer: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    pub bind_address: IpAddr,
    pub port: u16,
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub path: PathBuf,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: "ExampleDynamicPlatform".to_string(),
            namespace: "virtual-accessory-bridge".to_string(),
            exposure: Exposure::DynamicSet,
            device_kind: DeviceKind::Lightbulb,
        }
    }
}

impl Default for AccessoryConfig {
    fn default() -> Self {
        Self {
            manufacturer: "Custom Manufacturer".to_string(),
            model: "Custom Model".to_string(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 18081,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("virtual-accessory-bridge")
            .join("accessories.json");
        Self { path }
    }
}

/// Split a comma separated list, dropping empty entries.
pub fn parse_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("BRIDGE_PLATFORM_NAME") {
            config.platform.name = name;
        }
        if let Ok(namespace) = std::env::var("BRIDGE_NAMESPACE") {
            config.platform.namespace = namespace;
        }
        if let Ok(kind) = std::env::var("BRIDGE_DEVICE_KIND") {
            match kind.parse() {
                Ok(k) => config.platform.device_kind = k,
                Err(_) => log::warn!("Ignoring unknown BRIDGE_DEVICE_KIND: {}", kind),
            }
        }
        if let Ok(mode) = std::env::var("BRIDGE_EXPOSURE") {
            let names = std::env::var("BRIDGE_STATIC_DEVICES")
                .map(|list| parse_names(&list))
                .unwrap_or_default();
            match Exposure::from_mode(&mode, names) {
                Some(exposure) => config.platform.exposure = exposure,
                None => log::warn!("Ignoring unknown BRIDGE_EXPOSURE: {}", mode),
            }
        }
        if let Ok(manufacturer) = std::env::var("ACCESSORY_MANUFACTURER") {
            config.accessory.manufacturer = manufacturer;
        }
        if let Ok(model) = std::env::var("ACCESSORY_MODEL") {
            config.accessory.model = model;
        }

        // Trigger listener
        if let Ok(address) = std::env::var("TRIGGER_BIND_ADDRESS")
            && let Ok(a) = address.parse()
        {
            config.listener.bind_address = a;
        }
        if let Ok(port) = std::env::var("TRIGGER_PORT")
            && let Ok(p) = port.parse()
        {
            config.listener.port = p;
        }

        if let Ok(path) = std::env::var("DEVICE_CACHE_PATH") {
            config.cache.path = PathBuf::from(path);
        }

        if let Ok(count) = std::env::var("CAMERA_STREAM_COUNT")
            && let Ok(c) = count.parse()
        {
            config.streaming.stream_count = c;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listener.port, 18081);
        assert!(config.listener.bind_address.is_loopback());
        assert_eq!(config.platform.exposure, Exposure::DynamicSet);
        assert!(config.cache.path.ends_with("accessories.json"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            parse_names("Switch 1, Switch 2,,"),
            vec!["Switch 1".to_string(), "Switch 2".to_string()]
        );
        assert!(parse_names("").is_empty());
    }

    #[test]
    fn test_load_dotenv_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# comment\nVAB_TEST_DOTENV_NEW=\"quoted value\"\nVAB_TEST_DOTENV_SET=from file\n",
        )
        .unwrap();

        // SAFETY: test-local variable names
        unsafe { std::env::set_var("VAB_TEST_DOTENV_SET", "from env") };
        load_dotenv(&path);

        assert_eq!(std::env::var("VAB_TEST_DOTENV_NEW").unwrap(), "quoted value");
        assert_eq!(std::env::var("VAB_TEST_DOTENV_SET").unwrap(), "from env");
    }
}
