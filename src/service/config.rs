// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult};

pub static GLOBAL_CONFIG: OnceCell<GatewayConfig> = OnceCell::new();
pub fn global_config() -> &'static GatewayConfig {
    GLOBAL_CONFIG.get().unwrap()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    /// identifier presented to the gateway at handshake time
    pub client_id: i32,
    pub connect_timeout_ms: u64,
    pub conn_read_buffer_size: usize,
    pub max_frame_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            host: "127.0.0.1".to_string(),
            port: 7497,
            client_id: 0,
            connect_timeout_ms: 5_000,
            conn_read_buffer_size: 4 * 1024,
            max_frame_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// oldest gateway protocol version this client still understands
    pub min_server_version: i32,
    pub max_server_version: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            min_server_version: 100,
            max_server_version: 200,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub network: NetworkConfig,
    pub session: SessionConfig,
}

impl GatewayConfig {
    pub fn set_up_config<P: AsRef<Path>>(path: P) -> AppResult<GatewayConfig> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or(AppError::InvalidValue(format!(
                "config file path: {}",
                path.as_ref().to_string_lossy()
            )))?;
        let config = config::Config::builder()
            .add_source(config::File::with_name(path_str))
            .build()?;

        let gateway_config: GatewayConfig = config.try_deserialize()?;

        Ok(gateway_config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_set_up_config_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [network]
            host = "10.0.0.8"
            port = 4001
            client_id = 3
            connect_timeout_ms = 2000
            conn_read_buffer_size = 8192
            max_frame_size = 65536

            [session]
            min_server_version = 110
            max_server_version = 150
            "#
        )
        .unwrap();

        let config = GatewayConfig::set_up_config(file.path()).unwrap();
        assert_eq!(config.network.host, "10.0.0.8");
        assert_eq!(config.network.port, 4001);
        assert_eq!(config.network.client_id, 3);
        assert_eq!(config.session.min_server_version, 110);
        assert_eq!(config.session.max_server_version, 150);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = GatewayConfig::set_up_config("does/not/exist.toml");
        assert!(matches!(result, Err(AppError::ConfigFileError(_))));
    }
}
