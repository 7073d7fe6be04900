//! Runtime profile for the server.
//!
//! # Responsibilities
//! - Hold the deployment mode, listener port and data directory
//! - Derive the binary-RPC port from the general port
//!
//! # Design Decisions
//! - The RPC port is always `port + 1`, never configured independently
//! - Dev mode trades security for reproducible local sessions

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local development: fixed session secret, verbose logging.
    Dev,
    /// Production: persisted session secret.
    Prod,
}

/// Runtime profile shared by every subsystem.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Deployment mode.
    pub mode: Mode,

    /// Port of the general HTTP listener.
    pub port: u16,

    /// Directory holding persisted state (workspace settings).
    pub data: PathBuf,

    /// Optional directory of built frontend assets.
    pub dist: Option<PathBuf>,
}

impl Profile {
    /// Port of the binary-RPC listener, derived from the general port.
    pub fn rpc_port(&self) -> u16 {
        self.port + 1
    }

    pub fn is_dev(&self) -> bool {
        self.mode == Mode::Dev
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            mode: Mode::Dev,
            port: 5231,
            data: PathBuf::from("data"),
            dist: None,
        }
    }
}
