use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::axis::Axis;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "DISASTER_VISION_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "DISASTER_VISION_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Disaster-type model (channel-last ONNX graph)
    #[arg(long, env = "DISASTER_MODEL_PATH", default_value = "disaster.onnx")]
    pub disaster_model: PathBuf,

    /// Damage-severity model (channel-first ONNX graph)
    #[arg(long, env = "DAMAGE_MODEL_PATH", default_value = "damage.onnx")]
    pub damage_model: PathBuf,

    #[arg(short, long, env = "DISASTER_VISION_DEVICE_ID", default_value_t = 0)]
    pub device_id: i32,

    /// Maximum size of a request body in bytes
    #[arg(long, env = "DISASTER_VISION_MAX_UPLOAD_BYTES", default_value_t = 50 * 1024 * 1024, value_parser = check_upload_limit)]
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }

    pub fn model_path(&self, axis: Axis) -> &PathBuf {
        match axis {
            Axis::Disaster => &self.disaster_model,
            Axis::Damage => &self.damage_model,
        }
    }

    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Execution device reported by the health endpoint.
    pub fn device_label(&self) -> String {
        if cfg!(any(feature = "cuda", feature = "tensorrt")) {
            format!("cuda:{}", self.device_id)
        } else {
            "cpu".to_string()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            disaster_model: PathBuf::from("disaster.onnx"),
            damage_model: PathBuf::from("damage.onnx"),
            device_id: 0,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

fn check_upload_limit(s: &str) -> Result<usize, String> {
    let limit: usize = s
        .parse()
        .map_err(|e| format!("{s} is not a byte count: {e}"))?;
    if limit < 1024 {
        return Err(format!("{limit} bytes is too small to carry an image"));
    }
    Ok(limit)
}
