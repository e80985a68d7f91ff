pub mod config;
pub mod error;
pub mod generator;
pub mod logger;
pub mod models;
pub mod replicate;
pub mod server;

pub use config::{Config, ReplicateConfig, ServerConfig};
pub use error::{HairgenError, Result};
pub use generator::{encode_data_uri, HairstyleGenerator};
pub use models::*;
pub use replicate::{ModelInvoker, ReplicateClient};
