/// Configuration module - Load and validate signer configuration
pub mod schema;
pub mod loader;

pub use schema::Config;
pub use loader::{load_config, parse_config};
