mod client;
mod env;
mod http;
mod response_parsing;

pub use client::GenerationRemote;
pub use env::parse_truthy_flag;
pub use http::{DEFAULT_BASE_URL, ENV_BASE_URL, ENV_TIMEOUT_SECS, HttpGenerationRemote, RemoteConfig};
