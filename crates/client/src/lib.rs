//! `cylinder-client`: wiring for the worker front end (application session,
//! environment configuration, the HTTP backend and the terminal console).

pub mod config;
pub mod console;
pub mod http;
pub mod session;

pub use config::{ClientConfig, ConfigError};
pub use console::{Command, Console, Reply};
pub use http::HttpBackend;
pub use session::{AppSession, Area, Identity, Role};
