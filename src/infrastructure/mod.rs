pub mod bootstrap;
#[path = "config/mod.rs"]
pub mod config_mod;
pub use config_mod as config;
pub mod excel;
pub mod llm_clients;
pub mod response;
pub mod session_store;
