mod auth_cmd;
mod brew;
mod config_cmd;

pub use auth_cmd::AuthCommand;
pub use brew::BrewCommand;
pub use config_cmd::ConfigCommand;
