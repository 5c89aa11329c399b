pub mod cli;
pub mod config;
pub mod error;
pub mod fuel;
pub mod geocode;
pub mod render;
pub mod session;
pub mod sheets;
pub mod stations;
pub mod ui;
pub mod wizard;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::WizardError;
pub use session::Session;
pub use wizard::Wizard;
