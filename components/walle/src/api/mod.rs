pub mod cors;
pub mod migrations;
pub mod serve;
pub mod settings;
