pub mod address;
pub mod application;
pub mod settings;
