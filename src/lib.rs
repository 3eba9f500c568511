pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod playback;
pub mod rotation;
pub mod session;
pub mod settings;
pub mod timer;
