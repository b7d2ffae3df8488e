//! Media Mover - browse local music albums and pull albums from remote
//! hosts over SSH/SFTP.
//!
//! The binary entry point lives in `main.rs`; everything else is exposed
//! here so integration tests can exercise the same modules.

pub mod config;
pub mod controller;
pub mod library;
pub mod site;
pub mod ssh;
pub mod transfer;
pub mod ui;

pub use controller::MoverController;
