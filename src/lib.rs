//! Mod lifecycle engine for Slackers - Carts of Glory. Installs come from
//! manifest-carrying zip archives; every written file is tracked in a
//! registry kept inside the game directory, so mods can be cleanly removed,
//! quarantined, and checked against each other for file conflicts. A
//! first-run backup of the whole game tree makes everything reversible.

pub mod archive;
pub mod backup;
pub mod cli;
pub mod config;
pub mod conflict;
pub mod error;
pub mod game;
pub mod install;
pub mod logging;
pub mod patch;
pub mod prompt;
pub mod quarantine;
pub mod registry;
pub mod repo;
pub mod version;

pub use error::Error;
