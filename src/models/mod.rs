// src/models/mod.rs

//! Domain models for the relay.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod marker;
mod plan;

// Re-export all public types
pub use config::{
    ArchiveConfig, Config, DiscordConfig, HttpConfig, PortalConfig, RoleMapping, ScheduleConfig,
};
pub use marker::{BotMarker, MARKER_SUFFIX, MarkerKey};
pub use plan::{ChairService, LessonRow, ProperService, TableInformation, TimeInfo, Week};
