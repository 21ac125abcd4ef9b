//! Service layer for the relay.
//!
//! This module contains the business logic for:
//! - Portal access and document download (`PortalClient`)
//! - PDF text extraction (`extract_lines`)
//! - Announcement rendering (`ScheduleRenderer`)
//! - Class role lookup (`RoleTable`)

pub mod extract;
pub mod portal;
pub mod renderer;
pub mod roles;

pub use extract::extract_lines;
pub use portal::{DocumentSource, PortalClient};
pub use renderer::{ScheduleRenderer, render_error};
pub use roles::{ClassRoleLookup, RoleTable};
