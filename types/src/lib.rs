//! Data types for scopestack events.
//!
//! This crate contains pure data with no IO and no async: identifiers,
//! severities, user identity, breadcrumbs and the event payload itself.
//! Every layer of the workspace can depend on it.

mod breadcrumb;
mod event;
mod ids;
mod level;
mod user;

pub use breadcrumb::{Breadcrumb, DEFAULT_MAX_BREADCRUMBS, MAX_BREADCRUMBS};
pub use event::{Event, ExceptionInfo};
pub use ids::EventId;
pub use level::{Level, ParseLevelError};
pub use user::User;
