//! Release planning and publishing.

pub mod planner;
pub mod publish;

pub use planner::{LibraryRelease, ReleasePlan, collect_library_commits, plan_release};
pub use publish::{PendingTag, pending_tags, push_release, stage_release, tag_releases};
