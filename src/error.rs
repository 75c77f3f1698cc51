//! Error types for tab grouping.

use crate::tab_group::TabId;
use thiserror::Error;

/// Errors returned by [`TabGroupModelFilter`](crate::TabGroupModelFilter).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabGroupError {
    #[error("Unknown tab: {0}")]
    UnknownTab(TabId),

    #[error("Tab already present: {0}")]
    DuplicateTab(TabId),

    #[error("No group with root id {0}")]
    UnknownGroup(TabId),

    #[error("Tabs {0} and {1} are already in the same group")]
    SameGroup(TabId, TabId),
}

pub type Result<T> = std::result::Result<T, TabGroupError>;
