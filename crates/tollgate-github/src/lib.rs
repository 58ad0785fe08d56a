//! GitHub integration: the pull request files API, the workflow event
//! payload, and the Actions input/output channels.

pub mod actions;
pub mod client;
pub mod event;
