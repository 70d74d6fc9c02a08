//! Operations over workspaces.

pub mod binary;
