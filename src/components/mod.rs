//! UI components.

pub mod atlas;
