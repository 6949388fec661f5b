//! # User Interface Module
//!
//! Dear ImGui integration for the viewer's panels.
//!
//! The [`UiManager`] owns the ImGui context, platform glue and wgpu
//! renderer, and reports whether the UI wants to capture input so camera
//! controls are suppressed while a panel is focused. [`panel`] holds the
//! navigation settings panel (the five toggles that drive the mode switch)
//! and the asset status panel.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{navigation_panel, status_panel};
