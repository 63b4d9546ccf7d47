//! Manifest configuration
//!
//! The analyzed project and every repository descriptor share one TOML shape.

pub mod manifest;
pub mod validation;

pub use manifest::{
    DependencyConfig, ManagementConfig, Manifest, Project, ProjectConfig, SettingsConfig,
    MANIFEST_NAME,
};
