//! Unit tests for configuration loading and resolution.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence and environment loading
//! - `field_resolution`: Credential, workspace, and identity resolution
//! - `validation`: URL and timeout validation

mod helpers;
