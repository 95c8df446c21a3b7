//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

fn build_stamp(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: build_stamp(option_env!("GIT_HASH")),
        build_time: build_stamp(option_env!("BUILD_TIME")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let version = version_info();
        assert_eq!(version.version, env!("CARGO_PKG_VERSION"));
        assert!(!version.git_hash.is_empty());
        assert!(!version.build_time.is_empty());
    }

    #[test]
    fn test_blank_build_stamp_is_unknown() {
        assert_eq!(build_stamp(None), "unknown");
        assert_eq!(build_stamp(Some("")), "unknown");
        assert_eq!(build_stamp(Some("  ")), "unknown");
        assert_eq!(build_stamp(Some("a1b2c3d")), "a1b2c3d");
    }
}
