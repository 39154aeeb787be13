//! Build identification
//!
//! Stamped by `build.rs`; shown in the page footer and logged by both
//! binaries on startup.

use axum::response::Json;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub build_profile: &'static str,
}

impl BuildInfo {
    pub const CURRENT: BuildInfo = BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        build_profile: env!("BUILD_PROFILE"),
    };
}

/// `v0.1.0 [1a2b3c4d] built 2024-01-01T00:00:00Z (release)`
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} [{}] built {} ({})",
            self.version, self.git_hash, self.build_timestamp, self.build_profile
        )
    }
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo::CURRENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_startup_line() {
        let info = BuildInfo {
            version: "1.2.3",
            git_hash: "abcd1234",
            build_timestamp: "2024-05-01T10:00:00Z",
            build_profile: "release",
        };
        assert_eq!(
            info.to_string(),
            "v1.2.3 [abcd1234] built 2024-05-01T10:00:00Z (release)"
        );
        assert_eq!(BuildInfo::CURRENT.version, env!("CARGO_PKG_VERSION"));
    }
}
