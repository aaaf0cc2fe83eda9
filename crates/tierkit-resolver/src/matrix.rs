use anyhow::Result;
use serde::Serialize;
use tierkit_core::{excluded_by_rules, PatternFilter, SelectionConfig};
use tracing::debug;

pub const ANDROID_NDK_VERSION: &str = "28.1.13356709";

/// One CI job: where it runs and which conan profiles it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    pub build_machine: String,
    pub build_profile: String,
    pub host_profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
}

/// A platform name paired with the job that builds for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformEntry {
    pub platform: String,
    pub config: BuildConfig,
}

fn entry(
    platform: &str,
    build_machine: &str,
    build_profile: &str,
    host_profile: &str,
) -> PlatformEntry {
    PlatformEntry {
        platform: platform.to_string(),
        config: BuildConfig {
            build_machine: build_machine.to_string(),
            build_profile: build_profile.to_string(),
            host_profile: host_profile.to_string(),
            ndk_version: None,
        },
    }
}

/// Every platform the CI knows how to build, in job order.
pub fn default_platforms() -> Vec<PlatformEntry> {
    let mut platforms = Vec::new();

    // API 35 satisfies the 16k page size requirement.
    for api in ["35", "23", "21"] {
        for arch in ["armv8", "armv7", "x86", "x86_64"] {
            let platform = format!("android-{api}-{arch}");
            let mut android = entry(
                &platform,
                "ubuntu-24.04",
                "ubuntu-24.04-x86_64-clang-18",
                &platform,
            );
            android.config.ndk_version = Some(ANDROID_NDK_VERSION.to_string());
            platforms.push(android);
        }
    }

    platforms.push(entry(
        "macos-15",
        "macos-15",
        "macos-15-x86_64-apple-clang-14",
        "macos-15-x86_64-apple-clang-14",
    ));
    platforms.push(entry(
        "macos-26",
        "macos-26",
        "macos-26-armv8-apple-clang-14",
        "macos-26-armv8-apple-clang-14",
    ));

    for compiler in ["gcc-13", "gcc-14", "clang-18"] {
        let profile = format!("ubuntu-24.04-x86_64-{compiler}");
        platforms.push(entry("ubuntu-24.04", "ubuntu-24.04", &profile, &profile));
    }

    platforms.push(entry(
        "windows-2022",
        "windows-2022",
        "windows-2022-x86_64-msvc-1940",
        "windows-2022-x86_64-msvc-1940",
    ));

    platforms
}

/// Jobs that should build `reference`.
///
/// Explicit platform patterns replace the configured platform patterns.
pub fn build_matrix(
    reference: &str,
    selection: &SelectionConfig,
    include_platforms: &[String],
    exclude_platforms: &[String],
) -> Result<Vec<BuildConfig>> {
    build_matrix_for(
        &default_platforms(),
        reference,
        selection,
        include_platforms,
        exclude_platforms,
    )
}

pub fn build_matrix_for(
    platforms: &[PlatformEntry],
    reference: &str,
    selection: &SelectionConfig,
    include_platforms: &[String],
    exclude_platforms: &[String],
) -> Result<Vec<BuildConfig>> {
    let platform_filter =
        PatternFilter::with_overrides(&selection.platforms, include_platforms, exclude_platforms)?;
    let profile_filter = selection.profile_filter()?;
    let rules = selection.compiled_rules()?;

    let mut matrix = Vec::new();
    for candidate in platforms {
        let platform = candidate.platform.as_str();
        let profile = candidate.config.host_profile.as_str();
        if !platform_filter.accepts(platform) || !profile_filter.accepts(profile) {
            continue;
        }
        if excluded_by_rules(&rules, reference, platform, profile) {
            debug!(reference, platform, profile, "excluded by selection rule");
            continue;
        }
        matrix.push(candidate.config.clone());
    }
    Ok(matrix)
}
