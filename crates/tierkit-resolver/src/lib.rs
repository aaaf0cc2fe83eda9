mod matrix;
mod select;
mod tiers;
mod types;

pub use matrix::{
    build_matrix, build_matrix_for, default_platforms, BuildConfig, PlatformEntry,
    ANDROID_NDK_VERSION,
};
pub use select::{expand_dependents, select_seeds, SelectionInputs};
pub use tiers::partition_tiers;
pub use types::{PackageRequest, RequestedSet, Tier, VersionSelector};
