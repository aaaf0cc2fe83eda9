mod catalog;
mod config;
mod dependents;
mod error;
mod recipe_config;
mod reference;
mod selection;
mod version;

pub use catalog::Catalog;
pub use config::{
    WorkspaceConfig, WorkspacePaths, DEFAULT_MAX_TIER, DEFAULT_PROFILES_DIR, DEFAULT_RECIPES_DIR,
    DEFAULT_SELECTION_CONFIG, MAX_TIER_LIMIT, WORKSPACE_CONFIG_FILE,
};
pub use dependents::DependentsMap;
pub use error::SelectionError;
pub use recipe_config::{RecipeConfig, RecipeVersionEntry};
pub use reference::{PackageInfo, PackageReference};
pub use selection::{
    excluded_by_rules, CompiledRule, OneOrMany, PatternFilter, PatternLists, PatternSet,
    RuleKind, SelectionConfig, SelectionRule,
};
pub use version::RecipeVersion;
