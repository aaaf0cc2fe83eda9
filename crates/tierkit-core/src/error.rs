use thiserror::Error;

/// Operator-facing failures of package selection and tiering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("requested package '{name}' is not in the recipe catalog")]
    UnknownPackage { name: String },

    #[error("requested version '{version}' of package '{name}' is not in the recipe catalog")]
    UnknownVersion { name: String, version: String },

    #[error(
        "selection needs {required} build tiers but only tiers 0..={max_tier} are configured; \
         raise max_tier (tierkit.toml or --max-tier) and add the matching CI stages"
    )]
    TierOverflow { max_tier: usize, required: usize },
}
