mod corpus;
mod git_ops;
mod graph;

pub use corpus::{RecipeCorpus, RECIPE_CONFIG_FILE};
pub use git_ops::{files_in_commit, modified_packages, package_of_path};
pub use graph::{load_dependents, GraphBody, GraphDependency, GraphDocument, GraphNode};

#[cfg(test)]
mod tests;
