use anyhow::Result;

use crate::command_flows::{
    run_commits_command, run_export_command, run_lock_command, run_matrix_command,
    run_references_command, run_tiers_command, run_versions_command,
};
use crate::completion::write_completions_script;
use crate::github::GithubEnv;
use crate::render::current_output_style;
use crate::workspace::Workspace;
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let style = current_output_style(cli.color);

    if let Commands::Completions { shell } = cli.command {
        return write_completions_script(shell, &mut std::io::stdout());
    }
    if let Commands::Commits = cli.command {
        return run_commits_command();
    }

    let workspace = Workspace::load(cli.root.as_deref(), cli.config.as_deref())?;
    let github = GithubEnv::from_env()?;

    match cli.command {
        Commands::Versions { json } => run_versions_command(&workspace, json),
        Commands::References(args) => run_references_command(&workspace, github.as_ref(), &args),
        Commands::Tiers(args) => run_tiers_command(&workspace, github.as_ref(), &args),
        Commands::Matrix(args) => run_matrix_command(&workspace, github.as_ref(), &args),
        Commands::Export(args) => run_export_command(&workspace, &args, style),
        Commands::Lock(args) => run_lock_command(&workspace, &args, style),
        Commands::Commits | Commands::Completions { .. } => Ok(()),
    }
}
