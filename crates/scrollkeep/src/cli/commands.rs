use super::render::{render_messages, render_tree};
use super::setup::{Cli, Commands};
use super::watch;
use anyhow::{bail, Context, Result};
use scrollkeepapp::api::ScrollkeepApi;
use scrollkeepapp::commands::{CmdResult, MessageLevel};
use scrollkeepapp::init::initialize;
use scrollkeepapp::store::fs_backend::FsBackend;

pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
    let ctx = initialize(&cwd, cli.vault)?;
    let mut api = ctx.api;

    let healed = api.heal()?;
    let command = cli.command.unwrap_or(Commands::Tree {
        path: None,
        json: false,
    });

    if let Commands::Heal = command {
        return finish(healed);
    }
    print_startup_heal(&healed);

    match command {
        Commands::Heal => Ok(()),
        Commands::Tree { path, json } => tree(&api, path.as_deref(), json),
        Commands::Add { paths } => finish(api.add_notes(paths.as_slice())?),
        Commands::Rm { paths } => finish(api.remove_notes(paths.as_slice())?),
        Commands::Done { paths } => finish(api.complete(paths.as_slice())?),
        Commands::Reopen { paths } => finish(api.reopen(paths.as_slice())?),
        Commands::Mv { from, to } => finish(api.move_note(&from, &to)?),
        Commands::Watch => watch::run(&mut api, &ctx.vault),
    }
}

/// Only what the startup pass actually changed or failed at.
fn print_startup_heal(result: &CmdResult) {
    let notable: Vec<_> = result
        .messages
        .iter()
        .filter(|m| m.level != MessageLevel::Success)
        .cloned()
        .collect();
    if !notable.is_empty() {
        eprint!("{}", render_messages(&notable));
    }
}

fn tree(api: &ScrollkeepApi<FsBackend>, path: Option<&str>, json: bool) -> Result<()> {
    if json {
        match path {
            None => println!("{}", api.snapshot_json()?),
            Some(_) => {
                let result = api.list(path)?;
                println!("{}", serde_json::to_string_pretty(&result.listed_nodes)?);
            }
        }
        return Ok(());
    }
    let result = api.list(path)?;
    print!("{}", render_tree(&result.listed_nodes));
    Ok(())
}

fn finish(result: CmdResult) -> Result<()> {
    print!("{}", render_messages(&result.messages));
    if result.has_errors() {
        bail!("some changes could not be applied");
    }
    Ok(())
}
