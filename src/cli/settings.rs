use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Args, Subcommand};

use crate::{progress::weekly_goal, storage::entities::Metric};

use super::Session;

#[derive(Debug, Subcommand)]
pub enum RepsCommand {
    #[command(about = "List representatives in the order they were added")]
    List,
    #[command(about = "Add a representative")]
    Add { name: String },
    #[command(about = "Remove a representative. Their saved weeks are kept")]
    Remove { name: String },
}

#[derive(Debug, Subcommand)]
pub enum GoalsCommand {
    #[command(about = "Show daily goals and the weekly goals derived from them")]
    Show,
    #[command(about = "Change some of the goals. Goals that aren't given stay as they are")]
    Set(GoalArgs),
}

#[derive(Debug, Args)]
pub struct GoalArgs {
    #[arg(long)]
    calls_daily: Option<u32>,
    #[arg(long)]
    emails_daily: Option<u32>,
    #[arg(long)]
    contacts_daily: Option<u32>,
    #[arg(long)]
    responses_daily: Option<u32>,
    #[arg(long)]
    contacts_weekly: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum LogoCommand {
    #[command(about = "Store an image file as the logo")]
    Set { path: PathBuf },
    #[command(about = "Print the stored logo as a data url")]
    Show,
}

pub fn process_reps_command(session: &mut Session, command: RepsCommand) -> Result<()> {
    match command {
        RepsCommand::List => {
            for name in session.state.roster.names() {
                println!("{name}");
            }
        }
        RepsCommand::Add { name } => {
            if !session.state.add_rep(&mut session.store, &name)? {
                bail!("Failed to save the roster");
            }
            session.print_status();
        }
        RepsCommand::Remove { name } => {
            if !session.state.roster.contains(&name) {
                bail!("{name:?} is not on the roster");
            }
            if !session.state.remove_rep(&mut session.store, &name) {
                bail!("Failed to save the roster");
            }
            println!("Removed {name}. Their saved data was kept.");
        }
    }
    Ok(())
}

pub fn process_goals_command(session: &mut Session, command: GoalsCommand) -> Result<()> {
    match command {
        GoalsCommand::Show => {}
        GoalsCommand::Set(GoalArgs {
            calls_daily,
            emails_daily,
            contacts_daily,
            responses_daily,
            contacts_weekly,
        }) => {
            let goals = &mut session.state.goals;
            goals.calls_daily = calls_daily.unwrap_or(goals.calls_daily);
            goals.emails_daily = emails_daily.unwrap_or(goals.emails_daily);
            goals.contacts_daily = contacts_daily.unwrap_or(goals.contacts_daily);
            goals.responses_daily = responses_daily.unwrap_or(goals.responses_daily);
            goals.contacts_weekly = contacts_weekly.unwrap_or(goals.contacts_weekly);

            if !session.state.save_goals(&mut session.store) {
                bail!("Failed to save goals");
            }
            session.print_status();
        }
    }

    let goals = &session.state.goals;
    println!("{:<10}{:>8}{:>8}", "", "Daily", "Weekly");
    for metric in Metric::ALL {
        println!(
            "{:<10}{:>8}{:>8}",
            metric.label(),
            goals.daily(metric),
            weekly_goal(metric, goals)
        );
    }
    Ok(())
}

pub fn process_logo_command(session: &mut Session, command: LogoCommand) -> Result<()> {
    match command {
        LogoCommand::Set { path } => {
            let data_url = read_data_url(&path)?;
            if !session.state.set_logo(&mut session.store, data_url) {
                bail!("Failed to save logo, the file might be too large");
            }
            session.print_status();
        }
        LogoCommand::Show => match &session.state.logo {
            Some(logo) => println!("{logo}"),
            None => println!("No logo set"),
        },
    }
    Ok(())
}

/// Reads an image into a `data:` url, which is how the logo is kept in the store.
pub fn read_data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {path:?}"))?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|v| v.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
