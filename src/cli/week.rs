use ansi_term::Colour;
use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;

use crate::{
    progress::{Progress, ProgressTier},
    storage::entities::{Metric, WorkDay},
};

use super::{
    dates::{parse_week, DateStyle, DATE_HELP},
    Session,
};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(long, help = "Representative the numbers belong to")]
    rep: String,
    #[arg(long, help = DATE_HELP)]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, value_enum)]
    day: WorkDay,
    #[arg(long, help = "Calls made. An empty value clears the field")]
    calls: Option<String>,
    #[arg(long, help = "Emails sent. An empty value clears the field")]
    emails: Option<String>,
    #[arg(long, help = "Contacts made. An empty value clears the field")]
    contacts: Option<String>,
    #[arg(long, help = "Responses received. An empty value clears the field")]
    responses: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ShowCommand {
    #[arg(long)]
    rep: String,
    #[arg(long, help = DATE_HELP)]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

fn select(session: &mut Session, rep: &str, date: Option<&str>, style: DateStyle) -> Result<()> {
    if !session.state.roster.contains(rep) {
        bail!("{rep:?} is not on the roster. Add it with `sales-tracker reps add`");
    }
    let week = parse_week(date, style, Local::now())?;
    session.state.select_rep(&session.store, Some(rep));
    session.state.select_week(&session.store, week.date())?;
    Ok(())
}

/// Applies the given fields to one day and saves the whole week.
pub fn process_log_command(
    session: &mut Session,
    LogCommand {
        rep,
        date,
        date_style,
        day,
        calls,
        emails,
        contacts,
        responses,
    }: LogCommand,
) -> Result<()> {
    select(session, &rep, date.as_deref(), date_style)?;

    let fields = [
        (Metric::Calls, calls),
        (Metric::Emails, emails),
        (Metric::Contacts, contacts),
        (Metric::Responses, responses),
    ];
    for (metric, input) in fields {
        if let Some(input) = input {
            session.state.update_day_data(day, metric, &input)?;
        }
    }

    let saved = session.state.save_week(&mut session.store);
    session.print_status();
    if !saved {
        bail!("Failed to save week of {} for {rep}", session.state.week_start);
    }
    print_day(session, day);
    Ok(())
}

pub fn process_show_command(
    session: &mut Session,
    ShowCommand {
        rep,
        date,
        date_style,
    }: ShowCommand,
) -> Result<()> {
    select(session, &rep, date.as_deref(), date_style)?;

    println!("{rep}, week of {}", session.state.week_start);
    println!();
    for progress in session.state.week_progress() {
        println!("{}", format_progress(&progress));
    }
    println!();
    for day in WorkDay::ALL {
        print_day(session, day);
    }
    Ok(())
}

fn print_day(session: &Session, day: WorkDay) {
    let date = session.state.week_start.date_of(day);
    println!("{day} {}", date.format("%b %-d, %Y"));
    let entry = session.state.week_data.day(day);
    for progress in session.state.day_progress(day) {
        // Fields that were never entered are shown blank instead of as zero.
        if entry.get(progress.metric).is_none() {
            println!("  {:<10}{:>6}  (Goal: {})", progress.metric.label(), "-", progress.goal);
        } else {
            println!("  {}", format_progress(&progress));
        }
    }
}

fn format_progress(progress: &Progress) -> String {
    let filled = (*progress.bar_fill() / 100. * BAR_WIDTH as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let colour = match progress.tier() {
        ProgressTier::Achieved => Colour::Green,
        ProgressTier::Close => Colour::Yellow,
        ProgressTier::Behind => Colour::Purple,
    };
    format!(
        "{:<10}{:>6} / {:<6} {} {}{}",
        progress.metric.label(),
        progress.value,
        progress.goal,
        colour.paint(bar),
        progress.percent,
        if progress.achieved() { " 🎉" } else { "" }
    )
}
