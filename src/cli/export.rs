use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

use crate::{
    error::ExportError,
    export::{build_export, spreadsheet::WorkbookFormat, write_export},
    utils::{
        clock::{Clock, DefaultClock},
        dir::ensure_dir,
    },
};

use super::Session;

#[derive(Debug, Parser)]
pub struct ExportCommand {
    #[arg(
        long,
        help = "Directory the export is written into. Defaults to the current directory"
    )]
    out: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "xlsx")]
    format: WorkbookFormat,
}

pub fn process_export_command(
    session: &mut Session,
    ExportCommand { out, format }: ExportCommand,
) -> Result<()> {
    let bundle = match build_export(&session.store, &session.state.goals) {
        Ok(bundle) => bundle,
        Err(e @ ExportError::NothingToExport) => {
            println!("{e}");
            bail!(e);
        }
    };

    let dir = match out {
        Some(dir) => ensure_dir(dir)?,
        None => std::env::current_dir()?,
    };
    let path = write_export(&bundle, format.writer().as_ref(), &dir, DefaultClock.today())?;

    println!("{}", bundle.report());
    println!("Written to {}", path.display());
    Ok(())
}
