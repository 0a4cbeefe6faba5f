pub mod dates;
pub mod export;
pub mod settings;
pub mod week;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use export::{process_export_command, ExportCommand};
use settings::{
    process_goals_command, process_logo_command, process_reps_command, GoalsCommand, LogoCommand,
    RepsCommand,
};
use tracing::level_filters::LevelFilter;
use week::{process_log_command, process_show_command, LogCommand, ShowCommand};

use crate::{
    state::TrackerState,
    storage::{kv_store::FileStore, record_store::RecordStore},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

const STORE_FILE_NAME: &str = "store.json";

#[derive(Parser, Debug)]
#[command(name = "sales-tracker", version, long_about = None)]
#[command(about = "Application for logging weekly sales outreach activity", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "List, add or remove sales representatives")]
    Reps {
        #[command(subcommand)]
        command: RepsCommand,
    },
    #[command(about = "Show or change daily and weekly goals")]
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },
    #[command(about = "Enter a day's numbers for a representative and save the week")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show a representative's week against the goals")]
    Show {
        #[command(flatten)]
        command: ShowCommand,
    },
    #[command(about = "Export every saved week into a spreadsheet")]
    Export {
        #[command(flatten)]
        command: ExportCommand,
    },
    #[command(about = "Set or show the logo")]
    Logo {
        #[command(subcommand)]
        command: LogoCommand,
    },
}

/// What every command works with: the opened store and the state restored from it.
pub struct Session {
    pub app_dir: PathBuf,
    pub store: RecordStore<FileStore>,
    pub state: TrackerState,
}

impl Session {
    pub fn open(app_dir: PathBuf) -> Result<Self> {
        let store = RecordStore::new(FileStore::new(app_dir.join(STORE_FILE_NAME))?);
        let state = TrackerState::load(&store, Box::new(DefaultClock))?;
        Ok(Self {
            app_dir,
            store,
            state,
        })
    }

    /// Prints the status left by the last action, if any.
    pub fn print_status(&self) {
        if let Some(status) = self.state.visible_status() {
            println!("{}", status.text);
        }
    }
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let mut session = Session::open(app_dir)?;

    match args.commands {
        Commands::Reps { command } => process_reps_command(&mut session, command),
        Commands::Goals { command } => process_goals_command(&mut session, command),
        Commands::Log { command } => process_log_command(&mut session, command),
        Commands::Show { command } => process_show_command(&mut session, command),
        Commands::Export { command } => process_export_command(&mut session, command),
        Commands::Logo { command } => process_logo_command(&mut session, command),
    }
}
