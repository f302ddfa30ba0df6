//! Command-line front end for slideshow projects

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use slideshow_curator::state::parse_timestamp;
use slideshow_curator::{AppState, ImageRecord, ProjectStore, RecordPatch, StoreError};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "curator", version, about = "Curate the images of a slideshow project folder")]
struct Cli {
    /// Project folder (defaults to the last opened project)
    #[arg(short, long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a project folder and make it the default
    Open { folder: PathBuf },
    /// List the images in slideshow order
    List {
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy images into the project and register them
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Change the settings of one image
    Set(SetArgs),
    /// Forget an image but keep its file
    Remove { name: String },
    /// Delete an image file and its record
    Delete { name: String },
    /// Put images in the given order; unlisted ones move to the end
    Reorder {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Images in the folder that are not part of the project
    Untracked,
    /// Images the slideshow shows at a given time
    Visible {
        /// Time as YYYY-MM-DDTHH:mm (defaults to now)
        #[arg(long, value_name = "TIME")]
        at: Option<String>,
    },
}

#[derive(Args)]
struct SetArgs {
    name: String,
    #[arg(long, value_name = "BOOL")]
    always_show: Option<bool>,
    #[arg(long, value_name = "TIME", conflicts_with = "clear_start")]
    start: Option<String>,
    #[arg(long)]
    clear_start: bool,
    #[arg(long, value_name = "TIME", conflicts_with = "clear_end")]
    end: Option<String>,
    #[arg(long)]
    clear_end: bool,
}

impl SetArgs {
    fn patch(&self) -> RecordPatch {
        RecordPatch {
            always_show: self.always_show,
            start: bound(&self.start, self.clear_start),
            end: bound(&self.end, self.clear_end),
        }
    }
}

fn bound(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let state = AppState::new();

    if let Command::Open { folder } = &cli.command {
        let records = state.open_project(folder)?;
        println!("Opened {} ({} images)", folder.display(), records.len());
        return Ok(());
    }

    let folder = match cli.project {
        Some(folder) => folder,
        None => state
            .config
            .lock()
            .ok()
            .and_then(|config| config.last_project.clone())
            .map(PathBuf::from)
            .ok_or(StoreError::MissingProject)?,
    };
    // Only `open` reconciles on the way in and changes the remembered project
    state.set_project(ProjectStore::open(&folder)?);

    match cli.command {
        Command::Open { .. } => {}
        Command::List { json } => {
            let records = state.with_project(|store| store.reconcile())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
            }
        }
        Command::Add { files } => {
            for file in files {
                let name = state.with_project(|store| store.import_file(&file))?;
                println!("Added {}", name);
            }
        }
        Command::Set(args) => {
            let patch = args.patch();
            state.with_project(|store| store.upsert(&args.name, Some(&patch)))?;
        }
        Command::Remove { name } => {
            if !state.with_project(|store| store.remove(&name))? {
                println!("{} had no record", name);
            }
        }
        Command::Delete { name } => {
            let outcome = state.with_project(|store| store.delete_image(&name))?;
            println!(
                "Deleted {} (file {}, record {})",
                outcome.name,
                if outcome.file_deleted { "removed" } else { "already gone" },
                if outcome.record_removed { "removed" } else { "not found" },
            );
        }
        Command::Reorder { names } => {
            let records = state.with_project(|store| store.reorder(&names))?;
            print_records(&records);
        }
        Command::Untracked => {
            for name in state.with_project(|store| store.untracked())? {
                println!("{}", name);
            }
        }
        Command::Visible { at } => {
            let at = match at {
                Some(value) => parse_timestamp(&value).ok_or(StoreError::InvalidTimestamp(value))?,
                None => Local::now().naive_local(),
            };
            print_records(&state.with_project(|store| store.visible_at(at))?);
        }
    }

    Ok(())
}

fn print_records(records: &[ImageRecord]) {
    if records.is_empty() {
        println!("No images");
        return;
    }

    let width = records.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for (i, record) in records.iter().enumerate() {
        println!(
            "{:>3}. {:<width$}  {:<6}  {:<16}  {}",
            i + 1,
            record.name,
            if record.always_show { "always" } else { "window" },
            record.start.as_deref().unwrap_or("-"),
            record.end.as_deref().unwrap_or("-"),
            width = width,
        );
    }
}
