use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use redtimeline::export::{export_to_png, ExportOptions};
use redtimeline::file_export::{export_state, import_state};
use redtimeline::notify::{LogNotifier, Notifier, ToastKind};
use redtimeline::panel::build_app_panel;
use redtimeline::rendering::raster::SoftwareRasterizer;
use redtimeline::theme::{ThemeMode, ThemeState};

#[derive(Parser)]
#[command(name = "redtimeline", version, about = "Timeline panel exports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the timeline from a state file and capture a PNG snapshot
    ExportPng {
        /// Timeline state JSON (config + events)
        state: PathBuf,
        /// Output directory for the download
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Filename date stamp, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Render with the light theme instead of the default dark
        #[arg(long)]
        light: bool,
    },
    /// Re-emit the state as a dated JSON download
    ExportJson {
        state: PathBuf,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Validate a previously exported timeline JSON file
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut notifier = LogNotifier;

    match cli.command {
        Command::ExportPng { state, out, date, light } => {
            let state = import_state(&state).context("failed to load timeline state")?;
            let mut doc = build_app_panel(&state);

            let mut theme = ThemeState::new();
            if light {
                theme.set_mode(ThemeMode::Light);
            }
            theme.apply_to(&mut doc);

            let opts = ExportOptions { out_dir: out, date, ..Default::default() };
            match export_to_png(&mut doc, Some(&state.config), &SoftwareRasterizer, &opts).await {
                Ok(path) => {
                    notifier.notify("PNG exported successfully", ToastKind::Success);
                    println!("{}", path.display());
                }
                Err(e) => {
                    notifier.notify("Failed to export PNG", ToastKind::Error);
                    return Err(e.into());
                }
            }
        }
        Command::ExportJson { state, out } => {
            let state = import_state(&state).context("failed to load timeline state")?;
            let date = chrono::Local::now().date_naive();
            match export_state(&state, &out, date) {
                Ok(path) => {
                    notifier.notify("JSON exported successfully", ToastKind::Success);
                    println!("{}", path.display());
                }
                Err(e) => {
                    notifier.notify("Failed to export JSON", ToastKind::Error);
                    return Err(e.into());
                }
            }
        }
        Command::Import { file } => match import_state(&file) {
            Ok(state) => {
                notifier.notify("Timeline imported successfully", ToastKind::Success);
                println!("{} events between {} and {}", state.events.len(), state.config.start_date, state.config.end_date);
            }
            Err(e) => {
                notifier.notify(&e.to_string(), ToastKind::Error);
                return Err(e.into());
            }
        },
    }
    Ok(())
}
