mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use config::{AppConfig, ConfigArgs};
use evidence_deck_adapters::{
    present_artifact, present_import_report, present_photo_row, present_settings, FsImageSource,
    ImageCrateDecoder, JsonDeckExporter, JsonSettingsStore, SqlitePhotoRepository, SystemClock,
};
use evidence_deck_application::{
    AppendPhotoCommand, ApplicationError, ApplicationService, CreateCopyCommand, DeleteAllCommand,
    DeletePhotoCommand, ExportReportCommand, ImageSource, ImportFolderCommand, ListPhotosQuery,
    LoadPhotosCommand, LoadSettingsQuery, OrientationQuery, ReorderCommand, SaveSettingsCommand,
    UpdateFieldCommand,
};
use evidence_deck_domain::{PhotoField, PhotoId, PhotoRecord, ReportType};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "evidence-deck", version, about = "Ordered evidence photo list and report export")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the photo list in report order
    List,
    /// Append one image file as the next photo
    Add {
        path: PathBuf,
        /// Photo number suffix; defaults to the file stem
        #[arg(long)]
        uid: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Append every supported image below a folder
    Import { folder: PathBuf },
    /// Add the copy of an original right after it
    Copy {
        #[arg(value_parser = parse_photo_id)]
        id: PhotoId,
    },
    /// Delete a photo; deleting an original also deletes its copy
    Delete {
        #[arg(value_parser = parse_photo_id)]
        id: PhotoId,
    },
    /// Delete every photo and the saved report details
    DeleteAll {
        #[arg(long)]
        yes: bool,
    },
    /// Move the photo at one list position onto another (1-based)
    Move { from: usize, to: usize },
    /// Change the photo number or description of a photo
    Edit {
        #[arg(value_parser = parse_photo_id)]
        id: PhotoId,
        #[arg(value_parser = parse_photo_field)]
        field: PhotoField,
        value: String,
    },
    /// Report whether a photo is landscape or portrait
    Orientation {
        #[arg(value_parser = parse_photo_id)]
        id: PhotoId,
    },
    /// Reload the list from the database and repair it
    Reconcile,
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Write the report outline for the current list
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        incident: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        bag: Option<String>,
        #[arg(long, value_parser = parse_report_type)]
        report_type: Option<ReportType>,
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();
    let config = AppConfig::from_args(&cli.config);

    let service = build_application_service(&config);
    match service.load_photos(LoadPhotosCommand).await {
        Ok(photos) => debug!(
            photos = photos.len(),
            db = %config.database_path.display(),
            "photo list loaded"
        ),
        Err(error) => {
            eprintln!("failed to load evidence-deck: {error}");
            return ExitCode::from(1);
        }
    }

    match run_command(cli.command, &service).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &AppConfig) -> ApplicationService {
    ApplicationService::new(
        Box::new(SqlitePhotoRepository::new(config.database_path.clone())),
        Box::new(JsonSettingsStore::new(config.settings_path.clone())),
        Box::new(FsImageSource),
        Box::new(ImageCrateDecoder),
        Box::new(JsonDeckExporter),
        Box::new(SystemClock),
        config.persistence,
    )
}

fn parse_photo_id(value: &str) -> Result<PhotoId, String> {
    let raw = value
        .parse::<i64>()
        .map_err(|_| format!("invalid photo id: {value}"))?;
    PhotoId::new(raw).map_err(|error| error.to_string())
}

fn parse_photo_field(value: &str) -> Result<PhotoField, String> {
    PhotoField::parse(value)
        .ok_or_else(|| format!("unknown field: {value} (use uid or description)"))
}

fn parse_report_type(value: &str) -> Result<ReportType, String> {
    ReportType::parse(value)
        .ok_or_else(|| format!("unknown report type: {value} (use full or c1)"))
}

fn runtime(action: &str) -> impl Fn(ApplicationError) -> CommandError + '_ {
    move |error| CommandError::Runtime(format!("{action} failed: {error}"))
}

fn print_rows(photos: &[PhotoRecord]) {
    for photo in photos {
        println!("{}", present_photo_row(photo));
    }
}

async fn run_command(command: Command, service: &ApplicationService) -> Result<(), CommandError> {
    match command {
        Command::List => {
            let photos = service.list_photos(ListPhotosQuery).await;
            if photos.is_empty() {
                println!("no photos in list");
                return Ok(());
            }
            print_rows(&photos);
            Ok(())
        }
        Command::Add {
            path,
            uid,
            description,
        } => {
            let uid_suffix = match uid {
                Some(uid) => uid,
                None => path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        CommandError::Usage(format!(
                            "cannot derive a photo number from {}",
                            path.display()
                        ))
                    })?,
            };
            let image = FsImageSource.load_image(&path).map_err(runtime("add"))?;
            let photo = service
                .append_photo(AppendPhotoCommand {
                    image,
                    uid_suffix,
                    description,
                })
                .await
                .map_err(runtime("add"))?;
            println!("{}", present_photo_row(&photo));
            Ok(())
        }
        Command::Import { folder } => {
            let report = service
                .import_folder(ImportFolderCommand { folder })
                .await
                .map_err(runtime("import"))?;
            println!("{}", present_import_report(&report));
            Ok(())
        }
        Command::Copy { id } => {
            let copy = service
                .create_copy(CreateCopyCommand { id })
                .await
                .map_err(runtime("copy"))?;
            println!("{}", present_photo_row(&copy));
            Ok(())
        }
        Command::Delete { id } => {
            let removed = service
                .delete_photo(DeletePhotoCommand { id })
                .await
                .map_err(runtime("delete"))?;
            println!("deleted {} photo(s)", removed.len());
            Ok(())
        }
        Command::DeleteAll { yes } => {
            if !yes {
                return Err(CommandError::Usage(
                    "delete-all removes every photo and the report details; pass --yes to confirm"
                        .to_string(),
                ));
            }
            service
                .delete_all(DeleteAllCommand)
                .await
                .map_err(runtime("delete-all"))?;
            println!("list cleared");
            Ok(())
        }
        Command::Move { from, to } => {
            let (Some(drag_index), Some(hover_index)) = (from.checked_sub(1), to.checked_sub(1))
            else {
                return Err(CommandError::Usage("list positions start at 1".to_string()));
            };
            let moved = service
                .reorder(ReorderCommand {
                    drag_index,
                    hover_index,
                })
                .await
                .map_err(runtime("move"))?;
            if moved {
                print_rows(&service.list_photos(ListPhotosQuery).await);
            } else {
                println!("nothing to move");
            }
            Ok(())
        }
        Command::Edit { id, field, value } => {
            let touched = service
                .update_field(UpdateFieldCommand { id, field, value })
                .await
                .map_err(runtime("edit"))?;
            if touched.is_empty() {
                println!("no change");
            }
            print_rows(&touched);
            Ok(())
        }
        Command::Orientation { id } => {
            let orientation = service
                .orientation(OrientationQuery { id })
                .await
                .map_err(runtime("orientation"))?;
            println!("photo {id} is {orientation:?}");
            Ok(())
        }
        Command::Reconcile => {
            let photos = service
                .load_photos(LoadPhotosCommand)
                .await
                .map_err(runtime("reconcile"))?;
            println!("list reconciled: {} photo(s)", photos.len());
            Ok(())
        }
        Command::Settings(SettingsCommand::Show) => {
            let settings = service
                .load_settings(LoadSettingsQuery)
                .map_err(runtime("settings"))?;
            println!("{}", present_settings(&settings));
            Ok(())
        }
        Command::Settings(SettingsCommand::Set {
            incident,
            location,
            postal_code,
            bag,
            report_type,
            page_size,
        }) => {
            let mut settings = service
                .load_settings(LoadSettingsQuery)
                .map_err(runtime("settings"))?;
            let metadata = &mut settings.metadata;
            if let Some(incident) = incident {
                metadata.incident_number = incident;
            }
            if let Some(location) = location {
                metadata.location = location;
            }
            if let Some(postal_code) = postal_code {
                metadata.postal_code = postal_code;
            }
            if let Some(bag) = bag {
                metadata.evidence_bag_number = bag;
            }
            if let Some(report_type) = report_type {
                metadata.report_type = report_type;
            }
            if let Some(page_size) = page_size {
                settings.page_size = page_size;
            }

            let errors = settings.metadata.validate();
            if errors.has_errors() {
                let details: Vec<String> = errors
                    .failing_fields()
                    .into_iter()
                    .map(|field| format!("{field}: {}", errors.message(field)))
                    .collect();
                return Err(CommandError::Usage(details.join("\n")));
            }
            service
                .save_settings(SaveSettingsCommand {
                    settings: settings.clone(),
                })
                .map_err(runtime("settings"))?;
            println!("{}", present_settings(&settings));
            Ok(())
        }
        Command::Export { out } => {
            let settings = service
                .load_settings(LoadSettingsQuery)
                .map_err(runtime("export"))?;
            let artifact = service
                .export_report(ExportReportCommand {
                    output_dir: out,
                    field_errors: settings.metadata.validate(),
                })
                .await
                .map_err(runtime("export"))?;
            println!("{}", present_artifact(&artifact));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("evidence-deck").chain(args.iter().copied()))
    }

    #[test]
    fn parse_move_command() {
        let cli = parse(&["move", "3", "1"]).expect("move should parse");
        assert!(matches!(cli.command, Command::Move { from: 3, to: 1 }));
    }

    #[test]
    fn parse_edit_maps_field_names() {
        let cli = parse(&["edit", "4", "uid", "B2"]).expect("edit should parse");
        assert!(matches!(
            cli.command,
            Command::Edit {
                field: PhotoField::UidSuffix,
                ..
            }
        ));
    }

    #[test]
    fn parse_copy_rejects_invalid_id() {
        assert!(parse(&["copy", "abc"]).is_err());
        assert!(parse(&["copy", "0"]).is_err());
    }

    #[test]
    fn parse_settings_set_report_type() {
        let cli = parse(&["settings", "set", "--report-type", "c1", "--page-size", "25"])
            .expect("settings should parse");
        assert!(matches!(
            cli.command,
            Command::Settings(SettingsCommand::Set {
                report_type: Some(ReportType::C1Accidental),
                page_size: Some(25),
                ..
            })
        ));
    }

    #[test]
    fn global_db_flag_reaches_config() {
        let cli = parse(&["list", "--db", "case.sqlite3"]).expect("list should parse");
        let config = AppConfig::from_args(&cli.config);
        assert_eq!(config.database_path, PathBuf::from("case.sqlite3"));
    }

    #[tokio::test]
    async fn move_rejects_zero_position() {
        let dir = TempDir::new().expect("tempdir");
        let config = AppConfig {
            database_path: dir.path().join("photos.sqlite3"),
            settings_path: dir.path().join("settings.json"),
            ..AppConfig::default()
        };
        let service = build_application_service(&config);
        service.load_photos(LoadPhotosCommand).await.expect("load");
        let result = run_command(Command::Move { from: 0, to: 1 }, &service).await;
        assert!(matches!(result, Err(CommandError::Usage(_))));
    }
}
