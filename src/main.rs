use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, prelude::*};

use tabview::controller::Controller;
use tabview::loader::load_dataset;
use tabview::model::{Model, Status};
use tabview::ui::TableUI;
use tabview::{ColumnId, ExpansionMode, SortCollation, SortDirection, TableConfig, TableError};

#[derive(Parser, Debug)]
#[command(version, about = "Browse a table of records in the terminal.")]
struct Args {
    /// CSV, Parquet or Arrow file with name, calories, fat, carbs, protein and detail columns.
    /// The built-in dessert table is shown when omitted.
    data_file: Option<String>,

    /// Rows per page.
    #[arg(long, default_value_t = 2, conflicts_with = "no_pagination")]
    page_size: usize,

    /// Show every matching row on one page.
    #[arg(long)]
    no_pagination: bool,

    #[arg(long, value_enum, default_value_t = ExpansionMode::Global)]
    expansion: ExpansionMode,

    /// Column to sort by at startup.
    #[arg(long, value_enum, default_value_t = ColumnId::Name)]
    sort: ColumnId,

    #[arg(long)]
    descending: bool,

    /// Compare names ignoring case.
    #[arg(long)]
    case_insensitive_sort: bool,

    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn table_config(&self) -> TableConfig {
        TableConfig::default()
            .with_page_size((!self.no_pagination).then_some(self.page_size))
            .with_expansion_mode(self.expansion)
            .with_sort_column(self.sort)
            .with_sort_direction(if self.descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            })
            .with_collation(if self.case_insensitive_sort {
                SortCollation::CaseInsensitive
            } else {
                SortCollation::Raw
            })
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = init_logging(&args).and_then(|_| run(&args));
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

// The terminal belongs to the UI, so logs go to a file.
fn init_logging(args: &Args) -> Result<(), TableError> {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("tabview.log"));
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    info!("Logging to {}", path.display());
    Ok(())
}

fn run(args: &Args) -> Result<(), TableError> {
    info!("Starting tabview!");
    let cfg = args.table_config();
    let records = load_dataset(args.data_file.as_deref())?;
    let name = args.data_file.clone().unwrap_or_else(|| "Desserts".to_string());

    let mut model = Model::init(name, &cfg, records);
    let mut ui = TableUI::new();
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;

        if let Some(message) = controller.handle_event(&model)? {
            model.update(Some(message))?;
        };
    }

    Ok(())
}
