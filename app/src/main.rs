//! FILENAME: app/src/main.rs
// PURPOSE: Command line entry point: inspect, edit and import study matrices.
// FORMAT: seq|level|category|message

use std::path::PathBuf;
use std::process::ExitCode;

use app_lib::{
    http_store, init_logging, log_error, CellUpdateInput, MatrixView, ViewConfig, ViewError,
};
use clap::{Parser, Subcommand};
use engine::GridCoord;
use persistence::ImportFile;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON config file; `MATRIX_*` environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    study_id: String,
    /// Matrix path inside the study, e.g. `input/load/series/load_fr`
    path: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the grid as tab separated values
    Show {
        #[arg(short, long, default_value_t = 20)]
        rows: usize,
    },
    /// Set grid cells and flush them in one request. Cells are `row,col=value`.
    Set {
        #[arg(required = true)]
        cells: Vec<String>,
    },
    /// Replace the matrix with a delimited text file
    Import { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("cannot start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("CLI", "{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ViewConfig, ViewError> {
    let config = match path {
        Some(path) => ViewConfig::from_file(path)?,
        None => ViewConfig::default(),
    };
    Ok(config.apply_env()?)
}

async fn run(cli: Cli, config: ViewConfig) -> Result<(), ViewError> {
    let store = http_store(&config)?;
    let mut view = MatrixView::new(store, cli.study_id, cli.path, config);
    view.load().await?;

    match cli.command {
        Command::Show { rows } => print_grid(&mut view, rows),
        Command::Set { cells } => {
            let inputs: Vec<CellUpdateInput> =
                cells.iter().filter_map(|c| parse_cell_arg(c)).collect();
            let result = view.edit_cells(&inputs);
            if result.applied < cells.len() {
                let skipped = cells.len() - result.applied;
                eprintln!("{} of {} cells were not editable", skipped, cells.len());
            }
            let flushed = view.flush().await?;
            println!("{} cells saved", flushed);
        }
        Command::Import { file } => {
            let file = ImportFile::from_path(&file).map_err(ViewError::from)?;
            view.import(&file).await?;
            println!("imported {} rows", view.row_count());
        }
    }
    Ok(())
}

fn print_grid<S: persistence::MatrixStore>(view: &mut MatrixView<S>, rows: usize) {
    let titles: Vec<&str> = view.columns().iter().map(|c| c.title.as_str()).collect();
    println!("{}", titles.join("\t"));

    let rows = rows.min(view.row_count());
    for row in 0..rows {
        let line: Vec<String> = (0..view.column_count())
            .map(|col| view.resolve_cell(GridCoord::new(col, row)).display())
            .collect();
        println!("{}", line.join("\t"));
    }
}

/// "row,col=value" -> grid cell input
fn parse_cell_arg(arg: &str) -> Option<CellUpdateInput> {
    let (coord, value) = arg.split_once('=')?;
    let (row, col) = coord.split_once(',')?;
    let row = row.trim().parse().ok()?;
    let col = col.trim().parse().ok()?;
    Some(CellUpdateInput::new(col, row, value))
}
