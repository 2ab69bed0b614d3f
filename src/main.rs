// Clippy allows
#![allow(clippy::too_many_arguments)]

//! koi-filter: find habitable exoplanet candidates in Kepler KOI tables
//!
//! Usage: koi-filter <COMMAND> [OPTIONS]

use clap::{ArgAction, Parser, Subcommand};
use env_logger::Env;
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use koi_filter::commands::{ColumnsCommand, FilterCommand};
use koi_filter::config::{
    HabitabilityConfig, TableOptions, DEFAULT_DISPOSITION, DEFAULT_INSOLATION_MAX,
    DEFAULT_INSOLATION_MIN, DEFAULT_NAME_COLUMN, DEFAULT_RADIUS_MAX,
};
use koi_filter::filter::FilterReport;
use koi_filter::table::{TableError, TableReader};

#[derive(Parser)]
#[command(name = "koi-filter")]
#[command(version)]
#[command(about = "Find habitable exoplanet candidates in Kepler KOI tables", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select habitable planets and report their names
    Filter {
        /// Input table (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Disposition a planet must have
        #[arg(long, default_value = DEFAULT_DISPOSITION)]
        disposition: String,

        /// Exclusive lower bound on insolation flux
        #[arg(long, default_value_t = DEFAULT_INSOLATION_MIN)]
        insol_min: f64,

        /// Exclusive upper bound on insolation flux
        #[arg(long, default_value_t = DEFAULT_INSOLATION_MAX)]
        insol_max: f64,

        /// Exclusive upper bound on planet radius
        #[arg(long, default_value_t = DEFAULT_RADIUS_MAX)]
        prad_max: f64,

        /// Column reported for each match
        #[arg(long, default_value = DEFAULT_NAME_COLUMN)]
        name_column: String,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// Comment marker; lines starting with it are skipped
        #[arg(long, default_value_t = '#')]
        comment: char,

        /// Write matched rows as delimited text
        #[arg(long)]
        write_matches: bool,

        /// Output file for matched rows (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use smaller I/O buffers
        #[arg(long)]
        low_memory: bool,

        /// Print filter statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// List the columns of a table
    Columns {
        /// Input table (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Field delimiter
        #[arg(short, long, default_value_t = ',')]
        delimiter: char,

        /// Comment marker; lines starting with it are skipped
        #[arg(long, default_value_t = '#')]
        comment: char,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Filter {
            input,
            disposition,
            insol_min,
            insol_max,
            prad_max,
            name_column,
            delimiter,
            comment,
            write_matches,
            output,
            low_memory,
            stats,
        } => run_filter(
            input,
            disposition,
            insol_min,
            insol_max,
            prad_max,
            name_column,
            delimiter,
            comment,
            write_matches,
            output,
            low_memory,
            stats,
        ),

        Commands::Columns {
            input,
            delimiter,
            comment,
        } => run_columns(input, delimiter, comment),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn byte_arg(c: char, name: &str) -> Result<u8, TableError> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| TableError::Config(format!("{} must be a single ASCII character", name)))
}

fn table_options(delimiter: char, comment: char) -> Result<TableOptions, TableError> {
    Ok(TableOptions::new()
        .with_delimiter(byte_arg(delimiter, "delimiter")?)
        .with_comment(Some(byte_arg(comment, "comment marker")?)))
}

/// Refuse an output path that resolves to the input file.
fn ensure_distinct(input: &Path, output: &Path) -> Result<(), TableError> {
    // An output that does not exist yet cannot alias anything
    let Ok(target) = fs::canonicalize(output) else {
        return Ok(());
    };
    if fs::canonicalize(input)? == target {
        return Err(TableError::Config(format!(
            "output '{}' would overwrite the input",
            output.display()
        )));
    }
    Ok(())
}

/// Stream an opened source to the output file, or to stdout.
///
/// The header has already been read and checked by the time the output
/// file is created, so a bad source never truncates it.
fn filter_into<R: Read>(
    cmd: &FilterCommand,
    reader: TableReader<R>,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<FilterReport, TableError> {
    cmd.check_header(reader.header())?;
    match output {
        Some(path) => {
            if let Some(input) = input {
                ensure_distinct(input, path)?;
            }
            let mut file = File::create(path)?;
            cmd.run_streaming(reader, &mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            cmd.run_streaming(reader, &mut handle)
        }
    }
}

fn run_filter(
    input: Option<PathBuf>,
    disposition: String,
    insol_min: f64,
    insol_max: f64,
    prad_max: f64,
    name_column: String,
    delimiter: char,
    comment: char,
    write_matches: bool,
    output: Option<PathBuf>,
    low_memory: bool,
    stats: bool,
) -> Result<(), TableError> {
    let config = HabitabilityConfig::new()
        .with_disposition(disposition)
        .with_insolation_range(insol_min, insol_max)
        .with_radius_max(prad_max);
    debug!("thresholds: {:?}", config);

    let cmd = FilterCommand::new()
        .with_config(config)
        .with_options(table_options(delimiter, comment)?)
        .with_projection(name_column)
        .with_write_matches(write_matches || output.is_some())
        .with_low_memory(low_memory);

    // Matched rows own stdout when they are not sent to a file
    let rows_on_stdout = cmd.write_matches && output.is_none();

    let report = match input.as_deref().filter(|p| *p != Path::new("-")) {
        Some(path) => {
            info!("reading {}", path.display());
            let reader = TableReader::from_path(path, &cmd.options)?;
            filter_into(&cmd, reader, Some(path), output.as_deref())?
        }
        None => {
            info!("reading stdin");
            let stdin = io::stdin();
            let reader = TableReader::with_options(stdin.lock(), &cmd.options)?;
            filter_into(&cmd, reader, None, output.as_deref())?
        }
    };

    if stats {
        eprintln!("Filter stats: {}", report.stats());
    }

    if rows_on_stdout {
        eprintln!("{}", report);
        eprintln!("done processing file");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", report)?;
        writeln!(handle, "done processing file")?;
    }

    Ok(())
}

fn run_columns(input: Option<PathBuf>, delimiter: char, comment: char) -> Result<(), TableError> {
    let cmd = ColumnsCommand::new().with_options(table_options(delimiter, comment)?);
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match input {
        Some(path) if path.to_string_lossy() != "-" => cmd.run(&path, &mut handle)?,
        _ => cmd.run_stdin(&mut handle)?,
    };

    Ok(())
}
