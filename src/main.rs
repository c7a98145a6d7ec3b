// dialnorm - normalize PBX dialing patterns for cloud calling dial plans.
//
// Data lines go to stdout; conflict resolutions, warnings and the summary
// go to stderr so the output can be piped on as-is.

use std::{
    error::Error,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use env_logger::Env;

use dialnorm::{normalize_catalogs, records};

#[derive(Parser)]
#[command(name = "dialnorm")]
#[command(about = "Expand bracket-range dialing patterns into literal dial-plan patterns")]
#[command(version)]
struct Cli {
    /// Delimited file with catalog,pattern records (no header row)
    input: PathBuf,

    /// Field delimiter of the input file
    #[arg(long, default_value = ",")]
    delimiter: char,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn delimiter_byte(delimiter: char) -> Option<u8> {
    u8::try_from(delimiter).ok().filter(u8::is_ascii)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let delimiter =
        delimiter_byte(cli.delimiter).ok_or("delimiter must be a single ASCII character")?;

    let input_records = records::read_records_from_path(&cli.input, delimiter)?;
    let outcome = normalize_catalogs(input_records)?;

    for conflict in &outcome.conflicts {
        eprint!("{conflict}");
    }

    let stdout = io::stdout().lock();
    let mut stdout = io::BufWriter::new(stdout);
    for (catalog, patterns) in &outcome.patterns {
        for pattern in patterns {
            writeln!(stdout, "{catalog},{pattern}")?;
        }
    }
    stdout.flush()?;

    for summary in &outcome.summaries {
        eprintln!("{summary}");
    }
    let (before, after) = outcome.totals();
    eprintln!("{before} patterns normalized to {after} patterns");

    Ok(())
}
