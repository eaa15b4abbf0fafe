use std::{io, path::PathBuf};

use anyhow::Context as _;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wilayah2sql::{config, Converter, DirSink, EmptyPolicy, QuotePolicy, StreamSink};

/// Convert administrative-region CSV files into SQL insert statements.
#[derive(StructOpt)]
struct Opt {
    /// Directory the CSV files are read from.
    #[structopt(long = "data-dir", default_value = "../data")]
    data_dir: PathBuf,
    /// Directory the SQL files are written to.
    ///
    /// Defaults to the data directory.
    #[structopt(long = "output-dir")]
    output_dir: Option<PathBuf>,
    /// JSON file describing the entities to convert.
    #[structopt(long = "config")]
    config: Option<PathBuf>,
    /// Only convert the named entity; may be repeated.
    #[structopt(long = "only")]
    only: Vec<String>,
    /// Handling of quotes and backslashes in names: verbatim, escape or reject.
    #[structopt(long = "quoting", default_value = "escape")]
    quoting: QuotePolicy,
    /// Handling of inputs without data rows: empty-file or error.
    #[structopt(long = "on-empty", default_value = "empty-file")]
    on_empty: EmptyPolicy,
    /// Write statements to standard output instead of files.
    #[structopt(long = "stdout")]
    stdout: bool,
    /// Increase log verbosity.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: u8,
}

impl Opt {
    fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            })
        })
    }
}

fn run(opt: &Opt) -> anyhow::Result<()> {
    let entities = match &opt.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("unable to load {}", path.display()))?,
        None => config::DEFAULT_ENTITIES.to_vec(),
    };
    let selected = config::select(&entities, &opt.only)?;
    let converter = Converter::new(&opt.data_dir)
        .quoting(opt.quoting)
        .on_empty(opt.on_empty);

    let summaries = if opt.stdout {
        let stdout = io::stdout();
        let mut sink = StreamSink::new(io::BufWriter::new(stdout.lock()));
        converter.convert_all(selected, &mut sink)?
    } else {
        let output_dir = opt.output_dir.as_ref().unwrap_or(&opt.data_dir);
        let mut sink = DirSink::open(output_dir)?;
        converter.convert_all(selected, &mut sink)?
    };
    let rows: usize = summaries.iter().map(|s| s.rows).sum();
    info!(entities = summaries.len(), rows, "done");
    Ok(())
}

fn main() {
    let opt = Opt::from_args();
    tracing_subscriber::fmt()
        .with_env_filter(opt.log_filter())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&opt) {
        for (i, e) in e.chain().enumerate() {
            if i == 0 {
                eprintln!("{}", e);
            } else {
                eprintln!("caused by: {}", e);
            }
        }
        std::process::exit(1);
    }
}
