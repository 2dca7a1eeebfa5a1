use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use texsplit::config::parse_renderer_args;
use texsplit::{ConfigError, Outcome, SplitConfig, SplitPipelineBuilder, SplitReport, DEFAULT_RENDERER, DEFAULT_SPLIT_LINE};

/// Compile a LaTeX document once and split the PDF at marked lines.
#[derive(Parser, Debug)]
#[command(name = "texsplit", version, about)]
struct Args {
    /// LaTeX source to compile
    #[arg(short, long)]
    file: PathBuf,

    /// Renderer executable
    #[arg(short = 'c', long, default_value = DEFAULT_RENDERER)]
    compiler: String,

    /// Extra renderer arguments, split like a shell command line
    #[arg(long, allow_hyphen_values = true)]
    args: Option<String>,

    /// Source line that marks a split point
    #[arg(short, long, default_value = DEFAULT_SPLIT_LINE, allow_hyphen_values = true)]
    split: String,

    /// Directory the renderer runs in and the outputs are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of merge workers (defaults to one per core)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Merge sections one at a time on the main thread
    #[arg(long, conflicts_with = "jobs")]
    sequential: bool,

    /// Give up on the renderer after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Give up on a single section merge after this many seconds
    #[arg(long, value_name = "SECS")]
    part_timeout: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<SplitConfig, ConfigError> {
        let renderer_args = match self.args.as_deref() {
            Some(args) => parse_renderer_args(args)?,
            None => Vec::new(),
        };
        Ok(SplitConfig::new(self.file)
            .with_renderer(self.compiler)
            .with_renderer_args(renderer_args)
            .with_split_line(self.split)
            .with_working_dir(self.output_dir)
            .with_jobs(self.jobs)
            .with_sequential(self.sequential)
            .with_render_timeout(self.timeout.map(Duration::from_secs))
            .with_partition_timeout(self.part_timeout.map(Duration::from_secs)))
    }
}

/// A run fails only if every attempted section failed. Sections that did
/// fail are listed in the report either way.
fn exit_code(report: &SplitReport) -> ExitCode {
    match report.outcome() {
        Outcome::Complete | Outcome::Partial => ExitCode::SUCCESS,
        Outcome::Failed => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("texsplit=info")).init();

    let args = Args::parse();
    let json = args.json;

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = SplitPipelineBuilder::new().with_config(config).build().and_then(|p| p.run());
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match report.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: could not serialize report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{report}");
    }
    exit_code(&report)
}
