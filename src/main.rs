//! sidfilter CLI - frequency response of the SID 6581 filter model

use clap::{Args, Parser, Subcommand};
use sidfilter::output::{write_spectrum, write_table, OutputFormat};
use sidfilter::{FilterError, FilterParams, FilterResult, FilterTap, ResponseAnalyzer};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "sidfilter")]
#[command(about = "SID 6581 filter frequency response simulator", long_about = None)]
struct Cli {
    /// Number of threads for parallel tap analysis (default: 4)
    #[arg(short = 't', long, default_value = "4", global = true)]
    threads: usize,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    params: ParamArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Filter constants; flags override the parameter file, which overrides defaults
#[derive(Args)]
struct ParamArgs {
    /// TOML parameter file
    #[arg(short, long, global = true)]
    params: Option<PathBuf>,

    /// Integrator step per sample
    #[arg(long, global = true)]
    w0: Option<f64>,

    /// Direct input feed-through into the high-pass node
    #[arg(long, global = true)]
    distortion_rate: Option<f64>,

    /// Resonance (0-15)
    #[arg(long, global = true)]
    res: Option<f64>,

    /// Cross-leak between filter nodes
    #[arg(long, global = true)]
    cft: Option<f64>,

    /// Low-pass / band-pass gain ratio
    #[arg(long, global = true)]
    lp_bp: Option<f64>,
}

impl ParamArgs {
    fn resolve(&self) -> FilterResult<FilterParams> {
        let mut params = match &self.params {
            Some(path) => FilterParams::load(path)?,
            None => FilterParams::default(),
        };

        if let Some(w0) = self.w0 {
            params.w0 = w0;
        }
        if let Some(rate) = self.distortion_rate {
            params.distortion_rate = rate;
        }
        if let Some(res) = self.res {
            params.res = res;
        }
        if let Some(cft) = self.cft {
            params.cft = cft;
        }
        if let Some(lp_bp) = self.lp_bp {
            params.lp_bp = lp_bp;
        }

        params.validate()?;
        Ok(params)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Frequency response of one tap
    Response {
        /// Output tap (Vlp, Vbp, Vhp, sum, sum_lo, sum_hi, sum_notch)
        tap: String,

        /// Impulse amplitude
        amplitude: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Frequency responses of several taps side by side
    Compare {
        /// Impulse amplitude
        amplitude: f64,

        /// Taps to compare (default: all)
        #[arg(long, value_delimiter = ',')]
        taps: Vec<String>,
    },

    /// List the available taps
    Taps,

    /// Print the effective parameter set as TOML
    Params,
}

fn parse_taps(names: &[String]) -> FilterResult<Vec<FilterTap>> {
    if names.is_empty() {
        return Ok(FilterTap::ALL.to_vec());
    }
    names.iter().map(|name| name.parse()).collect()
}

/// Execute one subcommand, writing its output to `out`.
///
/// Parameters are only resolved by the subcommands that use them.
fn run<W: Write>(command: Commands, param_args: &ParamArgs, out: &mut W) -> FilterResult<()> {
    match command {
        Commands::Response {
            tap,
            amplitude,
            format,
        } => {
            // Tap is checked before anything is simulated
            let tap: FilterTap = tap.parse()?;
            let params = param_args.resolve()?;
            let spectrum = ResponseAnalyzer::new(params).analyze(tap, amplitude)?;
            write_spectrum(out, &spectrum, format)?;
        }

        Commands::Compare { amplitude, taps } => {
            let taps = parse_taps(&taps)?;
            let params = param_args.resolve()?;
            let spectra = ResponseAnalyzer::new(params).analyze_taps(&taps, amplitude)?;
            write_table(out, &spectra)?;
        }

        Commands::Taps => {
            for tap in FilterTap::ALL {
                writeln!(out, "{:<10} {}", tap.name(), tap.description())?;
            }
        }

        Commands::Params => {
            let params = param_args.resolve()?;
            write!(out, "{}", params.to_toml_string()?)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn error_report(err: &FilterError) -> String {
    format!("Error: {}", err)
}

fn main() {
    let cli = Cli::parse();

    // stdout carries the spectrum, logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
    {
        eprintln!("Error: failed to start thread pool: {}", e);
        std::process::exit(2);
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Err(e) = run(cli.command, &cli.params, &mut out) {
        eprintln!("{}", error_report(&e));
        std::process::exit(1);
    }
}
