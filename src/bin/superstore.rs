use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use superstore::{Session, View, report, storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "superstore",
    version,
    about = "Aggregate, export & chart superstore sales data"
)]
struct Cli {
    /// Order spreadsheet exported as CSV (header row, one sheet).
    #[arg(long, env = "SUPERSTORE_DATA", default_value = "superstore_sales.csv", global = true)]
    data: PathBuf,
    /// Locale for number formatting (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en", global = true)]
    locale: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available views.
    Views,
    /// Compute one view (and optionally save and plot it).
    Show(ShowArgs),
    /// Print every view, in menu order.
    Report,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// View to compute.
    #[arg(value_enum)]
    view: View,
    /// Save the result to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// TrueType font used for chart text (defaults to a common system font).
    #[arg(long, env = "SUPERSTORE_FONT")]
    font: Option<PathBuf>,
    /// Don't print the table to stdout.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Views => {
            cmd_views();
            Ok(())
        }
        Command::Show(ref args) => cmd_show(&cli, args),
        Command::Report => cmd_report(&cli),
    }
}

fn cmd_views() {
    for view in View::ALL {
        let chart = if view.chart_kind().is_some() { "chart" } else { "table" };
        println!("{:<28} {:<6} {}", view.slug(), chart, view.title());
    }
}

fn open_session(cli: &Cli) -> Result<Session> {
    let session = Session::open(&cli.data)
        .with_context(|| format!("open dataset {}", cli.data.display()))?;
    if session.table().is_empty() {
        eprintln!("No orders found in {}. Please check the data source.", cli.data.display());
    }
    Ok(session)
}

fn cmd_show(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let session = open_session(cli)?;
    let output = session.compute(args.view)?;

    if !args.quiet {
        print!("{}", report::render(args.view, &output, &cli.locale));
    }

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&output, path)?,
            "json" => storage::save_json(&output, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", output.len(), path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        viz::plot_view(
            args.view,
            &output,
            plot_path,
            args.width,
            args.height,
            &cli.locale,
            args.font.as_deref(),
        )?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    Ok(())
}

fn cmd_report(cli: &Cli) -> Result<()> {
    let session = open_session(cli)?;
    for (i, view) in View::ALL.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        let output = session.compute(view)?;
        print!("{}", report::render(view, &output, &cli.locale));
    }
    Ok(())
}
