mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fundscan",
    version,
    about = "Extract target-company holdings from rendered PDF fund reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract holdings from a document's rendered pages (one XML file per page, in order)
    Extract {
        /// Per-page XML files, in document order
        #[arg(required = true)]
        pages: Vec<PathBuf>,

        /// Report format (e.g. "eurizon"); omit to detect from --url
        #[arg(short, long)]
        format: Option<String>,

        /// Report URL, used to auto-detect the format
        #[arg(short, long)]
        url: Option<String>,

        /// CSV file whose first column lists the target company names
        #[arg(short, long)]
        targets: PathBuf,

        /// Output format: csv (default) or json
        #[arg(short, long, default_value = "csv")]
        output: String,

        /// Write output to a file instead of stdout
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inspect the supported report formats
    Formats {
        #[command(subcommand)]
        action: FormatsAction,
    },
}

#[derive(Subcommand)]
enum FormatsAction {
    /// List supported formats
    List,
    /// Detect the format of a report URL
    Detect {
        /// Report URL
        url: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            pages,
            format,
            url,
            targets,
            output,
            out,
        } => commands::extract::run(pages, format, url, targets, &output, out),
        Commands::Formats { action } => match action {
            FormatsAction::List => commands::formats::list(),
            FormatsAction::Detect { url } => commands::formats::detect(&url),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
