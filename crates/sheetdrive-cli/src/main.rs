//! sheetdrive CLI - inspect and create host documents over the COM bridge

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetdrive::Session;
use sheetdrive_excel_com::{linux_to_wine_path, BridgeConfig, ExcelComHost};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetctl")]
#[command(
    author,
    version,
    about = "Open, inspect, and create spreadsheet documents via the automation host"
)]
struct Cli {
    /// Attach to an already-running host instead of launching a new one
    #[arg(long)]
    attach: bool,

    /// Path to the excel-com-bridge.exe executable
    #[arg(long)]
    bridge_exe: Option<PathBuf>,

    /// Path to the WINE executable
    #[arg(long, default_value = "wine")]
    wine: PathBuf,

    /// WINEPREFIX for isolating the WINE environment
    #[arg(long)]
    wine_prefix: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a document with their used-row extents
    Sheets {
        /// Document file to open (read-only)
        input: PathBuf,
    },

    /// Create a document with a single named sheet
    New {
        /// Name shared by the document and its sole sheet
        name: String,

        /// Save the new document to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Make the host window visible and leave it running on exit
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let host = ExcelComHost::new(BridgeConfig {
        bridge_exe_path: cli.bridge_exe,
        wine_path: cli.wine,
        wine_prefix: cli.wine_prefix,
    });

    let mut session = if cli.attach {
        Session::attach(host).context("Failed to attach to a running host")?
    } else {
        Session::launch(host).context("Failed to launch the automation host")?
    };

    // `new --show` leaves the host running with the window open.
    let keep_host = matches!(&cli.command, Commands::New { show: true, .. });

    let result = match cli.command {
        Commands::Sheets { input } => list_sheets(&mut session, &input),
        Commands::New { name, output, show } => {
            new_document(&mut session, &name, output.as_deref(), show)
        }
    };

    if keep_host && result.is_ok() {
        return result;
    }

    session
        .dispose()
        .context("Failed to dispose the session")?;
    result
}

fn list_sheets(session: &mut Session<ExcelComHost>, input: &Path) -> Result<()> {
    let file_name = input
        .file_name()
        .with_context(|| format!("'{}' has no file name", input.display()))?
        .to_string_lossy()
        .into_owned();
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    // The session concatenates directory and name verbatim, so the
    // directory must carry its trailing separator (host-native form).
    let wine_dir = format!("{}\\", linux_to_wine_path(dir));

    let doc = session
        .open_document_read_only(&wine_dir, &file_name)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let mut names = doc.sheet_names();
    names.sort_unstable();
    for name in names {
        let extent = doc
            .sheet(name)
            .context("sheet missing from registry")?
            .used_row_extent()
            .with_context(|| format!("Extent query failed for sheet '{name}'"))?;
        match extent {
            Some(row) => println!("{name}: {row} rows"),
            None => println!("{name}: empty"),
        }
    }
    Ok(())
}

fn new_document(
    session: &mut Session<ExcelComHost>,
    name: &str,
    output: Option<&Path>,
    show: bool,
) -> Result<()> {
    let doc = session
        .new_document_with_single_sheet(name)
        .with_context(|| format!("Failed to create document '{name}'"))?;

    if let Some(output) = output {
        let wine_path = linux_to_wine_path(output);
        doc.save_as(&wine_path)
            .with_context(|| format!("Failed to save to '{}'", output.display()))?;
        println!("Saved '{name}' to {}", output.display());
    }

    if show {
        session.make_visible().context("Failed to show the host")?;
        println!("Host left running with '{name}' open");
    }
    Ok(())
}
