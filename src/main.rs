use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invaudit::{analyze_layout, export, Cleaner, InventoryLayout};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "invaudit")]
#[command(about = "Audit and repair a static host inventory")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Name of the membership file inside the inventory root
    #[arg(long, global = true, default_value = invaudit::layout::DEFAULT_MEMBERSHIP_FILE)]
    hosts_file: String,

    /// Print machine-readable JSON instead of the coloured summary
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Report duplicated, inconsistent, missing and orphaned entries
    Analyze {
        /// Inventory root containing hosts, group_vars/ and host_vars/
        inventory: PathBuf,

        /// Also write the report as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Analyze, then remove the reported entries in place
    Clean {
        /// Inventory root containing hosts, group_vars/ and host_vars/
        inventory: PathBuf,

        /// Run in check mode (show what would be removed)
        #[arg(short = 'C', long)]
        check: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Analyze { inventory, csv } => {
            let layout = InventoryLayout::new(inventory).with_membership_file(&cli.hosts_file);
            let report = analyze_layout(&layout)
                .with_context(|| format!("analyzing {}", inventory.display()))?;

            if let Some(path) = csv {
                export::write_csv(&report, path)?;
                eprintln!("Analysis results saved to {}", path.display());
            }

            if cli.json {
                println!("{}", export::render_json(&report)?);
            } else {
                export::print_report(&report);
            }
        }
        Command::Clean { inventory, check } => {
            let layout = InventoryLayout::new(inventory).with_membership_file(&cli.hosts_file);
            let report = analyze_layout(&layout)
                .with_context(|| format!("analyzing {}", inventory.display()))?;
            let summary = Cleaner::new(&layout)
                .check_mode(*check)
                .run(&report)
                .with_context(|| format!("cleaning {}", inventory.display()))?;

            if cli.json {
                println!("{}", export::render_json(&summary)?);
            } else {
                export::print_cleanup(&summary);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_clean_check() {
        let cli = Cli::parse_from(["invaudit", "clean", "-C", "inv", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.hosts_file, "hosts");
        assert!(matches!(cli.command, Command::Clean { check: true, .. }));
    }
}
