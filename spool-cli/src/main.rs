//! spooladm - printer configuration from the command line
//!
//! Thin console front-end over `spool-config`: inspect and change a
//! printer's device mode, list supported papers, sweep the job queue.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "spooladm", about = "Windows print spooler administration")]
struct Cli {
    /// Printer name; falls back to SPOOLADM_PRINTER, then the OS default
    #[arg(short, long, global = true)]
    printer: Option<String>,

    /// Log level; falls back to SPOOLADM_LOG, then "warn"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the OS default printer name
    Default,
    /// List installed printers
    Printers,
    /// Dump the printer's current device mode
    Devmode,
    /// List the papers the printer supports
    Papers,
    /// Look up a paper's numeric kind code by name
    PaperKind { name: String },
    /// Check whether a form with given dimensions is the current default
    CheckSize {
        form: String,
        /// Width in tenths of a millimeter
        width: i16,
        /// Length in tenths of a millimeter
        length: i16,
    },
    /// Apply a partial configuration change; omitted fields stay as-is
    Apply {
        /// 1 = portrait, 2 = landscape
        #[arg(long, default_value_t = 0)]
        orientation: i16,
        /// Standard paper code (1..=41) or 256 for custom
        #[arg(long, default_value_t = 0)]
        paper_size: i16,
        /// Paper source bin code
        #[arg(long, default_value_t = 0)]
        source: i16,
        /// 1 = simplex, 2 = vertical, 3 = horizontal
        #[arg(long, default_value_t = 0)]
        duplex: i16,
        /// Paper width in tenths of a millimeter
        #[arg(long, default_value_t = 0)]
        width: i16,
        /// Paper length in tenths of a millimeter
        #[arg(long, default_value_t = 0)]
        length: i16,
        /// Form name, e.g. "A4"
        #[arg(long, default_value = "")]
        form: String,
    },
    /// List outstanding jobs on the queue
    Jobs,
    /// Abort every outstanding job
    AbortJobs,
    /// Delete every outstanding job
    PurgeJobs,
}

fn init_logger(level: Option<&str>) {
    let level = level
        .map(str::to_string)
        .or_else(|| std::env::var("SPOOLADM_LOG").ok())
        .unwrap_or_else(|| "warn".to_string());

    tracing_subscriber::fmt()
        .with_max_level(level.parse().unwrap_or(tracing::Level::WARN))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level.as_deref());
    run(cli)
}

#[cfg(windows)]
fn run(cli: Cli) -> anyhow::Result<()> {
    use spool_config::{ChangeRequest, Spooler, duplex_name, orientation_name};

    let spooler = Spooler::system();
    let printer = cli
        .printer
        .or_else(|| std::env::var("SPOOLADM_PRINTER").ok());
    let printer = printer.as_deref();

    match cli.command {
        Command::Default => {
            println!("{}", spooler.default_printer()?);
        }
        Command::Printers => {
            for name in spooler.printers()? {
                println!("{}", name);
            }
        }
        Command::Devmode => {
            let dm = spooler.device_mode(printer)?;
            println!("device:       {}", dm.device_name());
            println!("spec version: {:#06x}", dm.spec_version());
            println!("fields:       {:#010x}", dm.fields());
            println!(
                "orientation:  {} ({})",
                dm.orientation(),
                orientation_name(dm.orientation())
            );
            println!("paper size:   {}", dm.paper_size());
            println!("paper width:  {} (0.1 mm)", dm.paper_width());
            println!("paper length: {} (0.1 mm)", dm.paper_length());
            println!("duplex:       {} ({})", dm.duplex(), duplex_name(dm.duplex()));
            println!("form:         {}", dm.form_name());
        }
        Command::Papers => {
            for paper in spooler.papers(printer)? {
                println!("{:>5}  {}", paper.kind, paper.name);
            }
        }
        Command::PaperKind { name } => {
            println!("{}", spooler.paper_kind(printer, &name)?);
        }
        Command::CheckSize {
            form,
            width,
            length,
        } => {
            let matches = spooler.is_paper_size(printer, &form, width, length)?;
            println!("{}", if matches { "match" } else { "no match" });
        }
        Command::Apply {
            orientation,
            paper_size,
            source,
            duplex,
            width,
            length,
            form,
        } => {
            let request = ChangeRequest {
                orientation,
                paper_size,
                default_source: source,
                duplex,
                paper_length: length,
                paper_width: width,
                form_name: form,
            };
            spooler.apply(printer, &request)?;
            println!("configuration committed");
        }
        Command::Jobs => {
            for job in spooler.jobs(printer)? {
                println!(
                    "{:>6}  {:<24}  {:<12}  {}",
                    job.id,
                    job.document,
                    job.user,
                    job.status_labels().join(",")
                );
            }
        }
        Command::AbortJobs => {
            let count = spooler.abort_jobs(printer)?;
            println!("aborted {} job(s)", count);
        }
        Command::PurgeJobs => {
            let count = spooler.purge_jobs(printer)?;
            println!("deleted {} job(s)", count);
        }
    }

    Ok(())
}

#[cfg(not(windows))]
fn run(_cli: Cli) -> anyhow::Result<()> {
    anyhow::bail!("spooladm drives the Windows print spooler and only runs on Windows")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_flags_parse() {
        let cli = Cli::parse_from([
            "spooladm",
            "--printer",
            "Office Laser",
            "apply",
            "--paper-size",
            "9",
            "--form",
            "A4",
        ]);
        assert_eq!(cli.printer.as_deref(), Some("Office Laser"));
        match cli.command {
            Command::Apply {
                paper_size, form, duplex, ..
            } => {
                assert_eq!(paper_size, 9);
                assert_eq!(form, "A4");
                assert_eq!(duplex, 0);
            }
            _ => panic!("expected apply"),
        }
    }
}
