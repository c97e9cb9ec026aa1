// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};

use crate::config::options::{AppOptions, ReconcileGuard};
use crate::progress::Progress;
use crate::report::{self, BoxReport};
use crate::runner;
use crate::store::CaseStore;

#[derive(Debug, Parser)]
#[command(name = "sei_capture", version, about = "Capture SEI case listings into per-box stores")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base directory of the per-box stores (overrides BASES_DADOS_DIR)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `sei_capture=trace` (overrides LOG_LEVEL)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log to the file only
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one capture cycle against the portal
    Capture(CaptureArgs),
    /// Run capture cycles on a fixed interval
    Schedule {
        #[command(flatten)]
        capture: CaptureArgs,
        /// Hours between cycles
        #[arg(long)]
        every_hours: Option<u64>,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Capture saved listing pages, in order, without a browser
    Replay {
        #[arg(long = "box")]
        box_name: String,
        #[command(flatten)]
        pass: PassArgs,
        #[arg(required = true)]
        pages: Vec<PathBuf>,
    },
    /// Print the dashboard figures of one box
    Report {
        #[arg(long = "box")]
        box_name: String,
        /// Goals for one technician instead of the whole box
        #[arg(long)]
        technician: Option<String>,
        /// Responsible assignees (repeatable); defaults to the box's entry in the
        /// responsible list file, then to every assignee in the store
        #[arg(long = "responsible")]
        responsible: Vec<String>,
        /// Responsible list file (overrides RESPONSAVEIS_FILE)
        #[arg(long)]
        responsible_file: Option<PathBuf>,
    },
}

/// How a single capture pass behaves, shared by live and replayed captures.
#[derive(Debug, Clone, Args)]
pub struct PassArgs {
    /// Reconcile even when a pass saw no records
    #[arg(long)]
    pub allow_empty_reconcile: bool,
    /// Fail the pass when the first page has no listing table (overrides REQUIRE_LISTING)
    #[arg(long)]
    pub require_listing: bool,
    /// Pages read before the pass gives up (overrides MAX_PAGES)
    #[arg(long)]
    pub max_pages: Option<u32>,
}

impl PassArgs {
    fn apply(&self, opts: &mut AppOptions) {
        if self.allow_empty_reconcile {
            opts.capture.guard = ReconcileGuard::Always;
        }
        if self.require_listing {
            opts.capture.require_listing = true;
        }
        if let Some(n) = self.max_pages {
            opts.capture.max_pages = n;
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CaptureArgs {
    /// Box to capture (repeatable; overrides UNIDADE)
    #[arg(long = "box")]
    pub boxes: Vec<String>,
    #[command(flatten)]
    pub pass: PassArgs,
    #[arg(long)]
    pub headless: bool,
}

impl CaptureArgs {
    fn apply(&self, opts: &mut AppOptions) {
        if !self.boxes.is_empty() {
            opts.boxes = self.boxes.clone();
        }
        self.pass.apply(opts);
        if self.headless {
            opts.driver.headless = true;
        }
    }
}

impl Cli {
    /// Layer command-line values over the environment-derived options.
    pub fn apply(&self, opts: &mut AppOptions) {
        if let Some(dir) = &self.base_dir {
            opts.store.base_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            opts.log.level = level.clone();
        }
        if self.quiet {
            opts.log.console = false;
        }
        match &self.command {
            Command::Capture(c) => c.apply(opts),
            Command::Schedule { capture, every_hours, .. } => {
                capture.apply(opts);
                if let Some(h) = every_hours {
                    opts.schedule.every = Duration::from_secs((*h).max(1) * 60 * 60);
                }
            }
            Command::Replay { pass, .. } => pass.apply(opts),
            Command::Report { responsible_file, .. } => {
                if let Some(f) = responsible_file {
                    opts.store.responsible_file = Some(f.clone());
                }
            }
        }
    }
}

/// Prints progress lines to stderr.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        eprintln!("{total} box(es) to capture");
    }
    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }
    fn page_done(&mut self, box_name: &str, page: u32, sightings: usize) {
        eprintln!("  {box_name}: page {page}, {sightings} record(s)");
    }
}

pub fn run(cli: &Cli, opts: &AppOptions) -> Result<()> {
    let mut progress = ConsoleProgress;
    match &cli.command {
        Command::Capture(_) => {
            let summary = runner::run_cycle(opts, Some(&mut progress))?;
            for o in &summary.outcomes {
                match &o.result {
                    Ok(r) => println!(
                        "{}: {} page(s), {} record(s), {} concluded{}",
                        o.box_name,
                        r.pages,
                        r.distinct,
                        r.concluded,
                        if r.reconciled { "" } else { " (not reconciled)" }
                    ),
                    Err(e) => println!("{}: FAILED: {e}", o.box_name),
                }
            }
            summary.check()?;
        }
        Command::Schedule { cycles, .. } => {
            runner::run_schedule(opts, *cycles, Some(&mut progress));
        }
        Command::Replay { box_name, pages, .. } => {
            let r = runner::replay(box_name, pages, opts, Some(&mut progress))?;
            println!(
                "{box_name}: {} page(s), {} record(s), {} concluded{}",
                r.pages,
                r.distinct,
                r.concluded,
                if r.reconciled { "" } else { " (not reconciled)" }
            );
        }
        Command::Report { box_name, technician, responsible, .. } => {
            let store = CaseStore::open_existing(&opts.store.base_dir, box_name)
                .map_err(|e| eyre!("{e} (looked under {})", opts.store.base_dir.display()))?;
            let responsible = if responsible.is_empty() {
                let map = report::load_responsible(&opts.store.responsible_path())?;
                report::responsible_for(&map, box_name)
            } else {
                responsible.clone()
            };
            let today = Local::now().date_naive();
            let r = report::box_report(&store, box_name, &responsible, technician.as_deref(), today)?;
            print_report(&r, technician.as_deref());
        }
    }
    Ok(())
}

fn print_report(r: &BoxReport, technician: Option<&str>) {
    let s = &r.summary;
    println!("{}", r.box_name);
    println!(
        "  total {} | open {} | concluded {} | concluded today {}",
        s.total, s.open, s.concluded, s.concluded_today
    );

    let who = match technician {
        Some(t) => s!(t),
        None => format!("whole box, {} responsible", r.responsible.len()),
    };
    let g = &r.goals;
    println!("  goals ({who}, {} working days)", g.working_days);
    println!("    today  {:>4} / {:<5} {:>3}%", g.done_today, g.daily_goal, g.daily_pct);
    println!("    month  {:>4} / {:<5} {:>3}%", g.done_month, g.monthly_goal, g.monthly_pct);

    if !r.per_assignee.is_empty() {
        println!("  per assignee");
        let width = r.per_assignee.iter().map(|a| a.assignee.len()).max().unwrap_or(0);
        for a in &r.per_assignee {
            println!("    {:<width$}  open {:>4}  concluded {:>4}", a.assignee, a.open, a.concluded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_flags_override_environment() {
        let cli = Cli::parse_from([
            "sei_capture", "--base-dir", "/tmp/bases", "capture", "--box", "A", "--box", "B",
            "--allow-empty-reconcile", "--max-pages", "5",
        ]);
        let mut opts = AppOptions::default();
        opts.boxes.push(s!("FROM-ENV"));
        cli.apply(&mut opts);
        assert_eq!(opts.boxes, vec![s!("A"), s!("B")]);
        assert_eq!(opts.capture.guard, ReconcileGuard::Always);
        assert_eq!(opts.capture.max_pages, 5);
        assert_eq!(opts.store.base_dir, PathBuf::from("/tmp/bases"));
    }

    #[test]
    fn schedule_interval_is_in_hours() {
        let cli = Cli::parse_from(["sei_capture", "schedule", "--every-hours", "2", "--cycles", "1"]);
        let mut opts = AppOptions::default();
        cli.apply(&mut opts);
        assert_eq!(opts.schedule.every, Duration::from_secs(7200));
        assert!(opts.boxes.is_empty());
    }

    #[test]
    fn replay_takes_the_same_pass_flags() {
        let cli = Cli::parse_from([
            "sei_capture", "replay", "--box", "A", "--require-listing", "--max-pages", "7", "p1.html",
        ]);
        let mut opts = AppOptions::default();
        cli.apply(&mut opts);
        assert!(opts.capture.require_listing);
        assert_eq!(opts.capture.max_pages, 7);
        assert_eq!(opts.capture.guard, ReconcileGuard::RequireSightings);
    }

    #[test]
    fn replay_needs_pages() {
        assert!(Cli::try_parse_from(["sei_capture", "replay", "--box", "A"]).is_err());
    }
}
