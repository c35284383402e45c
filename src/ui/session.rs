use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::capture::{DisplaySource, FrameSource, Region};
use crate::core::ledger::frame_filename;
use crate::core::{record, Ledger, RunParams, RunningStats};
use crate::shared::constants;
use crate::ui::prompts::{self, MenuChoice};
use crate::utils::logger;

/// All state for one interactive recording session: the frame source, the
/// export directory and the running statistics live here, owned by the
/// driver, and nowhere else.
pub struct Session<S: FrameSource> {
    source: S,
    output_dir: PathBuf,
    stats: RunningStats,
}

impl Session<DisplaySource> {
    pub fn open(output_dir: PathBuf) -> Result<Self> {
        let source = DisplaySource::primary().context("no display to record")?;
        logger::info(&format!("recording display: {}", source.name()));
        Ok(Session::with_source(source, output_dir))
    }
}

impl<S: FrameSource> Session<S> {
    pub fn with_source(source: S, output_dir: PathBuf) -> Self {
        Self {
            source,
            output_dir,
            stats: RunningStats::new(),
        }
    }

    /// Interactive cycle: region → preview → parameters, then repeated
    /// {countdown → run → export → range selection → menu} until quit.
    pub fn run(mut self) -> Result<()> {
        println!("{} v{}", constants::APP_NAME, env!("CARGO_PKG_VERSION"));
        println!("move the target window to the top left (0,0) to help with dimension selection");

        let region = self.choose_region()?;
        println!(
            "final dimensions: x: {}, y: {}, w: {}, h: {}",
            region.x, region.y, region.width, region.height
        );

        let max_duration_ms = prompts::read_u64("enter max time to capture (milliseconds): ")?;
        let step_ms = prompts::read_positive_u64("enter capture time step (milliseconds): ")?;
        let params = RunParams {
            max_duration_ms,
            step_ms,
        };

        loop {
            self.countdown();

            match record(&self.source, &region, params) {
                Ok(mut ledger) => {
                    self.export_and_review(&mut ledger)?;
                    ledger.clear();
                }
                Err(e) => {
                    // fatal to this run only; the retained frames were
                    // already released on the way out
                    logger::error(&format!("run aborted: {}", e));
                    println!("run aborted: {}", e);
                }
            }

            match prompts::menu_choice()? {
                MenuChoice::Continue => {}
                MenuChoice::Reset => self.stats.reset(),
                MenuChoice::Quit => break,
            }
        }

        println!("{}", self.stats.report());
        Ok(())
    }

    /// Region prompt plus a single-frame preview recording so the operator
    /// can check the crop before committing.
    fn choose_region(&mut self) -> Result<Region> {
        let (max_w, max_h) = self.source.bounds();
        loop {
            let region = prompts::read_region(max_w, max_h)?;

            let preview_params = RunParams {
                max_duration_ms: 0,
                step_ms: constants::PREVIEW_STEP_MS,
            };
            let mut preview = record(&self.source, &region, preview_params)
                .context("preview capture failed")?;
            preview
                .export_to_dir(&self.output_dir)
                .context("failed to write the preview image")?;
            preview.clear();

            println!("preview written... check {}", frame_filename(0));
            if prompts::confirm("is this ok? (y/n) ")? {
                return Ok(region);
            }
        }
    }

    fn countdown(&self) {
        print!("starting in...");
        for n in (1..=constants::COUNTDOWN_SECS).rev() {
            print!(" {}", n);
            let _ = std::io::stdout().flush();
            std::thread::sleep(Duration::from_secs(1));
        }
        println!(" 0 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    }

    fn export_and_review(&mut self, ledger: &mut Ledger) -> Result<()> {
        for frame in ledger.iter() {
            println!("{}\t{:.3}", frame.id(), frame.timestamp_ms());
        }

        match ledger.export_to_dir(&self.output_dir) {
            Ok(summary) => {
                if summary.failed > 0 {
                    println!(
                        "warning: {} of {} frames failed to save (see {})",
                        summary.failed,
                        summary.saved + summary.failed,
                        constants::ERROR_LOG_FILE
                    );
                }
                println!(
                    "saved {} frames and {}",
                    summary.saved,
                    constants::MANIFEST_FILE
                );
            }
            Err(e) => {
                // a broken manifest must not end the session
                logger::error(&format!("export failed: {}", e));
                println!("export failed: {}", e);
            }
        }

        self.review_ranges(ledger)
    }

    /// Interactive range selection; `0 0` ends the selection session.
    fn review_ranges(&mut self, ledger: &Ledger) -> Result<()> {
        loop {
            let (start, end) = prompts::read_index_pair("select start and end idx ['0 0' to skip]: ")?;
            if start == 0 && end == 0 {
                return Ok(());
            }

            match self.stats.select_range(start, end, ledger) {
                Ok(_) => println!("{}", self.stats.report()),
                Err(e) => println!("{}", e),
            }
        }
    }
}
