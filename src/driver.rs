use crate::catalog::CatalogItem;
use crate::error::RunError;
use crate::fetch::{DownloadResult, Fetcher};
use colored::Colorize;
use log::{debug, info};
use std::fmt;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Success and failure counts of a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub success: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, result: &DownloadResult) {
        if result.success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Success: {}, Failed: {}", self.success, self.failed)
    }
}

// Creates a directory if it does not exists. Fails when `path` exists but is not a directory.
fn create_dir_if_needed(path: &Path) -> Result<(), RunError> {
    create_dir_all(path).map_err(|source| RunError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Walks a catalog and downloads every image of every item, one at a
/// time, pausing `throttle` after each attempt.
pub struct Driver<'a> {
    fetcher: &'a Fetcher,
    output_dir: PathBuf,
    throttle: Duration,
    silent: bool,
}

impl<'a> Driver<'a> {
    /// `silent` suppresses progress lines on stdout (logging is not affected)
    #[must_use]
    pub fn new(fetcher: &'a Fetcher, output_dir: PathBuf, throttle: Duration, silent: bool) -> Self {
        Driver {
            fetcher,
            output_dir,
            throttle,
            silent,
        }
    }

    /// Processes `catalog` in order and returns the final tally.
    /// A failed download never stops the run.
    ///
    /// # Errors
    ///
    /// Fails only when the output directory can not be created
    pub async fn run(&self, catalog: &[CatalogItem]) -> Result<Tally, RunError> {
        create_dir_if_needed(&self.output_dir)?;
        self.say(format!("Output directory: {}\n", self.output_dir.display()));

        let mut tally = Tally::default();
        for item in catalog {
            debug!("Processing {item} with {} image(s)", item.images.len());
            self.say(item.name.bold().to_string());

            for (index, url) in item.images.iter().enumerate() {
                let basename = item.basename(index);
                let result = self.fetcher.fetch(url, &basename, &self.output_dir).await;
                self.display_result(&result);
                tally.record(&result);

                // Be nice to the server
                tokio::time::sleep(self.throttle).await;
            }
        }

        info!("Run finished: {tally}");
        self.say(format!("\nComplete! {tally}"));
        self.say(format!("Images saved to: {}", self.output_dir.display()));
        Ok(tally)
    }

    fn display_result(&self, result: &DownloadResult) {
        if result.success {
            self.say(format!("  {} Downloaded: {} ({} bytes)", "🗸".green(), result.filename, result.byte_count));
        } else {
            let reason = result.error.as_deref().unwrap_or("unknown error");
            self.say(format!("  {} Failed: {} - {reason}", "𐄂".red(), result.filename));
        }
    }

    fn say(&self, line: String) {
        if !self.silent {
            println!("{line}");
        }
    }
}
