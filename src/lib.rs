#![doc = include_str!("../docs/architecture.md")]

/// Command line interface definition
pub mod cli;

/// Equipment catalog and output file naming
pub mod catalog;

/// Configuration management
pub mod settings;

/// Proxy management
pub mod proxy;

/// Errors raised while fetching images
pub mod error;

/// Single image fetch-and-save
pub mod fetch;

/// Sequential catalog download loop
pub mod driver;

/// User agent of a common desktop browser. Some image hosts refuse
/// requests that do not look like they come from one.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Referer sent along with every image request
pub const BROWSER_REFERER: &str = "https://www.bhphotovideo.com/";

/// Directory (relative to the current one) where images are saved
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_images";

/// Per request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pause in milliseconds after every download attempt
pub const DEFAULT_THROTTLE_MS: u64 = 500;
