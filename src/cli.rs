use clap::Parser;

#[derive(Parser, Debug)]
/// This program downloads the images of an equipment
/// catalog into a local directory
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Uses an alternative configuration file
    /// (defaults to eid.toml in the user's configuration directory)
    #[arg(long)]
    pub config: Option<String>,

    /// Directory where images are saved
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Pause after each download, in milliseconds
    #[arg(long)]
    pub throttle: Option<u64>,

    /// Request timeout, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    // Verbosity level managed through clap_verbosity_flag crate
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

impl Cli {
    /// Parsing the Cli and returning the structure filled accordingly
    /// to the command line options
    #[must_use]
    pub fn analyze() -> Self {
        Cli::parse()
    }
}

#[test]
fn test_cli_without_arguments() {
    let cli = Cli::parse_from(["eid"]);
    assert_eq!(cli.config, None);
    assert_eq!(cli.output_dir, None);
    assert_eq!(cli.throttle, None);
    assert!(!cli.verbose.is_silent());
}

#[test]
fn test_cli_options() {
    let cli = Cli::parse_from(["eid", "--output-dir", "/tmp/images", "--throttle", "0", "-q"]);
    assert_eq!(cli.output_dir, Some("/tmp/images".to_string()));
    assert_eq!(cli.throttle, Some(0));
    assert!(cli.verbose.is_silent());
}
