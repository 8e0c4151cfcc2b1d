use colored::Colorize;
use env_logger::{Env, WriteStyle};
use equipment_image_download::cli::Cli;
use equipment_image_download::driver::Driver;
use equipment_image_download::fetch::Fetcher;
use equipment_image_download::settings::Settings;
use log::{debug, error};
use std::env::var;
use std::process::exit;

///  `NO_COLOR` compliance: See [no color web site](https://no-color.org/)
fn get_no_color_compliance_writestyle() -> WriteStyle {
    if var("NO_COLOR").is_ok() {
        WriteStyle::Never
    } else {
        WriteStyle::Auto
    }
}

/// Initializes logging environment with `NO_COLOR` compliance
fn init_log_environment(cli: &Cli) {
    let color = get_no_color_compliance_writestyle();

    // Retrieves verbosity level set at the cli level with -v, -vv or -q thanks to clap_verbosity
    let cli_debug_level = cli.verbose.log_level_filter().as_str();

    env_logger::Builder::from_env(Env::default().default_filter_or(cli_debug_level)).write_style(color).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::analyze();
    init_log_environment(&cli);

    let settings = Settings::from_config(&cli);
    debug!("Settings: {settings:?}");

    let fetcher = match Fetcher::new(settings.timeout(), &settings.proxies()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    };

    let silent = cli.verbose.is_silent();
    if !silent {
        println!("\n{}\n", "Image Downloader for Equipment Catalog".bold());
    }

    let catalog = settings.catalog();
    let driver = Driver::new(&fetcher, settings.output_dir(), settings.throttle(), silent);
    if let Err(e) = driver.run(&catalog).await {
        error!("{e}");
        exit(1);
    }
}
