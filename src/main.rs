//! Envprobe - Main Entry Point
//!
//! This is the main executable for the envprobe application. It handles CLI
//! argument parsing, configuration loading, and the collection run itself.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use envprobe::{
    browser::{BrowserConfig, BrowserEngine, ChromiumEngine},
    collector::EnvCollector,
    config::{CliArgs, CollectorSettings},
    replay::ReplayScript,
    snapshot::EnvSnapshot,
    NAME, VERSION,
};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
}

/// Print the startup banner with version and ASCII art
fn print_banner() {
    println!(
        r#"
{cyan}{bold}  _____                                          _
 | ____|  _ __  __   __   _ __    _ __    ___   | |__     ___
 |  _|   | '_ \ \ \ / /  | '_ \  | '__|  / _ \  | '_ \   / _ \
 | |___  | | | | \ V /   | |_) | | |    | (_) | | |_) | |  __/
 |_____| |_| |_|  \_/    | .__/  |_|     \___/  |_.__/   \___|
                         |_|{reset}
{dim}  Browser Environment Collection over the DevTools Protocol{reset}
{dim}  Version: {version}{reset}
"#,
        cyan = colors::CYAN,
        bold = colors::BOLD,
        reset = colors::RESET,
        dim = colors::DIM,
        version = VERSION
    );
}

/// Print configuration summary
fn print_config_summary(settings: &CollectorSettings, url: Option<&str>) {
    println!(
        "{bold}{blue}Configuration:{reset}",
        bold = colors::BOLD,
        blue = colors::BLUE,
        reset = colors::RESET
    );
    println!(
        "  {dim}Browser:{reset}        {}",
        settings.browser,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Headless:{reset}       {}",
        if settings.headless {
            format!("{green}yes{reset}", green = colors::GREEN, reset = colors::RESET)
        } else {
            format!("{yellow}no{reset}", yellow = colors::YELLOW, reset = colors::RESET)
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Window Size:{reset}    {}x{}",
        settings.window_width,
        settings.window_height,
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Target URL:{reset}     {}",
        url.unwrap_or("about:blank"),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Output:{reset}         {}",
        settings.output.display(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Replay Script:{reset}  {}",
        if settings.gen_script {
            format!("{green}enabled{reset}", green = colors::GREEN, reset = colors::RESET)
        } else {
            format!("{yellow}disabled{reset}", yellow = colors::YELLOW, reset = colors::RESET)
        },
        dim = colors::DIM,
        reset = colors::RESET
    );

    if let Some(ref executable) = settings.executable {
        println!(
            "  {dim}Executable:{reset}     {}",
            executable.display(),
            dim = colors::DIM,
            reset = colors::RESET
        );
    }

    println!();
}

/// Print a summary of the collected snapshot
fn print_snapshot_summary(snapshot: &EnvSnapshot, output: &Path, script_path: Option<&Path>) {
    let browser = format!("{} {}", snapshot.browser, snapshot.version);

    println!(
        "{bold}{blue}Snapshot:{reset}",
        bold = colors::BOLD,
        blue = colors::BLUE,
        reset = colors::RESET
    );
    println!(
        "  {dim}Browser:{reset}        {}",
        browser.trim_end(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}User Agent:{reset}     {}",
        truncate(snapshot.user_agent().unwrap_or("unknown"), 80),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Platform:{reset}       {}",
        snapshot.platform().unwrap_or("unknown"),
        dim = colors::DIM,
        reset = colors::RESET
    );

    if let Some((width, height)) = snapshot.screen_size() {
        println!(
            "  {dim}Screen:{reset}         {}x{}",
            width,
            height,
            dim = colors::DIM,
            reset = colors::RESET
        );
    }

    println!(
        "  {dim}Plugins:{reset}        {}",
        snapshot.plugins.len(),
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}WebGL:{reset}          {}",
        if snapshot.has_webgl() {
            format!("{green}yes{reset}", green = colors::GREEN, reset = colors::RESET)
        } else {
            format!("{yellow}no{reset}", yellow = colors::YELLOW, reset = colors::RESET)
        },
        dim = colors::DIM,
        reset = colors::RESET
    );
    println!(
        "  {dim}Saved To:{reset}       {}",
        output.display(),
        dim = colors::DIM,
        reset = colors::RESET
    );

    if let Some(path) = script_path {
        println!(
            "  {dim}Replay Script:{reset}  {}",
            path.display(),
            dim = colors::DIM,
            reset = colors::RESET
        );
    }

    println!();
}

/// Truncate a string for single-line display
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max).collect();
        format!("{}...", prefix)
    }
}

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author("Envprobe Developers")
        .about("Collects browser environment snapshots over the DevTools Protocol")
        .long_about(
            "Envprobe drives a headless browser, reads its built-in environment\n\
             objects (navigator, screen, window, document, location, performance,\n\
             plugins, WebGL, canvas, audio) and writes the values into a JSON\n\
             snapshot. The snapshot can optionally be rendered into a JavaScript\n\
             replay script that re-applies the values onto another browser context.",
        )
        .arg(
            Arg::new("url")
                .value_name("URL")
                .help("URL to collect from (default: about:blank)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PATH")
                .help("Snapshot output path (default: templates/env_template.json)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("browser")
                .short('b')
                .long("browser")
                .value_name("BROWSER")
                .help("Browser family to drive")
                .value_parser(["chrome", "edge"]),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Run browser in headless mode (default)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-headless")
                .long("no-headless")
                .help("Run browser with visible window")
                .action(ArgAction::SetTrue)
                .conflicts_with("headless"),
        )
        .arg(
            Arg::new("gen-script")
                .long("gen-script")
                .help("Also emit a replay script next to the snapshot")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .help("Browser window width")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .help("Browser window height")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("executable")
                .long("executable")
                .value_name("PATH")
                .help("Explicit path to the browser executable")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress output except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &clap::ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.browser = matches.get_one::<String>("browser").cloned();
    args.output = matches.get_one::<PathBuf>("output").cloned();
    args.executable = matches.get_one::<PathBuf>("executable").cloned();
    args.width = matches.get_one::<u32>("width").copied();
    args.height = matches.get_one::<u32>("height").copied();

    // Handle headless flag
    if matches.get_flag("headless") {
        args.headless = Some(true);
    } else if matches.get_flag("no-headless") {
        args.headless = Some(false);
    }

    // Handle gen-script flag
    if matches.get_flag("gen-script") {
        args.gen_script = Some(true);
    }

    args
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("chromiumoxide=warn".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let matches = build_cli().get_matches();

    // Get verbosity settings before loading config
    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");

    // Initialize logging
    init_tracing(verbosity, quiet);

    // Convert matches to CliArgs
    let cli_args = parse_cli_args(&matches);

    // Load configuration with full precedence chain
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;

    let url = matches.get_one::<String>("url").cloned();

    // Print banner unless quiet mode
    if !quiet {
        print_banner();
        print_config_summary(&settings, url.as_deref());
    }

    // Initialize browser engine
    info!("Initializing browser engine...");

    let mut browser_config = BrowserConfig::new()
        .headless(settings.headless)
        .window_size(settings.window_width, settings.window_height);

    // The driver locates Chrome on its own; other browsers are launched by
    // executable path.
    if let Some(ref executable) = settings.executable {
        browser_config = browser_config.executable(executable);
    } else if let Some(default) = settings.browser.default_executable() {
        browser_config = browser_config.executable(default);
    }

    let engine = ChromiumEngine::new(browser_config)
        .await
        .context("Failed to launch browser")?;
    info!("Browser engine initialized");

    // Run the collection
    let collector = EnvCollector::new(engine);
    let result = collector.collect(url.as_deref()).await;

    // The session is torn down whether or not collection succeeded.
    if let Err(error) = collector.shutdown().await {
        warn!("Browser shutdown failed: {}", error);
    }

    let snapshot = result.context("Collection failed")?;

    // Persist the snapshot
    snapshot
        .save_to_file(&settings.output)
        .with_context(|| format!("Failed to write snapshot to {}", settings.output.display()))?;
    info!("Snapshot written to {}", settings.output.display());

    // Optionally render the replay script next to it
    let script_path = if settings.gen_script {
        let path = ReplayScript::path_for(&settings.output);
        std::fs::write(&path, ReplayScript::render(&snapshot))
            .with_context(|| format!("Failed to write replay script to {}", path.display()))?;
        info!("Replay script written to {}", path.display());
        Some(path)
    } else {
        None
    };

    if !quiet {
        println!(
            "{green}{bold}Collection complete.{reset}",
            green = colors::GREEN,
            bold = colors::BOLD,
            reset = colors::RESET
        );
        println!();
        print_snapshot_summary(&snapshot, &settings.output, script_path.as_deref());
    }

    Ok(())
}
