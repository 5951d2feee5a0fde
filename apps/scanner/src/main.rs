//! # Ingrid Scanner Entry Point
//!
//! `ingrid`: scan a food product and see how clean its ingredient list is.
//!
//! ## Startup Sequence
//! 1. Parse the command line
//! 2. Initialize tracing (stderr)
//! 3. Load configuration (file, environment, `--api-url`)
//! 4. Build the devices the command needs
//! 5. Wire AppState on a current-thread runtime
//! 6. Run the command, print its response, exit with a sysexits code

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ingrid_client::ClientConfig;
use ingrid_core::ScanMode;
use ingrid_scanner::commands::scan::{CameraChoice, CameraStep};
use ingrid_scanner::commands::{config, lists, results, scan};
use ingrid_scanner::devices::FrameSource;
use ingrid_scanner::{exit_codes, init_tracing, ApiResult, AppState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "ingrid")]
#[command(author, version, about = "Scan food products and rate their ingredient lists", long_about = None)]
struct Cli {
    /// Config file (defaults to ingrid.toml in the platform config directory)
    #[arg(long, global = true, env = "INGRID_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Scan backend API root, overriding the configuration
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a product by typing its barcode
    Barcode {
        /// 8 to 14 digits
        #[arg(value_name = "DIGITS")]
        digits: String,
    },

    /// Scan barcodes from stdin, one frame per line
    Scan,

    /// Photograph an ingredient label, using an image file as the camera
    Camera {
        /// Image the camera will see
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Analyze the first capture without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Upload a photo of an ingredient label
    Photo {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show the current result
    Show,

    /// Toggle the bookmark on the current result
    Bookmark,

    /// List scan history
    History {
        /// Open entry N (1-based) as the current result
        #[arg(long, value_name = "N")]
        open: Option<usize>,
    },

    /// List bookmarked products
    Favorites {
        /// Open entry N (1-based) as the current result
        #[arg(long, value_name = "N")]
        open: Option<usize>,
    },

    /// Print the session identity
    Whoami,

    /// Print the effective configuration
    Config {
        /// Write it to the config file instead
        #[arg(long)]
        write: bool,
    },
}

impl Command {
    fn frame_source(&self) -> FrameSource {
        match self {
            Command::Scan => FrameSource::Terminal,
            Command::Camera { file, .. } => FrameSource::File(file.clone()),
            _ => FrameSource::None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            return ExitCode::from(exit_codes::INTERNAL_ERROR as u8);
        }
    };

    let status = match runtime.block_on(execute(cli)) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            debug!(code = e.code.as_str(), "Command failed");
            eprintln!("error: {}", e.message);
            e.exit_code()
        }
    };
    ExitCode::from(status as u8)
}

fn load_config(path: Option<PathBuf>, api_url: Option<String>) -> ApiResult<ClientConfig> {
    let mut config = ClientConfig::load(path)?;
    if let Some(url) = api_url {
        debug!(url = %url, "Overriding API URL from command line");
        config.api.base_url = url;
        config.validate()?;
    }
    Ok(config)
}

async fn execute(cli: Cli) -> ApiResult<String> {
    let config_path = cli.config.clone();
    let config = load_config(cli.config, cli.api_url)?;

    if let Command::Config { write } = cli.command {
        return if write {
            let path = config::write_config(&config, config_path)?;
            Ok(format!("Wrote {}", path.display()))
        } else {
            config::effective_config(&config)
        };
    }

    let devices = cli.command.frame_source().into_devices(config.device_timeout());
    let app = AppState::connect(config, devices)?;

    match cli.command {
        Command::Barcode { digits } => Ok(scan::enter_barcode(&app, &digits).await?.to_string()),
        Command::Scan => scan_from_terminal(&app).await,
        Command::Camera { yes, .. } => camera(&app, yes).await,
        Command::Photo { file } => Ok(scan::upload_photo(&app, &file).await?.to_string()),
        Command::Show => Ok(results::show(&app).to_string()),
        Command::Bookmark => Ok(results::toggle_bookmark(&app).await?.to_string()),
        Command::History { open } => Ok(lists::history(&app, open).await?.to_string()),
        Command::Favorites { open } => Ok(lists::favorites(&app, open).await?.to_string()),
        Command::Whoami => Ok(config::whoami(&app)),
        Command::Config { .. } => Ok(String::new()),
    }
}

async fn scan_from_terminal(app: &AppState) -> ApiResult<String> {
    app.workflow.select_mode(ScanMode::Barcode).await?;
    let watcher = app.workflow.cancel_handle().map(|handle| {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        })
    });

    eprintln!("Reading frames from stdin, one per line. Ctrl-C to cancel.");
    let report = scan::scan_barcode(app).await;

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    Ok(report?.to_string())
}

async fn camera(app: &AppState, auto_confirm: bool) -> ApiResult<String> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stderr = tokio::io::stderr();

    let mut preview = scan::start_camera(app).await?;
    loop {
        let choice = if auto_confirm {
            CameraChoice::Analyze
        } else {
            scan::ask_choice(&mut input, &mut stderr, &preview).await
        };
        match scan::camera_step(app, choice).await? {
            CameraStep::Preview(next) => preview = next,
            CameraStep::Done(report) => return Ok(report.to_string()),
        }
    }
}
