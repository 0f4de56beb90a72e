use clap::{ArgAction, Parser, Subcommand};
use std::error::Error;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use stayfront::error::{
    CaptureRequest, ErrorCategory, ErrorMonitoringService, ErrorSink, HttpSink, RecoveryStrategy,
    Severity,
};
use stayfront::logging::{init_logging, LoggingConfig};
use stayfront::navigation::LoggingNavigator;
use stayfront::notification::{
    NotificationCenter, NotificationKind, NotificationRenderer, NotificationSpec,
};
use stayfront::StayfrontConfig;

#[derive(Parser, Debug)]
#[command(name = "stayfront")]
#[command(version)]
#[command(about = "Error monitoring and toast notifications for the booking front end")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet", global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Disable colors (also respects NO_COLOR environment variable)
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (TOML); STAYFRONT__* environment variables override it
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Capture an error and print the resulting report as JSON
    Capture {
        /// Error message
        message: String,

        /// Severity: low, medium, high, critical
        #[arg(long, short, default_value = "medium")]
        severity: Severity,

        /// Category; inferred from the message when omitted
        #[arg(long, short)]
        category: Option<ErrorCategory>,

        /// Extra data attached to the report (repeatable)
        #[arg(long = "data", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        data: Vec<(String, String)>,

        /// Register a redirect strategy for the report's category
        #[arg(long, value_name = "URL")]
        redirect: Option<String>,

        /// Current user id
        #[arg(long)]
        user: Option<String>,

        /// Current page location
        #[arg(long)]
        url: Option<String>,
    },
    /// Print the category inferred for a message
    Classify {
        message: String,
    },
    /// Render a toast panel
    Toast {
        title: String,

        #[arg(long, short)]
        message: Option<String>,

        /// success, error, warning or info
        #[arg(long, short, default_value = "info")]
        kind: NotificationKind,

        /// Never auto-dismiss
        #[arg(long, conflicts_with = "duration_ms")]
        persistent: bool,

        /// Auto-dismiss delay in milliseconds
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(
        LoggingConfig::from_cli(cli.verbose, cli.quiet).with_ansi(!cli.no_color),
    );

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = StayfrontConfig::load_or_env(cli.config.as_ref())?;
    let use_color =
        !cli.no_color && std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Capture {
            message,
            severity,
            category,
            data,
            redirect,
            user,
            url,
        } => {
            let service = ErrorMonitoringService::builder(config.monitoring.clone())
                .navigator(Arc::new(LoggingNavigator))
                .build();

            if let Some(user) = user {
                service.set_user(user);
            }
            if let Some(url) = url {
                service.set_location(url);
            }

            let category = category.unwrap_or_else(|| service.detector().categorize(&message));
            if let Some(target) = redirect {
                service.register_recovery_strategy(category, RecoveryStrategy::redirect(target));
            }

            let mut request = CaptureRequest::new(message)
                .severity(severity)
                .category(category);
            for (key, value) in data {
                let value = serde_json::from_str(&value)
                    .unwrap_or(serde_json::Value::String(value));
                request = request.data(key, value);
            }

            let outcome = service.capture(request);
            let report = service
                .get_error_report(&outcome.error_id)
                .ok_or("captured report was not retained")?;

            // The CLI exits right away, so deliver inline instead of in the
            // background
            if let Some(endpoint) = &config.monitoring.sink_endpoint {
                if config.monitoring.mode.is_production() {
                    let sink = HttpSink::new(endpoint.clone(), config.monitoring.sink_timeout())?;
                    if let Err(e) = sink.send(&report).await {
                        tracing::warn!(error = %e, "Failed to forward error report");
                    }
                }
            }

            let output = serde_json::json!({
                "report": report,
                "recovery": outcome.action.map(|action| action.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Classify { message } => {
            let detector = stayfront::error::ErrorDetector::new();
            match detector.detect(&message) {
                Some(detection) => println!(
                    "{} ({}): {}",
                    detection.category, detection.severity, detection.description
                ),
                None => println!("{}", ErrorCategory::Unknown),
            }
        }
        Commands::Toast {
            title,
            message,
            kind,
            persistent,
            duration_ms,
        } => {
            let center = NotificationCenter::new(config.notifications.clone());
            let mut spec = NotificationSpec::new(kind, title).persistent(persistent);
            if let Some(message) = message {
                spec = spec.message(message);
            }
            if let Some(ms) = duration_ms {
                spec = spec.duration(Duration::from_millis(ms));
            }
            center.add_notification(spec)?;

            let renderer = NotificationRenderer::new().with_color(use_color);
            println!("{}", renderer.render_all(&center.notifications()));
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
