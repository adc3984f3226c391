//! Trippy - AI travel planner
//!
//! Two modes:
//! - **Web mode** (default, `trippy serve`): serves the trip form and streams
//!   the crew's progress to the page
//! - **Plan mode** (`trippy plan ...`): runs one plan in the terminal

mod terminal;

use std::path::PathBuf;
use std::sync::Arc;
use terminal::TerminalView;
use trippy_core::{
    config::{load_config, load_from_file},
    ChunkRenderer, Notification, OrchestrationInvoker, RelaySink, TravelCrew, TripForm,
    TrippyConfig,
};

/// What to run
#[derive(Debug, PartialEq)]
enum Mode {
    Serve {
        port: Option<u16>,
        open_browser: bool,
    },
    Plan(TripForm),
    Help,
}

/// Command-line arguments
#[derive(Debug, PartialEq)]
struct Args {
    mode: Mode,

    /// Config file to use instead of the project/user lookup
    config: Option<PathBuf>,

    /// `<provider>/<model>` override
    model: Option<String>,
}

impl Args {
    /// Parse command-line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = args.into_iter().peekable();
        let planning = match args.peek().map(String::as_str) {
            Some("plan") => {
                args.next();
                true
            }
            Some("serve") => {
                args.next();
                false
            }
            _ => false,
        };

        let mut port = None;
        let mut open_browser = true;
        let mut config = None;
        let mut model = None;
        let mut form = TripForm::default();
        let mut help = false;

        while let Some(arg) = args.next() {
            let mut value = |name: &str| {
                args.next()
                    .ok_or_else(|| anyhow::anyhow!("{} expects a value", name))
            };
            match arg.as_str() {
                "--port" | "-p" => port = Some(value("--port")?.parse::<u16>()?),
                "--no-browser" => open_browser = false,
                "--config" | "-c" => config = Some(PathBuf::from(value("--config")?)),
                "--model" | "-m" => model = Some(value("--model")?),
                "--origin" => form.origin = value("--origin")?,
                "--destination" => form.destination = value("--destination")?,
                "--from" => form.date_start = value("--from")?,
                "--to" => form.date_end = value("--to")?,
                "--interests" => form.interests = value("--interests")?,
                "--help" | "-h" => help = true,
                _ => {
                    // Ignore unknown flags
                }
            }
        }

        let mode = if help {
            Mode::Help
        } else if planning {
            Mode::Plan(form)
        } else {
            Mode::Serve { port, open_browser }
        };

        Ok(Self {
            mode,
            config,
            model,
        })
    }

    /// Resolve configuration: `--config`, then project/user files, then defaults
    fn load_config(&self) -> anyhow::Result<TrippyConfig> {
        let mut config = match &self.config {
            Some(path) => load_from_file(path)?,
            None => load_config(&std::env::current_dir()?)?,
        };
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Mode::Serve { port, open_browser } = &self.mode {
            if let Some(port) = port {
                config.server.port = *port;
            }
            config.server.open_browser &= *open_browser;
        }
        Ok(config)
    }
}

const USAGE: &str = "\
Usage:
  trippy [serve] [--port N] [--no-browser]
  trippy plan --origin <city> --destination <city> --from <YYYY-MM-DD> --to <YYYY-MM-DD> [--interests <text>]

Options:
  -c, --config <path>   Config file (default: .trippy.toml, then ~/.config/trippy/config.toml)
  -m, --model <id>      Model as <provider>/<model>, e.g. gemini/gemini-2.0-flash
";

fn main() -> anyhow::Result<()> {
    let args = Args::parse()?;
    let config = args.load_config()?;

    match args.mode {
        Mode::Help => {
            print!("{}", USAGE);
            Ok(())
        }
        Mode::Plan(form) => run_plan(config, form),
        Mode::Serve { .. } => run_web(config),
    }
}

/// Run one plan in the terminal
fn run_plan(config: TrippyConfig, form: TripForm) -> anyhow::Result<()> {
    init_logging();

    let request = form.into_request()?;
    let renderer = ChunkRenderer::from_config(&config.relay)?;
    let crew = TravelCrew::new(config.llm.clone());
    let mut invoker = OrchestrationInvoker::new(Arc::new(crew), config.llm.model.as_str());
    let mut relay = RelaySink::new(renderer, TerminalView::new(std::io::stdout()));

    if let Notification::Status { label, .. } = Notification::gathering() {
        println!("{}", label);
    }

    match invoker.invoke(request, &mut relay) {
        Ok(plan) => {
            if let Notification::Status { label, .. } = Notification::ready() {
                println!("\n\n{}\n", label);
            }
            println!("{}", plan.markdown);
            Ok(())
        }
        Err(failure) => {
            eprintln!("\n{}", failure);
            std::process::exit(1);
        }
    }
}

/// Logging for plan mode; stdout belongs to the plan
fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "trippy_core=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(feature = "web")]
fn run_web(config: TrippyConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let stop_tx = parking_lot::Mutex::new(Some(stop_tx));
    ctrlc::set_handler(move || {
        if let Some(tx) = stop_tx.lock().take() {
            let _ = tx.send(());
        }
    })?;

    let url = format!("http://{}:{}", config.server.host, config.server.port);
    let open_browser = config.server.open_browser;

    runtime.block_on(async move {
        let server = tokio::spawn(trippy_server::serve(config, async move {
            let _ = stop_rx.await;
            tracing::info!("Shutting down");
        }));

        if open_browser {
            if let Err(e) = open::that(&url) {
                tracing::warn!("Could not open browser at {}: {}", url, e);
            }
        }

        server.await?
    })
}

#[cfg(not(feature = "web"))]
fn run_web(_config: TrippyConfig) -> anyhow::Result<()> {
    anyhow::bail!("web mode is not available in this build; use `trippy plan`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(args.iter().map(|s| s.to_string())).unwrap()
    }

    #[test]
    fn test_default_is_serve() {
        let args = parse(&[]);
        assert_eq!(
            args.mode,
            Mode::Serve {
                port: None,
                open_browser: true
            }
        );
    }

    #[test]
    fn test_serve_flags() {
        let args = parse(&["serve", "--port", "9000", "--no-browser"]);
        assert_eq!(
            args.mode,
            Mode::Serve {
                port: Some(9000),
                open_browser: false
            }
        );
    }

    #[test]
    fn test_plan_args() {
        let args = parse(&[
            "plan",
            "--origin",
            "San Mateo, CA",
            "--destination",
            "Bali, Indonesia",
            "--from",
            "2025-06-01",
            "--to",
            "2025-06-10",
            "--interests",
            "hiking",
            "--model",
            "ollama/llama3",
        ]);
        assert_eq!(
            args,
            Args {
                mode: Mode::Plan(TripForm {
                    origin: "San Mateo, CA".into(),
                    destination: "Bali, Indonesia".into(),
                    date_start: "2025-06-01".into(),
                    date_end: "2025-06-10".into(),
                    interests: "hiking".into(),
                }),
                config: None,
                model: Some("ollama/llama3".into()),
            }
        );
    }

    #[test]
    fn test_missing_value() {
        assert!(Args::parse_from(["--port".to_string()]).is_err());
    }

    #[test]
    fn test_config_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trippy.toml");
        std::fs::write(&path, "[server]\nport = 3000\n").unwrap();

        let args = parse(&[
            "serve",
            "--config",
            path.to_str().unwrap(),
            "--no-browser",
            "--model",
            "openai/gpt-4o-mini",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(!config.server.open_browser);
        assert_eq!(config.llm.model, "openai/gpt-4o-mini");
    }
}
