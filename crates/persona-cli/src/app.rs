//! The `persona` application: logging, source wiring, and command dispatch.

use crate::cli::{CliArgs, Command};
use crate::config::PersonaConfig;
use crate::config_handlers;
use persona_core::source::{HttpContentSource, RetryingSource};
use persona_core::{ContentSource, Error, Result, fetch_profile, static_props};
use persona_render::render_state;
use persona_server::AppState;
use persona_swr::PageState;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The CLI application.
pub struct PersonaCli {
    config: Arc<PersonaConfig>,
    version: String,
}

impl PersonaCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        Ok(Self::new(PersonaConfig::load(args.config.as_deref())?))
    }

    /// Create with an already loaded config.
    pub fn new(config: PersonaConfig) -> Self {
        Self {
            config: Arc::new(config),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// The configured upstream, with retries.
    pub fn source(&self) -> Result<Arc<dyn ContentSource>> {
        let upstream = &self.config.upstream;
        let http = HttpContentSource::new(&upstream.url, upstream.timeout())?;
        let retrying =
            RetryingSource::new(Arc::new(http)).with_max_attempts(upstream.max_attempts);
        Ok(Arc::new(retrying))
    }

    /// Run one command.
    pub async fn run(&self, command: Option<Command>) -> Result<()> {
        match command {
            Some(Command::Serve { port }) => self.serve(port).await,
            Some(Command::Build { output }) => {
                let html = self.build_page(self.source()?.as_ref()).await;
                match output {
                    Some(path) => write_output(Path::new(&path), &html),
                    None => {
                        print!("{html}");
                        Ok(())
                    }
                }
            }
            Some(Command::Fetch) => {
                println!("{}", self.fetch_json(self.source()?.as_ref()).await?);
                Ok(())
            }
            Some(Command::Version) | None => {
                println!("persona {}", self.version);
                Ok(())
            }
            // Handled before config is loaded.
            Some(Command::Config(_)) => Ok(()),
        }
    }

    async fn serve(&self, port: Option<u16>) -> Result<()> {
        let server = &self.config.server;
        let port = port.unwrap_or(server.port);
        let addr = resolve_addr(&server.host, port).await?;

        let source = self.source()?;
        info!(upstream = %source.describe(), "preparing page");
        let state = AppState::prepare(source, self.config.site.clone()).await;
        persona_server::serve(state, addr).await
    }

    /// Renders the page once from static props.
    ///
    /// An unreachable upstream yields the loading view rather than an error.
    pub async fn build_page(&self, source: &dyn ContentSource) -> String {
        let props = static_props(source).await;
        let state = match props.data {
            Some(profile) => PageState::Ready(Arc::new(profile)),
            None => {
                warn!("no profile data; rendering the loading view");
                PageState::Loading
            }
        };
        render_state(&state, &self.config.site)
    }

    /// One read of `source`, as pretty JSON.
    pub async fn fetch_json(&self, source: &dyn ContentSource) -> Result<String> {
        let profile = fetch_profile(source).await?;
        serde_json::to_string_pretty(&profile).map_err(|e| Error::serialization(e.to_string()))
    }
}

/// Runs the process for parsed `args`.
///
/// Config subcommands bypass config loading so they can repair a broken file.
pub async fn run(args: CliArgs) -> Result<()> {
    PersonaCli::init_logging(args.verbose, args.quiet);

    let mut args = args;
    match args.command.take() {
        Some(Command::Config(config_cmd)) => {
            config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
        }
        command => PersonaCli::from_args(&args)?.run(command).await,
    }
}

async fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::config(format!("cannot resolve {host}:{port}: {e}")))?
        .next()
        .ok_or_else(|| Error::config(format!("no address for {host}:{port}")))
}

fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    std::fs::write(path, html).map_err(|e| Error::io_with_path(e, path))?;
    info!(path = %path.display(), "page written");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use persona_core::source::MockContentSource;
    use persona_core::{FetchError, ProfileInfo, StyledTextFragment};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ada() -> ProfileInfo {
        ProfileInfo {
            name: Some(vec![StyledTextFragment::plain("Ada Lovelace")]),
            ..Default::default()
        }
    }

    fn cli_for(url: &str) -> PersonaCli {
        let mut config = PersonaConfig::default();
        config.upstream.url = url.to_string();
        config.upstream.max_attempts = 1;
        config.site.title = "Ada".into();
        PersonaCli::new(config)
    }

    #[tokio::test]
    async fn test_build_page_renders_profile() {
        let cli = cli_for("http://unused");
        let source = MockContentSource::with_profile(ada());
        let html = cli.build_page(&source).await;
        assert!(html.contains("Ada Lovelace</h1>"));
        assert!(html.contains("<title>Ada</title>"));
    }

    #[tokio::test]
    async fn test_build_page_survives_failing_source() {
        let cli = cli_for("http://unused");
        let source = MockContentSource::failing(FetchError::unreachable("down"));
        let html = cli.build_page(&source).await;
        assert!(html.contains("Loading…"));
    }

    #[tokio::test]
    async fn test_fetch_json_propagates_failure() {
        let cli = cli_for("http://unused");
        let source = MockContentSource::failing(FetchError::malformed("bad"));
        assert!(matches!(
            cli.fetch_json(&source).await,
            Err(Error::Fetch(FetchError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn test_configured_source_reads_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ada()))
            .mount(&server)
            .await;

        let cli = cli_for(&format!("{}/info", server.uri()));
        let source = cli.source().unwrap();
        let json = cli.fetch_json(source.as_ref()).await.unwrap();
        let decoded: ProfileInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, ada());
    }

    #[tokio::test]
    async fn test_build_writes_output_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ada()))
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("site").join("index.html");
        let cli = cli_for(&server.uri());
        cli.run(Some(Command::Build {
            output: Some(out.to_string_lossy().into_owned()),
        }))
        .await
        .unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("Ada Lovelace</h1>"));
    }

    #[tokio::test]
    async fn test_run_version_command() {
        let cli = cli_for("http://unused");
        assert!(cli.run(Some(Command::Version)).await.is_ok());
        assert!(cli.run(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_config_init_without_loading_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("config.toml");
        let args = CliArgs::try_parse_from([
            "persona",
            "--config",
            "/nonexistent/broken.toml",
            "config",
            "init",
            "--file",
            file.to_str().unwrap(),
        ])
        .unwrap();

        run(args).await.unwrap();
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_resolve_addr() {
        let addr = resolve_addr("127.0.0.1", 3000).await.unwrap();
        assert_eq!(addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        PersonaCli::init_logging(false, false);
        PersonaCli::init_logging(true, false);
    }
}
