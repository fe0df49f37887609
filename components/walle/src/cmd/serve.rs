// Local crates
use crate::api::serve::{self, ServeConfig};
use crate::app::app::App;
use crate::helpers::shutdown::Shutdown;

// External crates
use anyhow::Result;
use clap::Args;
use tracing::{error, info};

/// Default listen address when domain args signal a public deployment.
pub const HTTP_ADDR_PUBLIC: &str = "0.0.0.0:80";
/// Default TLS listen address when domain args signal a public deployment.
pub const HTTPS_ADDR_PUBLIC: &str = "0.0.0.0:443";
/// Default loopback address for local development serving.
pub const HTTP_ADDR_DEV: &str = "127.0.0.1:8090";

/// Flags of the `serve` subcommand.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Optional domain(s) to issue the TLS certificate for
    #[arg(value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// CORS allowed domain origins list
    #[arg(long, value_name = "ORIGINS", value_delimiter = ',', default_value = "*")]
    pub origins: Vec<String>,

    /// TCP address to listen for the HTTP server
    /// (if domain args are specified - default to 0.0.0.0:80, otherwise - default to 127.0.0.1:8090)
    #[arg(long, value_name = "ADDR")]
    pub http: Option<String>,

    /// TCP address to listen for the HTTPS server
    /// (if domain args are specified - default to 0.0.0.0:443, otherwise - default to none, aka. no TLS)
    #[arg(long, value_name = "ADDR")]
    pub https: Option<String>,
}

/// Address-defaulting policy of the `serve` subcommand.
///
/// Supplying domain args signals intent to serve publicly with TLS, so both
/// listeners default to the well-known ports. Without domains the server
/// stays on a loopback development address and TLS remains off unless an
/// HTTPS address was given explicitly. Explicit flags always win.
pub fn resolve_addresses(
    has_domains: bool,
    http: Option<String>,
    https: Option<String>,
) -> (String, Option<String>) {
    if has_domains {
        (
            http.unwrap_or_else(|| HTTP_ADDR_PUBLIC.to_string()),
            Some(https.unwrap_or_else(|| HTTPS_ADDR_PUBLIC.to_string())),
        )
    } else {
        (http.unwrap_or_else(|| HTTP_ADDR_DEV.to_string()), https)
    }
}

/// Starts the web server and blocks until a termination signal arrives or
/// the server fails.
pub async fn run(app: &dyn App, args: ServeArgs) -> Result<()> {
    let (http_addr, https_addr) =
        resolve_addresses(!args.domains.is_empty(), args.http, args.https);

    let config = ServeConfig {
        http_addr,
        https_addr,
        certificate_domains: args.domains,
        allowed_origins: args.origins,
    };

    let shutdown = Shutdown::new();
    let handle = serve::serve(app, config, shutdown.clone()).await?;

    info!(addr = %handle.addr(), "web server started");

    // Termination signals fan out through the shutdown channel; the server
    // drains in-flight connections before the command returns.
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => info!("shutdown signal received"),
            Err(err) => error!(error = %err, "signal listener failed, stopping"),
        }
        trigger.trigger();
    });

    handle.wait().await?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{Cli, Commands};
    use clap::Parser;

    fn parse_serve(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv.iter().copied()).expect("argv should parse");
        match cli.command {
            Some(Commands::Serve(args)) => args,
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn domains_imply_public_http_and_https() {
        let (http, https) = resolve_addresses(true, None, None);
        assert_eq!(http, HTTP_ADDR_PUBLIC);
        assert_eq!(https.as_deref(), Some(HTTPS_ADDR_PUBLIC));
    }

    #[test]
    fn no_domains_default_to_loopback_without_tls() {
        let (http, https) = resolve_addresses(false, None, None);
        assert_eq!(http, HTTP_ADDR_DEV);
        assert_eq!(https, None);
    }

    #[test]
    fn explicit_addresses_always_win() {
        let (http, https) = resolve_addresses(
            true,
            Some("10.0.0.1:8080".to_string()),
            Some("10.0.0.1:8443".to_string()),
        );
        assert_eq!(http, "10.0.0.1:8080");
        assert_eq!(https.as_deref(), Some("10.0.0.1:8443"));

        let (http, https) = resolve_addresses(false, None, Some("127.0.0.1:8443".to_string()));
        assert_eq!(http, HTTP_ADDR_DEV);
        assert_eq!(https.as_deref(), Some("127.0.0.1:8443"));
    }

    #[test]
    fn origins_default_to_wildcard() {
        let args = parse_serve(&["walle", "serve"]);
        assert_eq!(args.origins, vec!["*".to_string()]);
        assert!(args.domains.is_empty());
    }

    #[test]
    fn origins_flag_splits_on_commas() {
        let args = parse_serve(&["walle", "serve", "--origins=a.com,b.com"]);
        assert_eq!(args.origins, vec!["a.com".to_string(), "b.com".to_string()]);
    }

    #[test]
    fn positional_domains_are_collected_in_order() {
        let args = parse_serve(&["walle", "serve", "example.com", "other.org"]);
        assert_eq!(
            args.domains,
            vec!["example.com".to_string(), "other.org".to_string()]
        );
    }
}
