//! wirepool: a minimal HTTP/1.1 server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                      WIREPOOL                         │
//!                     │                                                       │
//!   Client ───────────┼─▶ acceptor ──try_admit──▶ bounded queue ──pop──┐     │
//!                     │      │                                          │     │
//!                     │      └─ full: "503 Server too busy!" + close    ▼     │
//!                     │                                     worker 0..N-1    │
//!                     │                                          │           │
//!                     │                    request parser ◀──────┘           │
//!                     │                          │                            │
//!                     │                          ▼                            │
//!                     │                 router  |  app adapter                │
//!                     │                          │                            │
//!   Client ◀──────────┼──── response builder ◀───┘  (then close)              │
//!                     └──────────────────────────────────────────────────────┘
//! ```
//!
//! The binary serves a small demo front-end; embedders use the library.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::{Parser, ValueEnum};

use wirepool::app::{AppResponse, Environment};
use wirepool::config::{load_config, validate_config, ConfigError, ServerConfig};
use wirepool::http::{Frontend, HandlerError, Server};
use wirepool::observability::{logging, metrics};
use wirepool::routing::Router;

#[derive(Parser)]
#[command(name = "wirepool")]
#[command(about = "Minimal HTTP/1.1 server with a fixed worker pool", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Worker thread count (overrides the config file).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Queue capacity before connections are rejected with 503.
    #[arg(long)]
    max_waiting: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Which demo front-end to serve.
    #[arg(long, value_enum, default_value_t = FrontendKind::Router)]
    app: FrontendKind,
}

#[derive(Clone, Copy, ValueEnum)]
enum FrontendKind {
    /// HTML form demo routes.
    Router,
    /// Application that echoes its environment.
    Env,
}

impl Cli {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(workers) = self.workers {
            config.pool.worker_count = workers;
        }
        if let Some(max_waiting) = self.max_waiting {
            config.pool.max_waiting = max_waiting;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        port = config.listener.port,
        workers = config.pool.worker_count,
        max_waiting = config.pool.max_waiting,
        read_timeout_secs = ?config.timeouts.read_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let frontend = match cli.app {
        FrontendKind::Router => Frontend::from(demo_router()),
        FrontendKind::Env => Frontend::app(echo_environment),
    };

    let server = Server::bind(&config, frontend)?;
    tracing::info!(
        address = %server.local_addr(),
        workers = server.worker_count(),
        "Serving"
    );
    server.run();
    Ok(())
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn demo_router() -> Router {
    Router::builder()
        .get("/new_id", |_| Ok(NEXT_ID.fetch_add(1, Ordering::SeqCst).to_string()))
        .get("/", |_| {
            Ok(r#"<form action="/" method="POST">
  <label for="who">Who are you?</label>
  <input type="text" name="who" />
  <input type="submit" value="That's me!" />
</form>
"#
            .to_string())
        })
        .post("/", |ctx| {
            let headers: Vec<String> = ctx
                .headers
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            Ok(format!(
                "Hello, {}\n<pre>\n  Form data: {}\n  Request headers: {:?}\n</pre>\n",
                ctx.form_data.get("who").unwrap_or_default(),
                ctx.form_data,
                headers
            ))
        })
        .build()
}

fn echo_environment(env: Environment) -> Result<AppResponse, HandlerError> {
    let mut response = AppResponse::new(200).header("content-type", "text/plain");
    for (key, value) in env.vars() {
        response = response.chunk(format!("{key}={value}\n"));
    }
    Ok(response.chunk(format!(
        "multithread={} multiprocess={} run_once={}\n",
        env.multithread, env.multiprocess, env.run_once
    )))
}
