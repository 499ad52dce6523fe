//! echoback - request echo service with hostname-driven redaction.

use clap::{Args, Parser, Subcommand};
use eb_config::{load_config, validate_config, LoadedConfig};
use eb_server::exit_codes::ExitCode;
use eb_server::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use eb_server::{load_engine, AppState, EchoServer};
use serde_json::json;
use std::path::PathBuf;
use tracing::error;

/// Echo HTTP requests back as JSON, redacting secrets for marked hostnames
#[derive(Parser)]
#[command(name = "echoback")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to echoback.toml (overrides ECHOBACK_CONFIG and config dirs)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format (human, jsonl)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the echo server in the foreground
    Serve(ServeArgs),

    /// Resolve and validate configuration and redaction policy
    Check,

    /// Print how a hostname is classified (redacted, not_redacted, unmarked)
    Classify {
        /// Hostname to classify
        hostname: String,
    },

    /// Redact a URL the way the server would for its host
    RedactUrl {
        /// Absolute URL
        url: String,
    },

    /// Print the effective redaction policy as JSON
    Policy,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Listen address (overrides config and ECHOBACK_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Listen port, 0 for ephemeral (overrides config and ECHOBACK_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Worker thread count
    #[arg(long)]
    workers: Option<usize>,

    /// Redaction policy JSON file
    #[arg(long)]
    policy: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match cli.command {
        Commands::Serve(ref args) => run_serve(&cli.global, args),
        Commands::Check => run_check(&cli.global),
        Commands::Classify { ref hostname } => run_classify(&cli.global, hostname),
        Commands::RedactUrl { ref url } => run_redact_url(&cli.global, url),
        Commands::Policy => run_policy(&cli.global),
    };

    std::process::exit(exit_code.as_i32());
}

/// Print a structured error to stderr and return its exit code.
fn fail(code: ExitCode, message: impl std::fmt::Display) -> ExitCode {
    let body = json!({
        "error": {
            "code": code.code_name(),
            "message": message.to_string(),
        }
    });
    eprintln!("{}", body);
    code
}

fn load(global: &GlobalOpts) -> Result<LoadedConfig, ExitCode> {
    load_config(global.config.as_deref()).map_err(|e| fail(ExitCode::ConfigError, e))
}

fn engine_for(loaded: &LoadedConfig) -> Result<eb_redact::RedactionEngine, ExitCode> {
    load_engine(&loaded.config).map_err(|e| fail(ExitCode::from(&e), e))
}

fn print_json(value: &serde_json::Value) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => fail(ExitCode::InternalError, e),
    }
}

fn run_serve(global: &GlobalOpts, args: &ServeArgs) -> ExitCode {
    let mut loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let config = &mut loaded.config;
    if let Some(ref bind) = args.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(ref policy) = args.policy {
        config.redaction_policy = Some(policy.clone());
    }
    if let Err(e) = validate_config(config) {
        return fail(ExitCode::ConfigError, e);
    }

    let engine = match engine_for(&loaded) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let state = AppState::new(&loaded.config, engine);
    match EchoServer::start(&loaded.config, state) {
        Ok(server) => {
            server.join();
            ExitCode::Clean
        }
        Err(e) => {
            error!(error = %e, "failed to start echo server");
            fail(ExitCode::from(&e), e)
        }
    }
}

fn run_check(global: &GlobalOpts) -> ExitCode {
    let loaded = match load(global) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let engine = match engine_for(&loaded) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let config = &loaded.config;
    let listen = match config.socket_addr() {
        Ok(addr) => addr.to_string(),
        Err(e) => return fail(ExitCode::ConfigError, e),
    };

    print_json(&json!({
        "status": "ok",
        "config": {
            "path": loaded.path.as_ref().map(|p| p.display().to_string()),
            "source": loaded.source.to_string(),
        },
        "listen": listen,
        "workers": config.workers,
        "scheme": config.scheme,
        "max_body_bytes": config.max_body_bytes,
        "policy": {
            "path": config.redaction_policy.as_ref().map(|p| p.display().to_string()),
            "schema_version": engine.policy_version(),
            "header_rules": engine.header_redactor().rules().len(),
            "query_param_rules": engine.query_redactor().rules().len(),
        },
        "reserved_hostnames": config.routing.reserved_hostnames(),
        "canonical_root": config.routing.canonical_root,
    }))
}

fn run_classify(global: &GlobalOpts, hostname: &str) -> ExitCode {
    let engine = match load(global).and_then(|loaded| engine_for(&loaded)) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let class = engine.classify(hostname);
    println!("{}", class);
    if class.should_redact() {
        ExitCode::Redacted
    } else {
        ExitCode::Clean
    }
}

fn run_redact_url(global: &GlobalOpts, raw: &str) -> ExitCode {
    let engine = match load(global).and_then(|loaded| engine_for(&loaded)) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let url = match url::Url::parse(raw) {
        Ok(url) => url,
        Err(e) => return fail(ExitCode::ArgsError, format!("invalid url '{}': {}", raw, e)),
    };
    let hostname = url.host_str().unwrap_or_default();

    let should_redact = engine.is_hostname_redacted(hostname);
    println!("{}", engine.redact_url(raw, should_redact).output);
    ExitCode::Clean
}

fn run_policy(global: &GlobalOpts) -> ExitCode {
    let engine = match load(global).and_then(|loaded| engine_for(&loaded)) {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    match serde_json::to_value(engine.policy()) {
        Ok(value) => print_json(&value),
        Err(e) => fail(ExitCode::InternalError, e),
    }
}
