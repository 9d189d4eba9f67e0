use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tenant_router::config::{load_config, ObservabilityConfig, ServerConfig};
use tenant_router::observability::logging::init_logging;
use tenant_router::routing::StageResolver;

#[derive(Parser)]
#[command(name = "router-check")]
#[command(about = "Validate tenant router settings and expand staged host keys", long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Host key to expand into the hostname served under each stage
    #[arg(long, conflicts_with = "host")]
    key: Option<String>,

    /// Real hostname to map back to its host key
    #[arg(long)]
    host: Option<String>,

    /// Stage to assume (required with --host, a filter with --key)
    #[arg(long)]
    stage: Option<String>,

    /// Log level for diagnostics printed while loading
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = ObservabilityConfig {
        log_level: cli.log_level.clone(),
        ..ObservabilityConfig::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Warning: logging unavailable: {e}");
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    print_summary(&config);

    let explained = match (cli.key.as_deref(), cli.host.as_deref()) {
        (Some(key), _) => explain_key(&config, key, cli.stage.as_deref()),
        (None, Some(host)) => explain_host(&config, host, cli.stage.as_deref().unwrap_or_default()),
        (None, None) => Ok(()),
    };
    if let Err(message) = explained {
        eprintln!("Error: {message}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn print_summary(config: &ServerConfig) {
    println!("Settings OK");
    println!("  listener:      {}", config.listener.bind_address);
    println!("  request limit: {} bytes, {}s", config.listener.max_body_bytes, config.timeouts.request_secs);
    println!("  host matching: {:?}", config.routing.host_matching);

    let stage = &config.routing.stage;
    if stage.enabled() {
        let mut stages: Vec<_> = stage.stages.iter().collect();
        stages.sort();
        println!("  stage keyword: {} (source: {:?})", stage.keyword, stage.source);
        for (id, fragment) in stages {
            println!("    {:>8} -> {:?}", format!("{id:?}"), fragment);
        }
    } else {
        println!("  stage keyword: disabled");
    }

    if config.local.enabled {
        println!("  local mount:   {} -> {}", config.local.mount, config.local.host);
    }
    if config.observability.metrics_enabled {
        println!("  metrics:       {}", config.observability.metrics_address);
    }
}

fn stage_resolver(config: &ServerConfig) -> Option<StageResolver> {
    config
        .routing
        .stage
        .to_stage_config()
        .as_ref()
        .and_then(StageResolver::new)
}

fn explain_host(config: &ServerConfig, host: &str, stage: &str) -> Result<(), String> {
    let host = host.to_lowercase();
    let Some(resolver) = stage_resolver(config) else {
        println!("{host} -> {host} (staging disabled)");
        return Ok(());
    };
    resolver.validate(stage).map_err(|e| e.to_string())?;
    let key = resolver.substitute(&host, stage);
    let stage = if stage.is_empty() { "<none>" } else { stage };
    println!("{host} -> stage {stage} -> key {key}");
    Ok(())
}

fn explain_key(config: &ServerConfig, key: &str, stage: Option<&str>) -> Result<(), String> {
    let key = key.to_lowercase();
    let Some(resolver) = stage_resolver(config) else {
        println!("{key} -> {key} (staging disabled)");
        return Ok(());
    };

    if let Some(stage) = stage {
        resolver.validate(stage).map_err(|e| e.to_string())?;
    }

    let Some(hosts) = resolver.expand(&key) else {
        println!("{key} -> {key} (no stage keyword; served under every stage)");
        return Ok(());
    };

    for (id, host) in hosts {
        if stage.is_some_and(|stage| stage != id) {
            continue;
        }
        let id = if id.is_empty() { "<none>" } else { id.as_str() };
        println!("{key} -> stage {id} -> {host}");
    }
    Ok(())
}
