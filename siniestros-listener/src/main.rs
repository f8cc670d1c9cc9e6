use anyhow::Context;
use clap::Parser;
use pingora::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::{RequestClassifier, RuleSet};
use crate::config::AppConfig;
use crate::server::listener::WebhookSvc;
use crate::server::pipeline::RequestPipeline;
use crate::server::static_files::StaticFiles;
use crate::webhook::TolerantBodyDecoder;

mod classify;
mod config;
mod metrics;
mod obs;
mod server;
mod telemetry;
mod webhook;

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Debug, Parser)]
#[command(name = "siniestros-listener", version, about = "Webhook listener that echoes payloads and drops scanner traffic")]
struct Args {
    /// Path to config.yaml (relative paths inside config are resolved against its directory)
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Listen address for the webhook listener, overrides `listen` in config
    #[arg(long)]
    listen: Option<String>,
}

/// `None` when the default config file is absent everywhere; the built-in
/// defaults apply then. An explicit path is returned as-is so a typo fails
/// loudly.
fn locate_config(p: PathBuf) -> Option<PathBuf> {
    if p.exists() || p != Path::new(DEFAULT_CONFIG) {
        return Some(p);
    }

    let exe = std::env::current_exe().ok()?;
    let cand = exe.parent()?.join(DEFAULT_CONFIG);
    cand.exists().then_some(cand)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg_path = locate_config(args.config);

    let mut cfg = match &cfg_path {
        Some(p) => AppConfig::load(p)?,
        None => AppConfig::default(),
    };
    if let Some(listen) = args.listen {
        cfg.listen = Some(listen);
    }

    let log_dir = cfg.log_dir_path();
    telemetry::init_tracing("siniestros", &log_dir)?;
    match &cfg_path {
        Some(p) => tracing::info!("config loaded from {}", p.display()),
        None => tracing::info!("no {} found, using built-in defaults", DEFAULT_CONFIG),
    }

    let obs = obs::ObsSink::new(&log_dir)?;
    tracing::info!("access log in {}", obs.log_dir().display());

    let rules = match &cfg.rules_path {
        Some(p) => classify::rules::compile_from_file(p)?,
        None => RuleSet::builtin().context("compile built-in rules")?,
    };
    let classifier = RequestClassifier::new(Arc::new(rules));
    tracing::info!(
        version = classifier.rules().version().unwrap_or("builtin"),
        paths = classifier.rules().path_fragments().len(),
        agents = classifier.rules().agent_fragments().len(),
        "scanner rules ready"
    );

    let static_files = StaticFiles::new(cfg.web_dir_path());
    tracing::info!("serving /web from {}", static_files.root().display());

    let pipeline = RequestPipeline::new(
        classifier,
        Arc::new(TolerantBodyDecoder),
        Arc::new(cfg.messages.clone()),
        static_files,
    )
    .with_obs(obs);

    let mut my_server = Server::new(None)?;
    my_server.bootstrap();

    let metrics_svc = background_service(
        "metrics",
        crate::metrics::service::MetricsSvc::new(cfg.metrics_addr()),
    );
    my_server.add_service(metrics_svc);

    let listener_svc = background_service(
        "listener",
        WebhookSvc::new(cfg.listen_addr(), Arc::new(pipeline)),
    );
    my_server.add_service(listener_svc);

    my_server.run_forever();
}
