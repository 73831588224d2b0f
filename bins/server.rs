use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    // .env first so RUST_LOG / SERVER_* / DATA_FILE take effect
    dotenv().ok();

    let cfg = configs::AppConfig::load_and_validate();
    let log_format = cfg
        .as_ref()
        .map(|c| c.server.log_format.clone())
        .unwrap_or_else(|_| "compact".to_string());
    common::utils::logging::init_logging_for(&log_format);
    info!(service = "resource_server", event = "logger_init", "tracing subscriber initialized");

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "resource_server", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "resource_server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "resource_server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "resource_server",
        event = "start",
        %service_id,
        pid,
        version,
        addr = %cfg.server.bind_addr(),
        data_file = %cfg.storage.path,
        "resource server starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "resource_server", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "resource_server", event = "run_failed", %service_id, error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
    }
}
