use std::process::ExitCode;

use clap::Parser;
use reference_validator::cli::{Cli, Commands};
use reference_validator::config::Config;
use reference_validator::error::{LauncherError, Result};
use reference_validator::paths::{ResourceRoot, RunMode};
use reference_validator::supervisor::{
    port_in_use, CommandLauncher, HttpReadinessProbe, LaunchSettings, ReadinessProbe, Supervisor,
};
use reference_validator::{dialog, window};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dialog::install_panic_hook();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            dialog::show_launch_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match &cli.command {
        Some(Commands::Probe) => probe(&config),
        Some(Commands::Config { show, save }) => show_config(&config, *show, *save),
        Some(Commands::Launch) | None => return launch(config, cli.attach_only),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn probe(config: &Config) -> Result<()> {
    let runtime = build_runtime()?;
    runtime.block_on(async {
        let address = config.address();
        let in_use = port_in_use(&address, config.probe_timeout()).await;
        println!("ポート {}: {}", address, if in_use { "使用中" } else { "空き" });

        let probe = HttpReadinessProbe::new(config.server_url(), config.probe_timeout())?;
        match probe.check().await {
            Ok(()) => println!("✔ {} は応答しています", probe.url()),
            Err(e) => println!("✗ {} から応答がありません: {}", probe.url(), e),
        }
        Ok(())
    })
}

fn show_config(config: &Config, show: bool, save: bool) -> Result<()> {
    if save {
        config.save()?;
        println!("✔ 設定を保存: {}", Config::config_path()?.display());
    }
    if show || !save {
        println!("{}", serde_json::to_string_pretty(config)?);
    }
    Ok(())
}

fn launch(config: Config, attach_only: bool) -> ExitCode {
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            dialog::show_launch_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let root = ResourceRoot::resolve(config.resource_root.as_deref(), RunMode::detect());
    tracing::info!(root = %root.path.display(), mode = ?root.mode, "resolved resource root");

    let probe = match HttpReadinessProbe::new(config.server_url(), config.probe_timeout()) {
        Ok(probe) => probe,
        Err(e) => {
            dialog::show_launch_error(&e);
            return ExitCode::FAILURE;
        }
    };
    let launcher = CommandLauncher::new(config.backend.clone(), root.path.clone());
    let settings = LaunchSettings::from_config(&config, attach_only);
    let mut supervisor = Supervisor::new(settings, launcher, probe);

    match runtime.block_on(supervisor.start()) {
        Ok(ready) => {
            tracing::info!(attempts = ready.attempts, spawned = ready.spawned, "backend ready");
        }
        Err(e) => {
            if let Err(stop) = runtime.block_on(supervisor.shutdown()) {
                tracing::warn!(error = %stop, "failed to stop backend");
            }
            dialog::show_launch_error(&e);
            return ExitCode::FAILURE;
        }
    }

    let url = config.server_url();
    let on_quit = move || match runtime.block_on(supervisor.shutdown()) {
        Ok(outcome) => tracing::info!(?outcome, "shutdown complete"),
        Err(e) => tracing::warn!(error = %e, "failed to stop backend"),
    };

    if let Err(e) = window::run(&config.window, &url, root.mode.is_dev(), on_quit) {
        tracing::error!(error = %e, "window failed");
        dialog::show_launch_error(&LauncherError::Window(format!("{:#}", e)));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
