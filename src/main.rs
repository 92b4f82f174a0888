use anyhow::Result;
use clap::Parser;
use std::io;
use tracing::{info, warn};
mod config;
mod error;
mod events;
pub mod mappings;
mod services;
mod utils;

use config::Config;
use services::{create_window_server, WindowManager};

#[derive(Parser, Debug)]
#[command(name = "slotwm")]
#[command(about = "Минимальный оконный менеджер X11: окна на клавишах 1..9 и строка состояния для lemonbar")]
struct Args {
    /// Путь к файлу конфигурации (необязателен)
    #[arg(short, long, default_value = "slotwm.toml")]
    config: String,

    /// Режим сухого запуска: вместо X-сервера проигрывается встроенный сценарий
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает logging.level из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    init_tracing(args.log_level.as_deref().unwrap_or(&config.logging.level))?;

    info!("Запуск slotwm v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - X-сервер эмулируется");
    } else {
        utils::check_session()?;
    }

    // Без соединения с сервером работать нечем: ошибка здесь завершает процесс
    let server = create_window_server(&config, args.dry_run)?;

    // stdout читает бар, логи идут в stderr
    let stdout = io::stdout();
    let mut manager = WindowManager::new(&config, server, stdout.lock())?;

    manager.start()?;
    manager.run()?;

    info!("slotwm завершил работу");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr),
        )
        .init();

    Ok(())
}
