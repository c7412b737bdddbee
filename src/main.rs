use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};
mod actions;
mod config;
mod error;
mod events;
mod gestures;
mod services;
mod utils;

use actions::CatalogueFactory;
use config::Config;
use gestures::AttributeRecognizer;
use services::{
    create_event_source,
    create_windowing_protocol,
    GestureDispatcher,
    TokioTimer,
    WindowResolver,
};

#[derive(Parser, Debug)]
#[command(name = "touchd")]
#[command(about = "Демон, превращающий мультитач-жесты в действия над окнами X11")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "touchd.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция жестов и оконной системы)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (переопределяет значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    // Инициализация системы логирования
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(log_level, &config.logging.format)?;

    info!("Запуск touchd v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Конфигурация загружена из: {} ({} привязок)",
        args.config,
        config.bindings.len()
    );

    if config.bindings.is_empty() {
        warn!("Привязки жестов не заданы: все жесты будут без действия (см. touchd.toml)");
    }

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    } else {
        // Проверка сессии X11
        utils::display::check_x11_session()?;
    }

    // Инициализация компонентов
    let composed_window = Duration::from_millis(config.dispatcher.composed_gestures_time_ms);
    let protocol = create_windowing_protocol(args.dry_run);
    let dispatcher = GestureDispatcher::new(
        Arc::new(AttributeRecognizer::new()),
        Arc::new(CatalogueFactory::new(protocol.clone(), args.dry_run)),
        config.clone(),
        WindowResolver::new(protocol),
        Arc::new(TokioTimer::new(tokio::runtime::Handle::current())),
        composed_window,
    );
    let event_source = create_event_source(config.clone(), dispatcher.clone(), args.dry_run)?;

    info!("Все компоненты инициализированы");

    let mut source_handle = tokio::spawn(async move {
        if let Err(e) = event_source.run().await {
            error!("Ошибка в EventSource: {}", e);
        }
    });

    info!("Источник событий запущен");

    // Ожидание сигнала завершения или конца ввода
    let source_finished = tokio::select! {
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
            }
            source_handle.abort();
            false
        }
        _ = &mut source_handle => {
            // Даём ожидающему tap дождаться своего таймера
            info!("Источник событий завершился, ожидание отложенных жестов");
            tokio::time::sleep(composed_window * 2).await;
            true
        }
    };

    info!("Завершение работы...");

    // Текущий жест отбрасывается без finish, таймер отменяется
    dispatcher.shutdown();

    if !source_finished {
        let shutdown_timeout = Duration::from_secs(5);
        match tokio::time::timeout(shutdown_timeout, source_handle).await {
            Ok(_) => info!("Все сервисы завершили работу корректно"),
            Err(_) => warn!("Таймаут при завершении сервисов"),
        }
    }

    info!("touchd завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
