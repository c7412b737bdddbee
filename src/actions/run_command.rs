use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Команда из настроек `COMMAND=<строка>` или просто `<строка>`
pub fn parse_command(settings: &str) -> Option<String> {
    let line = settings.trim();
    let line = line.strip_prefix("COMMAND=").unwrap_or(line).trim();
    if line.is_empty() {
        warn!("Пустые настройки RUN_COMMAND, действие будет пропущено");
        return None;
    }
    Some(line.to_string())
}

/// Запустить команду через `sh -c`, не дожидаясь её завершения
pub fn spawn_detached(command: &str, dry_run: bool) {
    if dry_run {
        info!("[DRY RUN] Запуск команды: {}", command);
        return;
    }

    match Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            info!("Запущена команда '{}' (pid {})", command, child.id());
            // Собираем статус в фоне, чтобы не оставлять зомби
            std::thread::spawn(move || {
                if let Err(e) = child.wait() {
                    warn!("Ошибка ожидания дочернего процесса: {}", e);
                }
            });
        }
        Err(e) => warn!("Не удалось запустить команду '{}': {}", command, e),
    }
}
