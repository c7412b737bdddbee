use crate::error::Result;
use crate::touchd_error;
use std::path::Path;
use tracing::{info, warn};

/// Утилиты, через которые работает X11-бэкенд
const REQUIRED_TOOLS: &[&str] = &["xwininfo", "xprop", "wmctrl", "xdotool"];

/// Проверить, что доступна сессия X11 и установлены нужные утилиты
pub fn check_x11_session() -> Result<()> {
    info!("Проверка сессии X11...");

    check_display()?;

    let missing = missing_tools(REQUIRED_TOOLS);
    if !missing.is_empty() {
        return Err(touchd_error!(
            service_unavailable,
            "Не найдены утилиты: {}. Установите пакеты x11-utils, wmctrl и xdotool",
            missing.join(", ")
        ));
    }

    check_not_wayland();

    info!("Проверка сессии X11 завершена успешно");
    Ok(())
}

fn check_display() -> Result<()> {
    let name = display_name(std::env::var("DISPLAY").ok())?;
    info!("Используется дисплей {}", name);
    Ok(())
}

fn display_name(raw: Option<String>) -> Result<String> {
    match raw {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(touchd_error!(
            service_unavailable,
            "Переменная DISPLAY не задана. Запустите в сессии X11 или используйте --dry-run"
        )),
    }
}

fn check_not_wayland() {
    if let Ok(session) = std::env::var("XDG_SESSION_TYPE") {
        if session == "wayland" {
            warn!("⚠️  Сессия Wayland: окна будут видны только через XWayland");
        }
    }
}

/// Утилиты, которых нет ни в одном каталоге `PATH`
fn missing_tools<'a>(tools: &[&'a str]) -> Vec<&'a str> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    let dirs: Vec<_> = std::env::split_paths(&path).collect();

    tools
        .iter()
        .copied()
        .filter(|tool| !dirs.iter().any(|dir| is_executable(&dir.join(tool))))
        .collect()
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Some(":0".to_string())).unwrap(), ":0");
        assert!(display_name(Some("  ".to_string())).is_err());
        assert!(display_name(None).is_err());
    }

    #[test]
    fn test_missing_tools() {
        let missing = missing_tools(&["sh", "touchd-no-such-tool"]);
        assert_eq!(missing, vec!["touchd-no-such-tool"]);
    }

    #[test]
    fn test_directory_is_not_executable() {
        assert!(!is_executable(Path::new("/")));
    }
}
