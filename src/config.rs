use crate::actions::ActionType;
use crate::gestures::{GestureDirection, GestureType};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Приложение-шаблон, к которому относятся привязки для всех окон
pub const ALL_APPLICATIONS: &str = "All";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub dispatcher: DispatcherConfig,
    pub input: InputConfig,
    pub bindings: Vec<GestureBinding>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Окно ожидания второго события после tap
    pub composed_gestures_time_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// `-` для stdin или путь к файлу с событиями в формате JSON lines
    pub path: String,
}

/// Привязка (приложение, жест, пальцы, направление) → действие
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GestureBinding {
    #[serde(default = "default_application")]
    pub application: String,
    pub gesture: GestureType,
    pub fingers: u32,
    #[serde(default)]
    pub direction: GestureDirection,
    pub action: ActionType,
    #[serde(default)]
    pub settings: String,
}

fn default_application() -> String {
    ALL_APPLICATIONS.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            composed_gestures_time_ms: 200,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "-".to_string(),
        }
    }
}

/// Источник конфигурации действий для диспетчера
pub trait ActionConfig: Send + Sync {
    fn action_type_for(
        &self,
        app_class: &str,
        gesture: GestureType,
        fingers: u32,
        direction: GestureDirection,
    ) -> ActionType;

    fn action_settings_for(
        &self,
        app_class: &str,
        gesture: GestureType,
        fingers: u32,
        direction: GestureDirection,
    ) -> String;
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TOUCHD_").split("__"));

        Self::from_figment(figment)
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        let window = self.dispatcher.composed_gestures_time_ms;
        if window == 0 || window > 5000 {
            anyhow::bail!(
                "composed_gestures_time_ms должно быть в диапазоне 1..=5000, получено {}",
                window
            );
        }

        if self.input.path.trim().is_empty() {
            anyhow::bail!("input.path не может быть пустым");
        }

        // Валидация привязок
        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.application.trim().is_empty() {
                anyhow::bail!("Пустое приложение в привязке #{}", i + 1);
            }
            if binding.fingers == 0 || binding.fingers > 5 {
                anyhow::bail!("Неверное количество пальцев {} в привязке #{}", binding.fingers, i + 1);
            }
        }

        Ok(())
    }

    /// Привязка для жеста: приложение важнее `All`, точное направление важнее `ALL`
    pub fn find_binding(
        &self,
        app_class: &str,
        gesture: GestureType,
        fingers: u32,
        direction: GestureDirection,
    ) -> Option<&GestureBinding> {
        let candidates = |application: &str| {
            let matching: Vec<&GestureBinding> = self
                .bindings
                .iter()
                .filter(|b| b.application == application && b.gesture == gesture && b.fingers == fingers)
                .collect();

            matching
                .iter()
                .find(|b| b.direction == direction)
                .or_else(|| matching.iter().find(|b| b.direction == GestureDirection::All))
                .copied()
        };

        let specific = if app_class.is_empty() || app_class == ALL_APPLICATIONS {
            None
        } else {
            candidates(app_class)
        };
        specific.or_else(|| candidates(ALL_APPLICATIONS))
    }
}

impl ActionConfig for Config {
    fn action_type_for(
        &self,
        app_class: &str,
        gesture: GestureType,
        fingers: u32,
        direction: GestureDirection,
    ) -> ActionType {
        self.find_binding(app_class, gesture, fingers, direction)
            .map(|b| b.action)
            .unwrap_or(ActionType::NoAction)
    }

    fn action_settings_for(
        &self,
        app_class: &str,
        gesture: GestureType,
        fingers: u32,
        direction: GestureDirection,
    ) -> String {
        self.find_binding(app_class, gesture, fingers, direction)
            .map(|b| b.settings.clone())
            .unwrap_or_default()
    }
}
