use crate::debug_if_enabled;
use crate::events::{Attributes, WindowId};
use crate::services::windowing::WindowingProtocol;
use std::sync::Arc;
use tracing::{info, warn};

use super::action_type::ActionType;
use super::maximize_restore::{self, MaximizeMode};
use super::r#trait::{ActionFactory, GestureAction};
use super::run_command;

const DEFAULT_BUTTON: u8 = 1;

/// Поведение действия, выбранное по тегу при создании
#[derive(Debug, Clone, PartialEq, Eq)]
enum Behavior {
    Nothing,
    MouseClick { button: u8 },
    MaximizeRestore(MaximizeMode),
    Minimize,
    Close,
    RunCommand(Option<String>),
}

impl Behavior {
    fn from_settings(action_type: ActionType, settings: &str) -> Self {
        match action_type {
            ActionType::NoAction => Behavior::Nothing,
            ActionType::MouseClick => Behavior::MouseClick {
                button: parse_button(settings),
            },
            ActionType::MaximizeRestoreWindow => {
                Behavior::MaximizeRestore(MaximizeMode::from_settings(settings))
            }
            ActionType::MinimizeWindow => Behavior::Minimize,
            ActionType::CloseWindow => Behavior::Close,
            ActionType::RunCommand => Behavior::RunCommand(run_command::parse_command(settings)),
        }
    }
}

/// `BUTTON=1..3`; всё остальное даёт левую кнопку
fn parse_button(settings: &str) -> u8 {
    let button = settings
        .trim()
        .strip_prefix("BUTTON=")
        .and_then(|b| b.trim().parse::<u8>().ok())
        .filter(|b| (1..=3).contains(b));

    match button {
        Some(button) => button,
        None => {
            warn!(
                "Некорректные настройки MOUSE_CLICK '{}', используется кнопка {}",
                settings, DEFAULT_BUTTON
            );
            DEFAULT_BUTTON
        }
    }
}

/// Действие из каталога: настройки, окно-цель и тег.
/// Все действия каталога срабатывают в фазе finish.
pub struct Action {
    action_type: ActionType,
    settings: String,
    window: Option<WindowId>,
    behavior: Behavior,
    protocol: Arc<dyn WindowingProtocol>,
    dry_run: bool,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        settings: &str,
        window: Option<WindowId>,
        protocol: Arc<dyn WindowingProtocol>,
        dry_run: bool,
    ) -> Self {
        Self {
            action_type,
            settings: settings.to_string(),
            window,
            behavior: Behavior::from_settings(action_type, settings),
            protocol,
            dry_run,
        }
    }

    #[cfg(test)]
    pub fn settings(&self) -> &str {
        &self.settings
    }

    #[cfg(test)]
    pub fn window(&self) -> Option<WindowId> {
        self.window
    }
}

impl GestureAction for Action {
    fn action_type(&self) -> ActionType {
        self.action_type
    }

    fn execute_start(&mut self, _attrs: &Attributes) {}

    fn execute_update(&mut self, _attrs: &Attributes) {}

    fn execute_finish(&mut self, attrs: &Attributes) {
        debug_if_enabled!(
            "Выполнение {} ('{}') с атрибутами {}",
            self.action_type,
            self.settings,
            attrs
        );

        if self.action_type.targets_window() && self.window.is_none() {
            debug_if_enabled!("{}: нет окна-цели, действие пропущено", self.action_type);
            return;
        }

        match &self.behavior {
            Behavior::Nothing => {}
            Behavior::MouseClick { button } => {
                if let Err(e) = self.protocol.click(*button) {
                    warn!("Не удалось выполнить клик кнопкой {}: {}", button, e);
                }
            }
            Behavior::MaximizeRestore(mode) => {
                if let Some(window) = self.window {
                    maximize_restore::execute(self.protocol.as_ref(), window, *mode);
                }
            }
            Behavior::Minimize => {
                if let Some(window) = self.window {
                    if let Err(e) = self.protocol.minimize(window) {
                        warn!("Не удалось свернуть окно {}: {}", window, e);
                    }
                }
            }
            Behavior::Close => {
                if let Some(window) = self.window {
                    info!("Закрытие окна {}", window);
                    if let Err(e) = self.protocol.close(window) {
                        warn!("Не удалось закрыть окно {}: {}", window, e);
                    }
                }
            }
            Behavior::RunCommand(command) => {
                if let Some(command) = command {
                    run_command::spawn_detached(command, self.dry_run);
                }
            }
        }
    }
}

/// Фабрика действий каталога поверх оконного протокола
pub struct CatalogueFactory {
    protocol: Arc<dyn WindowingProtocol>,
    dry_run: bool,
}

impl CatalogueFactory {
    pub fn new(protocol: Arc<dyn WindowingProtocol>, dry_run: bool) -> Self {
        Self { protocol, dry_run }
    }
}

impl ActionFactory for CatalogueFactory {
    fn create_action(
        &self,
        action_type: ActionType,
        settings: &str,
        window: Option<WindowId>,
    ) -> Box<dyn GestureAction> {
        Box::new(Action::new(
            action_type,
            settings,
            window,
            Arc::clone(&self.protocol),
            self.dry_run,
        ))
    }
}
