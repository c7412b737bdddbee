use crate::actions::{ActionFactory, ActionType};
use crate::config::ActionConfig;
use crate::debug_if_enabled;
use crate::events::{Attributes, EventPhase, GestureEvent};
use crate::gestures::{Gesture, GestureRecognizer, GestureType};
use crate::services::window_resolver::WindowResolver;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::time::Duration;
use tracing::{debug, info};

use super::timer::{TimerHandle, TimerScheduler};

/// Тег события tap у распознавателя
const TAP_TAG: &str = "Tap";

/// Наблюдаемое состояние диспетчера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherPhase {
    Idle,
    Active,
    PendingTap,
}

/// Единственный слот владения жестом. Замена значения слота уничтожает
/// предыдущего владельца вместе с его действием.
#[derive(Default)]
enum Slot {
    #[default]
    Idle,
    Active(Gesture),
    PendingTap {
        tap: Gesture,
        token: u64,
        timer: Option<Box<dyn TimerHandle>>,
    },
}

impl Slot {
    fn phase(&self) -> DispatcherPhase {
        match self {
            Slot::Idle => DispatcherPhase::Idle,
            Slot::Active(_) => DispatcherPhase::Active,
            Slot::PendingTap { .. } => DispatcherPhase::PendingTap,
        }
    }

    /// Выбросить жест без вызова finish
    fn discard(self) {
        match self {
            Slot::Idle => {}
            Slot::Active(gesture) => {
                info!("Жест {} отброшен без завершения", gesture);
            }
            Slot::PendingTap { tap, timer, .. } => {
                if let Some(timer) = timer {
                    timer.cancel();
                }
                info!("Ожидающий {} отброшен без отправки", tap);
            }
        }
    }
}

#[derive(Default)]
struct DispatchState {
    slot: Slot,
    /// Id tap с MOUSE_CLICK: следующий новый `Tap`, пришедший сразу за ним,
    /// поглощается. Любое другое событие или отправка этого tap сбрасывает метку.
    click_tap: Option<i64>,
    /// Id поглощённого tap: его дальнейшие уведомления тоже отбрасываются
    swallowed_tap: Option<i64>,
    next_token: u64,
}

struct DispatcherCore {
    state: Mutex<DispatchState>,
    recognizer: Arc<dyn GestureRecognizer>,
    actions: Arc<dyn ActionFactory>,
    config: Arc<dyn ActionConfig>,
    resolver: WindowResolver,
    timer: Arc<dyn TimerScheduler>,
    composed_window: Duration,
}

/// GestureDispatcher turns start/update/finish notifications into exactly one
/// action lifecycle per logical gesture.
///
/// All transitions, window resolution and action calls run under one lock,
/// so actions never interleave. The debounce timer is the only other source
/// of transitions; its callback carries the token of the tap it was armed
/// for and does nothing if that tap is no longer pending.
#[derive(Clone)]
pub struct GestureDispatcher {
    core: Arc<DispatcherCore>,
}

impl GestureDispatcher {
    pub fn new(
        recognizer: Arc<dyn GestureRecognizer>,
        actions: Arc<dyn ActionFactory>,
        config: Arc<dyn ActionConfig>,
        resolver: WindowResolver,
        timer: Arc<dyn TimerScheduler>,
        composed_window: Duration,
    ) -> Self {
        info!(
            "Инициализация GestureDispatcher (окно составных жестов: {}мс)",
            composed_window.as_millis()
        );

        Self {
            core: Arc::new(DispatcherCore {
                state: Mutex::new(DispatchState::default()),
                recognizer,
                actions,
                config,
                resolver,
                timer,
                composed_window,
            }),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> DispatcherPhase {
        self.core.state.lock().slot.phase()
    }

    pub fn handle_event(&self, event: GestureEvent) {
        debug_if_enabled!("Событие жеста: {}", event);
        match event.phase {
            EventPhase::Start => self.on_start(&event.gesture_type, event.id, event.attributes),
            EventPhase::Update => self.on_update(&event.gesture_type, event.id, event.attributes),
            EventPhase::Finish => self.on_finish(&event.gesture_type, event.id, event.attributes),
        }
    }

    pub fn on_start(&self, gesture_type: &str, id: i64, attrs: Attributes) {
        self.notify(gesture_type, id, attrs);
    }

    pub fn on_update(&self, gesture_type: &str, id: i64, attrs: Attributes) {
        self.notify(gesture_type, id, attrs);
    }

    fn notify(&self, gesture_type: &str, id: i64, attrs: Attributes) {
        let armed = {
            let mut state = self.core.state.lock();
            self.core.on_notification(&mut state, gesture_type, id, attrs)
        };
        if let Some(token) = armed {
            self.arm_timer(token);
        }
    }

    pub fn on_finish(&self, gesture_type: &str, id: i64, attrs: Attributes) {
        let mut state = self.core.state.lock();
        if state.click_tap.is_some_and(|click_id| click_id != id) {
            state.click_tap = None;
        }
        match std::mem::take(&mut state.slot) {
            Slot::Active(mut gesture) if gesture.id() == id => {
                debug!("Завершение жеста {}", gesture);
                gesture.set_attrs(attrs);
                gesture.finish();
                info!("Жест {} выполнен ({})", gesture, gesture.action_type());
            }
            other => {
                debug_if_enabled!("Finish {}#{} проигнорирован", gesture_type, id);
                state.slot = other;
            }
        }
    }

    /// Отбросить текущий жест без вызова finish и отменить таймер
    pub fn shutdown(&self) {
        let mut state = self.core.state.lock();
        state.click_tap = None;
        state.swallowed_tap = None;
        let slot = std::mem::take(&mut state.slot);
        let phase = slot.phase();
        slot.discard();
        info!("GestureDispatcher остановлен (состояние: {:?})", phase);
    }

    /// Таймер взводится вне блокировки; ручка прикрепляется, только если
    /// тот же tap всё ещё ожидает
    fn arm_timer(&self, token: u64) {
        let weak: Weak<DispatcherCore> = Arc::downgrade(&self.core);
        let handle = self.core.timer.schedule_once(
            self.core.composed_window,
            Box::new(move || {
                if let Some(core) = weak.upgrade() {
                    core.fire_tap(token);
                }
            }),
        );

        let mut state = self.core.state.lock();
        match &mut state.slot {
            Slot::PendingTap {
                token: current,
                timer,
                ..
            } if *current == token => *timer = Some(handle),
            _ => handle.cancel(),
        }
    }
}

impl DispatcherCore {
    /// Start и update обрабатываются одинаково; возвращает токен, если нужно
    /// взвести таймер для нового tap
    fn on_notification(
        &self,
        state: &mut DispatchState,
        gesture_type: &str,
        id: i64,
        attrs: Attributes,
    ) -> Option<u64> {
        match state.swallowed_tap {
            Some(swallowed) if swallowed == id && gesture_type == TAP_TAG => {
                debug_if_enabled!("Продолжение поглощённого tap #{} отброшено", id);
                return None;
            }
            Some(swallowed) if swallowed != id => state.swallowed_tap = None,
            _ => {}
        }

        if let Some(click_id) = state.click_tap.take() {
            if gesture_type == TAP_TAG {
                if id == click_id {
                    // Продолжение самого click tap
                    state.click_tap = Some(click_id);
                } else {
                    debug!("Tap #{} поглощён после клика #{}", id, click_id);
                    state.swallowed_tap = Some(id);
                    return None;
                }
            }
        }

        match std::mem::take(&mut state.slot) {
            Slot::Idle => self.begin(state, gesture_type, id, attrs),
            Slot::Active(mut gesture) => {
                if gesture.id() == id {
                    debug_if_enabled!("Обновление жеста {}", gesture);
                    gesture.set_attrs(attrs);
                    gesture.update();
                } else {
                    debug_if_enabled!("Устаревшее событие {}#{} проигнорировано", gesture_type, id);
                }
                state.slot = Slot::Active(gesture);
                None
            }
            Slot::PendingTap {
                mut tap,
                token,
                timer,
            } => {
                if self.is_tap_continuation(&tap, gesture_type, id, &attrs) {
                    tap.set_attrs(attrs);
                    state.slot = Slot::PendingTap { tap, token, timer };
                    return None;
                }

                match self.upgrade(&tap, gesture_type, id, &attrs) {
                    Some(compound) => {
                        if let Some(timer) = timer {
                            timer.cancel();
                        }
                        drop(tap);
                        self.run_compound(state, compound);
                    }
                    None => state.slot = Slot::PendingTap { tap, token, timer },
                }
                None
            }
        }
    }

    fn begin(
        &self,
        state: &mut DispatchState,
        gesture_type: &str,
        id: i64,
        attrs: Attributes,
    ) -> Option<u64> {
        let Some(mut gesture) = self.recognize(gesture_type, id, &attrs, false) else {
            debug_if_enabled!("Нераспознанный жест {}#{}", gesture_type, id);
            return None;
        };
        self.bind_action(&mut gesture);

        match gesture.gesture_type() {
            GestureType::Tap => {
                if gesture.action_type() == ActionType::MouseClick {
                    debug!("Следующий Tap будет поглощён");
                    state.click_tap = Some(gesture.id());
                }
                let token = state.next_token;
                state.next_token = state.next_token.wrapping_add(1);
                state.slot = Slot::PendingTap {
                    tap: gesture,
                    token,
                    timer: None,
                };
                Some(token)
            }
            GestureType::Drag => {
                debug!("Начало drag {}", gesture);
                gesture.start();
                gesture.update();
                state.slot = Slot::Active(gesture);
                None
            }
            _ => {
                state.slot = Slot::Active(gesture);
                None
            }
        }
    }

    /// То же касание, продолжающее ожидающий tap
    fn is_tap_continuation(&self, tap: &Gesture, gesture_type: &str, id: i64, attrs: &Attributes) -> bool {
        tap.id() == id
            && self
                .recognizer
                .recognize_simple(gesture_type, id, attrs)
                .is_some_and(|g| g.gesture_type() == GestureType::Tap)
    }

    /// Попытка превратить ожидающий tap в double tap или tap & hold
    fn upgrade(&self, tap: &Gesture, gesture_type: &str, id: i64, attrs: &Attributes) -> Option<Gesture> {
        let Some(mut compound) = self.recognize(gesture_type, id, attrs, true) else {
            debug!("Нераспознанный составной жест {}#{}, tap не обновлён", gesture_type, id);
            return None;
        };

        if compound.num_fingers() != tap.num_fingers() {
            debug!(
                "Количество пальцев изменилось ({} → {}), tap не обновлён",
                tap.num_fingers(),
                compound.num_fingers()
            );
            return None;
        }

        self.bind_action(&mut compound);
        Some(compound)
    }

    fn run_compound(&self, state: &mut DispatchState, mut compound: Gesture) {
        debug!("Запуск составного жеста {}", compound);
        compound.start();
        compound.update();

        if compound.gesture_type() == GestureType::DoubleTap {
            compound.finish();
            info!("Жест {} выполнен ({})", compound, compound.action_type());
            state.slot = Slot::Idle;
        } else {
            state.slot = Slot::Active(compound);
        }
    }

    fn fire_tap(&self, token: u64) {
        let mut state = self.state.lock();
        match std::mem::take(&mut state.slot) {
            Slot::PendingTap {
                mut tap,
                token: current,
                ..
            } if current == token => {
                if state.click_tap == Some(tap.id()) {
                    state.click_tap = None;
                }
                debug!("Отправка tap {}", tap);
                tap.start();
                tap.update();
                tap.finish();
                info!("Жест {} выполнен ({})", tap, tap.action_type());
            }
            other => {
                debug!("Таймер tap устарел: tap уже преобразован или заменён");
                state.slot = other;
            }
        }
    }

    fn recognize(&self, gesture_type: &str, id: i64, attrs: &Attributes, composed: bool) -> Option<Gesture> {
        if composed {
            self.recognizer.recognize_composed(gesture_type, id, attrs)
        } else {
            self.recognizer.recognize_simple(gesture_type, id, attrs)
        }
    }

    /// Разрешить окно и привязать действие из конфигурации
    fn bind_action(&self, gesture: &mut Gesture) {
        let target = self.resolver.resolve(gesture.attrs().child_window());
        let (kind, fingers, direction) = (gesture.gesture_type(), gesture.num_fingers(), gesture.direction());

        let action_type = self.config.action_type_for(&target.app_class, kind, fingers, direction);
        let settings = self.config.action_settings_for(&target.app_class, kind, fingers, direction);

        gesture.set_action(self.actions.create_action(action_type, &settings, target.window));

        info!(
            "[+] Новый жест {} → {} ('{}') для {}",
            gesture, action_type, settings, target
        );
    }
}

impl Drop for DispatcherCore {
    fn drop(&mut self) {
        std::mem::take(&mut self.state.get_mut().slot).discard();
        info!("GestureDispatcher завершает работу");
    }
}
