use super::timer::manual::ManualTimer;
use super::*;
use crate::actions::{ActionFactory, ActionType, GestureAction};
use crate::config::Config;
use crate::events::gesture::{ATTR_CHILD_WINDOW_ID, ATTR_TOUCHES};
use crate::events::{Attributes, GestureEvent, WindowId};
use crate::gestures::AttributeRecognizer;
use crate::services::window_resolver::WindowResolver;
use crate::services::windowing::{DryRunProtocol, DEMO_CHILD, DEMO_CLIENT};
use figment::providers::{Format, Toml};
use figment::Figment;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Duration;

const COMPOSED_WINDOW: Duration = Duration::from_millis(200);
/// Метка снимка атрибутов, по которой видно, какое событие дошло до действия
const ATTR_SEQ: &str = "seq";

const BINDINGS: &str = r#"
[[bindings]]
gesture = "TAP"
fingers = 1
action = "RUN_COMMAND"
settings = "tap"

[[bindings]]
gesture = "DOUBLE_TAP"
fingers = 1
action = "RUN_COMMAND"
settings = "double"

[[bindings]]
gesture = "TAP_AND_HOLD"
fingers = 1
action = "RUN_COMMAND"
settings = "hold"

[[bindings]]
gesture = "TAP"
fingers = 2
action = "MOUSE_CLICK"
settings = "click"

[[bindings]]
gesture = "DOUBLE_TAP"
fingers = 2
action = "RUN_COMMAND"
settings = "double2"

[[bindings]]
gesture = "TAP_AND_HOLD"
fingers = 2
action = "RUN_COMMAND"
settings = "hold2"

[[bindings]]
gesture = "DRAG"
fingers = 3
action = "RUN_COMMAND"
settings = "drag"

[[bindings]]
gesture = "PINCH"
fingers = 2
action = "RUN_COMMAND"
settings = "pinch"

[[bindings]]
gesture = "TAP"
fingers = 3
action = "RUN_COMMAND"
settings = "tap3"

[[bindings]]
application = "DryRun"
gesture = "TAP"
fingers = 3
action = "MAXIMIZE_RESTORE_WINDOW"
settings = "app-tap3"
"#;

/// Один вызов жизненного цикла: (настройки, фаза, касания, метка, окно)
#[derive(Debug, Clone, PartialEq)]
struct Call {
    settings: String,
    phase: &'static str,
    touches: Option<u32>,
    seq: Option<i64>,
    window: Option<WindowId>,
}

type CallLog = Arc<Mutex<Vec<Call>>>;

struct RecordingAction {
    action_type: ActionType,
    settings: String,
    window: Option<WindowId>,
    log: CallLog,
}

impl RecordingAction {
    fn record(&self, phase: &'static str, attrs: &Attributes) {
        self.log.lock().push(Call {
            settings: self.settings.clone(),
            phase,
            touches: attrs.touches(),
            seq: attrs.get_i64(ATTR_SEQ),
            window: self.window,
        });
    }
}

impl GestureAction for RecordingAction {
    fn action_type(&self) -> ActionType {
        self.action_type
    }

    fn execute_start(&mut self, attrs: &Attributes) {
        self.record("start", attrs);
    }

    fn execute_update(&mut self, attrs: &Attributes) {
        self.record("update", attrs);
    }

    fn execute_finish(&mut self, attrs: &Attributes) {
        self.record("finish", attrs);
    }
}

struct RecordingFactory {
    log: CallLog,
}

impl ActionFactory for RecordingFactory {
    fn create_action(
        &self,
        action_type: ActionType,
        settings: &str,
        window: Option<WindowId>,
    ) -> Box<dyn GestureAction> {
        Box::new(RecordingAction {
            action_type,
            settings: settings.to_string(),
            window,
            log: self.log.clone(),
        })
    }
}

struct Harness {
    dispatcher: GestureDispatcher,
    timer: Arc<ManualTimer>,
    log: CallLog,
}

impl Harness {
    fn new() -> Self {
        let config = Config::from_figment(Figment::new().merge(Toml::string(BINDINGS))).unwrap();
        let timer = Arc::new(ManualTimer::new());
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));

        let dispatcher = GestureDispatcher::new(
            Arc::new(AttributeRecognizer::new()),
            Arc::new(RecordingFactory { log: log.clone() }),
            Arc::new(config),
            WindowResolver::new(Arc::new(DryRunProtocol::demo())),
            timer.clone(),
            COMPOSED_WINDOW,
        );

        Self { dispatcher, timer, log }
    }

    /// Вызовы в виде `настройки:фаза`
    fn calls(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .map(|c| format!("{}:{}", c.settings, c.phase))
            .collect()
    }
}

fn touches(n: i64) -> Attributes {
    Attributes::new().with(ATTR_TOUCHES, n)
}

fn triple(label: &str) -> Vec<String> {
    ["start", "update", "finish"]
        .iter()
        .map(|phase| format!("{}:{}", label, phase))
        .collect()
}

#[test]
fn test_lone_tap_dispatches_once_after_timeout() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_update("Tap", 1, touches(1));

    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    assert!(h.calls().is_empty());
    assert_eq!(h.timer.delays(), vec![COMPOSED_WINDOW]);

    h.timer.fire_due();
    assert_eq!(h.calls(), triple("tap"));
    assert!(h.log.lock().iter().all(|c| c.touches == Some(1)));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);

    h.timer.fire_all_ignoring_cancel();
    assert_eq!(h.calls().len(), 3);
}

#[test]
fn test_double_tap_event_collapses_pending_tap() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_update("Tap", 1, touches(1));
    h.dispatcher.on_update("DoubleTap", 1, touches(1));

    assert_eq!(h.calls(), triple("double"));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
    assert_eq!(h.timer.pending(), 0);

    // Даже опоздавшая отмена не приводит к отправке одиночного tap
    h.timer.fire_all_ignoring_cancel();
    assert_eq!(h.calls(), triple("double"));
}

#[test]
fn test_second_tap_with_new_id_upgrades_to_double_tap() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_update("Tap", 1, touches(1));
    h.dispatcher.on_start("Tap", 2, touches(1));

    assert_eq!(h.calls(), triple("double"));
    h.timer.fire_due();
    assert_eq!(h.calls(), triple("double"));
}

#[test]
fn test_finger_count_mismatch_does_not_upgrade() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_update("DoubleTap", 1, touches(2));

    assert!(h.calls().is_empty());
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);

    h.timer.fire_due();
    assert_eq!(h.calls(), triple("tap"));
}

#[test]
fn test_unrecognized_composed_event_leaves_tap_pending() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_update("Pinch", 9, touches(1));

    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    h.timer.fire_due();
    assert_eq!(h.calls(), triple("tap"));
}

#[test]
fn test_tap_and_hold_continues_until_finish() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_update("Drag", 2, touches(1));

    assert_eq!(h.calls(), vec!["hold:start", "hold:update"]);
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Active);

    h.dispatcher.on_update("Drag", 2, touches(1));
    h.dispatcher.on_finish("Drag", 2, touches(1));
    assert_eq!(
        h.calls(),
        vec!["hold:start", "hold:update", "hold:update", "hold:finish"]
    );
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);

    h.timer.fire_all_ignoring_cancel();
    assert_eq!(h.calls().len(), 4);
}

#[test]
fn test_drag_lifecycle() {
    let h = Harness::new();
    h.dispatcher.on_start("Drag", 5, touches(3));
    assert_eq!(h.calls(), vec!["drag:start", "drag:update"]);

    h.dispatcher.on_update("Drag", 5, touches(3));
    h.dispatcher.on_update("Drag", 5, touches(3));
    h.dispatcher.on_finish("Drag", 5, touches(3));

    assert_eq!(
        h.calls(),
        vec!["drag:start", "drag:update", "drag:update", "drag:update", "drag:finish"]
    );
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
    assert_eq!(h.timer.pending(), 0);
}

#[test]
fn test_other_gestures_start_lazily() {
    let h = Harness::new();
    h.dispatcher.on_start("Pinch", 3, touches(2));
    assert!(h.calls().is_empty());
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Active);

    h.dispatcher.on_update("Pinch", 3, touches(2));
    h.dispatcher.on_finish("Pinch", 3, touches(2));
    assert_eq!(h.calls(), triple("pinch"));
}

#[test]
fn test_start_then_finish_still_gets_full_lifecycle() {
    let h = Harness::new();
    h.dispatcher.on_start("Pinch", 3, touches(2));
    h.dispatcher.on_finish("Pinch", 3, touches(2));
    assert_eq!(h.calls(), triple("pinch"));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
}

#[test]
fn test_mismatched_ids_are_ignored() {
    let h = Harness::new();
    h.dispatcher.on_start("Drag", 5, touches(3));
    h.dispatcher.on_update("Drag", 6, touches(3));
    h.dispatcher.on_finish("Drag", 6, touches(3));

    assert_eq!(h.calls(), vec!["drag:start", "drag:update"]);
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Active);
}

#[test]
fn test_finish_while_idle_or_pending_is_noop() {
    let h = Harness::new();
    h.dispatcher.on_finish("Tap", 1, touches(1));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);

    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_finish("Tap", 1, touches(1));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    assert!(h.calls().is_empty());
}

#[test]
fn test_unknown_gesture_type_is_ignored() {
    let h = Harness::new();
    h.dispatcher.on_start("Swirl", 1, touches(1));
    h.dispatcher.on_update("Tap", 2, Attributes::new());

    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
    assert_eq!(h.timer.pending(), 0);
    assert!(h.calls().is_empty());
}

#[test]
fn test_click_tap_consumes_next_tap_notification() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 7, touches(2));
    // Без поглощения этот tap превратил бы ожидающий в double tap
    h.dispatcher.on_start("Tap", 8, touches(2));

    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    h.timer.fire_due();
    assert_eq!(h.calls(), triple("click"));
}

#[test]
fn test_consume_flag_is_one_shot() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 7, touches(2));
    h.dispatcher.on_update("Drag", 8, touches(2));

    // Drag сбросил флаг и превратил tap в tap & hold
    assert_eq!(h.calls(), vec!["hold2:start", "hold2:update"]);
    h.dispatcher.on_finish("Drag", 8, touches(2));

    h.dispatcher.on_start("Tap", 9, touches(1));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    h.timer.fire_due();
    assert_eq!(h.calls().last().map(String::as_str), Some("tap:finish"));
}

#[test]
fn test_click_taps_separated_by_timeout_both_dispatch() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 7, touches(2));
    h.dispatcher.on_finish("Tap", 7, touches(2));
    h.timer.fire_due();
    assert_eq!(h.calls(), triple("click"));

    h.dispatcher.on_start("Tap", 8, touches(2));
    h.dispatcher.on_finish("Tap", 8, touches(2));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    h.timer.fire_due();

    let mut expected = triple("click");
    expected.extend(triple("click"));
    assert_eq!(h.calls(), expected);
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
}

#[test]
fn test_click_tap_own_finish_keeps_suppression() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 7, touches(2));
    h.dispatcher.on_finish("Tap", 7, touches(2));
    h.dispatcher.on_start("Tap", 8, touches(2));
    h.dispatcher.on_finish("Tap", 8, touches(2));

    assert!(h.calls().is_empty());
    h.timer.fire_due();
    assert_eq!(h.calls(), triple("click"));
}

#[test]
fn test_click_tap_continuation_refreshes_and_next_tap_is_swallowed() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 7, touches(2).with(ATTR_SEQ, 1));
    h.dispatcher.on_update("Tap", 7, touches(2).with(ATTR_SEQ, 2));
    // Tap 8 поглощается целиком: ни start, ни update не превращают клик в double tap
    h.dispatcher.on_start("Tap", 8, touches(2).with(ATTR_SEQ, 3));
    h.dispatcher.on_update("Tap", 8, touches(2).with(ATTR_SEQ, 4));

    assert_eq!(h.dispatcher.phase(), DispatcherPhase::PendingTap);
    assert!(h.calls().is_empty());

    h.timer.fire_due();
    assert_eq!(h.calls(), triple("click"));
    assert!(h.log.lock().iter().all(|c| c.seq == Some(2)));
}

#[test]
fn test_unrelated_finish_clears_click_flag() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 7, touches(2));
    h.dispatcher.on_finish("Drag", 99, touches(3));
    h.dispatcher.on_start("Tap", 8, touches(2));

    assert_eq!(h.calls(), triple("double2"));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
}

#[test]
fn test_stale_timer_does_not_dispatch_newer_tap_twice() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));
    h.dispatcher.on_start("Tap", 2, touches(1));
    h.dispatcher.on_start("Tap", 3, touches(1));

    assert_eq!(h.timer.pending(), 1);
    h.timer.fire_all_ignoring_cancel();

    let mut expected = triple("double");
    expected.extend(triple("tap"));
    assert_eq!(h.calls(), expected);
}

#[test]
fn test_window_resolution_selects_application_binding() {
    let h = Harness::new();
    let attrs = touches(3).with(ATTR_CHILD_WINDOW_ID, DEMO_CHILD.value() as i64);
    h.dispatcher.on_start("Tap", 1, attrs);
    h.timer.fire_due();

    let log = h.log.lock().clone();
    assert_eq!(log.len(), 3);
    assert!(log.iter().all(|c| c.settings == "app-tap3"));
    assert!(log.iter().all(|c| c.window == Some(DEMO_CLIENT)));
}

#[test]
fn test_unresolvable_window_gets_no_target() {
    let h = Harness::new();
    let attrs = touches(3).with(ATTR_CHILD_WINDOW_ID, 0xdead);
    h.dispatcher.on_start("Tap", 1, attrs);
    h.timer.fire_due();

    let log = h.log.lock().clone();
    assert!(log.iter().all(|c| c.settings == "tap3" && c.window.is_none()));
}

#[test]
fn test_shutdown_drops_gesture_without_finish() {
    let h = Harness::new();
    h.dispatcher.on_start("Drag", 5, touches(3));
    h.dispatcher.shutdown();

    assert_eq!(h.calls(), vec!["drag:start", "drag:update"]);
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);

    h.dispatcher.on_start("Tap", 6, touches(1));
    h.dispatcher.shutdown();
    assert_eq!(h.timer.pending(), 0);
    h.timer.fire_all_ignoring_cancel();
    assert_eq!(h.calls(), vec!["drag:start", "drag:update"]);
}

#[test]
fn test_dropped_dispatcher_ignores_late_timer() {
    let h = Harness::new();
    h.dispatcher.on_start("Tap", 1, touches(1));

    let Harness { dispatcher, timer, log } = h;
    drop(dispatcher);
    timer.fire_all_ignoring_cancel();

    assert!(log.lock().is_empty());
}

#[test]
fn test_handle_event_routes_phases() {
    let h = Harness::new();
    h.dispatcher.handle_event(GestureEvent::start("Drag", 4, touches(3)));
    h.dispatcher.handle_event(GestureEvent::update("Drag", 4, touches(3)));
    h.dispatcher.handle_event(GestureEvent::finish("Drag", 4, touches(3)));

    assert_eq!(h.calls().first().map(String::as_str), Some("drag:start"));
    assert_eq!(h.calls().last().map(String::as_str), Some("drag:finish"));
    assert_eq!(h.dispatcher.phase(), DispatcherPhase::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tokio_timer_dispatches_pending_tap() {
    let config = Config::from_figment(Figment::new().merge(Toml::string(BINDINGS))).unwrap();
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = GestureDispatcher::new(
        Arc::new(AttributeRecognizer::new()),
        Arc::new(RecordingFactory { log: log.clone() }),
        Arc::new(config),
        WindowResolver::new(Arc::new(DryRunProtocol::demo())),
        Arc::new(TokioTimer::new(tokio::runtime::Handle::current())),
        Duration::from_millis(20),
    );

    dispatcher.on_start("Tap", 1, touches(1));
    dispatcher.on_update("Tap", 1, touches(1));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(log.lock().len(), 3);
    assert_eq!(dispatcher.phase(), DispatcherPhase::Idle);
}
