use crate::error::Result;
use crate::events::gesture::{ATTR_CHILD_WINDOW_ID, ATTR_DELTA_X, ATTR_DELTA_Y, ATTR_TOUCHES};
use crate::events::{Attributes, GestureEvent};
use crate::services::dispatcher::GestureDispatcher;
use crate::services::windowing::DEMO_CHILD;
use tokio::time::{interval, sleep, Duration};
use tracing::info;

use super::r#trait::EventSourceTrait;

/// Пауза между нажатиями двойного tap, заметно меньше окна составных жестов
const DOUBLE_TAP_GAP: Duration = Duration::from_millis(50);

/// Эмулирует жесты над демонстрационным окном dry-run бэкенда
pub struct DryRunEventSource {
    dispatcher: GestureDispatcher,
    next_id: i64,
}

impl DryRunEventSource {
    pub fn new(dispatcher: GestureDispatcher) -> Self {
        info!("Инициализация DryRunEventSource");
        Self {
            dispatcher,
            next_id: 1,
        }
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("Dry-run режим - EventSource работает в режиме эмуляции");

        let scenarios = ["tap", "double tap", "drag"];
        let mut scenario_index = 0;
        let mut interval = interval(Duration::from_secs(5));

        loop {
            interval.tick().await;
            info!("Dry-run: эмулируем жест: {}", scenarios[scenario_index]);

            match scenario_index {
                0 => self.tap(1),
                1 => {
                    self.tap(1);
                    sleep(DOUBLE_TAP_GAP).await;
                    self.tap(1);
                }
                _ => self.drag(3),
            }

            scenario_index = (scenario_index + 1) % scenarios.len();
        }
    }

    fn attrs(fingers: i64) -> Attributes {
        Attributes::new()
            .with(ATTR_TOUCHES, fingers)
            .with(ATTR_CHILD_WINDOW_ID, DEMO_CHILD.value() as i64)
    }

    fn tap(&mut self, fingers: i64) {
        let id = self.take_id();
        self.send(GestureEvent::start("Tap", id, Self::attrs(fingers)));
        self.send(GestureEvent::finish("Tap", id, Self::attrs(fingers)));
    }

    fn drag(&mut self, fingers: i64) {
        let id = self.take_id();
        let step = || Self::attrs(fingers).with(ATTR_DELTA_X, 0.0).with(ATTR_DELTA_Y, -4.0);
        self.send(GestureEvent::start("Drag", id, step()));
        for _ in 0..3 {
            self.send(GestureEvent::update("Drag", id, step()));
        }
        self.send(GestureEvent::finish("Drag", id, step()));
    }

    fn take_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn send(&self, event: GestureEvent) {
        let dispatcher = self.dispatcher.clone();
        tokio::task::block_in_place(move || dispatcher.handle_event(event));
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for DryRunEventSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
