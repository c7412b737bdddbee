use crate::error::Result;
use crate::events::GestureEvent;
use crate::services::dispatcher::GestureDispatcher;
use crate::trace_if_enabled;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::r#trait::EventSourceTrait;

/// Путь, означающий стандартный ввод
const STDIN_PATH: &str = "-";

/// Читает события жестов построчно в формате JSON:
/// `{"phase":"start","type":"Tap","id":1,"attributes":{"touches":1}}`
pub struct JsonLinesSource {
    path: String,
    dispatcher: GestureDispatcher,
}

impl JsonLinesSource {
    pub fn new(path: String, dispatcher: GestureDispatcher) -> Self {
        info!("Инициализация JsonLinesSource ({})", path);
        Self { path, dispatcher }
    }

    async fn run_impl(self) -> Result<()> {
        if self.path == STDIN_PATH {
            info!("Чтение событий жестов из stdin");
            self.pump(BufReader::new(tokio::io::stdin())).await
        } else {
            info!("Чтение событий жестов из файла {}", self.path);
            let file = tokio::fs::File::open(&self.path).await?;
            self.pump(BufReader::new(file)).await
        }
    }

    async fn pump<R: AsyncBufRead + Unpin>(&self, reader: R) -> Result<()> {
        let mut lines = reader.lines();
        let mut line_no = 0usize;
        let mut dispatched = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            match parse_line(&line) {
                Ok(Some(event)) => {
                    trace_if_enabled!("Строка {}: {}", line_no, event);
                    let dispatcher = self.dispatcher.clone();
                    // Диспетчер выполняет действия синхронно под своей блокировкой
                    tokio::task::block_in_place(move || dispatcher.handle_event(event));
                    dispatched += 1;
                }
                Ok(None) => {}
                Err(e) => warn!("Строка {} пропущена: {}", line_no, e),
            }
        }

        info!("Конец ввода: обработано {} событий из {} строк", dispatched, line_no);
        Ok(())
    }
}

/// Пустые строки и комментарии `#` пропускаются
fn parse_line(line: &str) -> Result<Option<GestureEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

#[async_trait::async_trait]
impl EventSourceTrait for JsonLinesSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
