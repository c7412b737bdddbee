use crate::config::Config;
use crate::error::Result;
use crate::services::dispatcher::GestureDispatcher;
use std::sync::Arc;

/// Источник событий жестов, передающий их в диспетчер
#[async_trait::async_trait]
pub trait EventSourceTrait {
    /// Читать события до конца ввода
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create an appropriate event source based on the dry_run flag
pub fn create_event_source(
    config: Arc<Config>,
    dispatcher: GestureDispatcher,
    dry_run: bool,
) -> Result<Box<dyn EventSourceTrait + Send>> {
    if dry_run {
        Ok(Box::new(super::dry_run::DryRunEventSource::new(dispatcher)))
    } else {
        Ok(Box::new(super::json_lines::JsonLinesSource::new(
            config.input.path.clone(),
            dispatcher,
        )))
    }
}
