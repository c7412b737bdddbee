use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::warn;

pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Отменяемый отложенный вызов
pub trait TimerHandle: Send {
    fn cancel(&self);
}

/// Планировщик одноразовых таймеров.
///
/// Колбэк выполняется на произвольном потоке и никогда не вызывается
/// синхронно изнутри `schedule_once`: вызывающий может держать свои блокировки.
pub trait TimerScheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> Box<dyn TimerHandle>;
}

/// Таймеры на tokio: ожидание в задаче, колбэк в blocking-пуле
pub struct TokioTimer {
    runtime: Handle,
}

impl TokioTimer {
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }
}

struct TokioTimerHandle(JoinHandle<()>);

impl TimerHandle for TokioTimerHandle {
    fn cancel(&self) {
        self.0.abort();
    }
}

impl TimerScheduler for TokioTimer {
    fn schedule_once(&self, delay: Duration, callback: TimerCallback) -> Box<dyn TimerHandle> {
        let task = self.runtime.spawn(async move {
            sleep(delay).await;
            // Колбэк берёт блокировку диспетчера и может выполнять блокирующий I/O
            if let Err(e) = tokio::task::spawn_blocking(callback).await {
                warn!("Колбэк таймера завершился с ошибкой: {}", e);
            }
        });
        Box::new(TokioTimerHandle(task))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tokio_timer_fires_once() {
        let timer = TokioTimer::new(Handle::current());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let _handle = timer.schedule_once(
            Duration::from_millis(10),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_tokio_timer_cancel() {
        let timer = TokioTimer::new(Handle::current());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();

        let handle = timer.schedule_once(
            Duration::from_millis(50),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        handle.cancel();

        sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
