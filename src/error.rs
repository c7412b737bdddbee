use thiserror::Error;

#[derive(Error, Debug)]
pub enum TouchdError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Некорректное событие жеста: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ошибка оконного протокола: {0}")]
    Protocol(String),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TouchdError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! touchd_error {
    (protocol, $($arg:tt)*) => {
        $crate::error::TouchdError::Protocol(format!($($arg)*))
    };
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::TouchdError::ServiceUnavailable(format!($($arg)*))
    };
}
