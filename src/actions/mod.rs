mod action_type;
mod catalogue;
mod maximize_restore;
mod run_command;
mod r#trait;

pub use self::action_type::ActionType;
pub use self::catalogue::CatalogueFactory;
pub use self::r#trait::{ActionFactory, GestureAction};
