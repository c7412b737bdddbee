mod dry_run;
mod json_lines;
mod r#trait;

pub use self::r#trait::create_event_source;
