pub mod config;
pub mod formatter;
pub mod record;
pub mod template;
pub mod thread_name;
