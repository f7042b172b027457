pub mod time_format;

pub use time_format::{format_duration, format_time};
