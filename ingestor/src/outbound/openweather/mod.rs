//! Upstream weather API adapter (current-weather endpoint over HTTP).

mod dto;
mod http_source;

pub use http_source::OpenWeatherHttpSource;
