pub mod fallback;
pub mod newsapi;
