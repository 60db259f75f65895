/// Markdown escaping helpers
pub mod markdown;
