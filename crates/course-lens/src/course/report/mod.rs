mod document;
mod summary;
pub mod views;

pub use document::render_markdown;
