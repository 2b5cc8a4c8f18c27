///! Shared BotMaker template types: the upstream record shape and the
///! normalized row every other component works on.

pub mod types;

pub use types::{Field, RawTemplate, TemplateRow, normalize, normalize_all};
