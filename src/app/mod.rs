//! Application state: the command reducer over [`AppState`], the theme
//! registry, and the CLI dispatch layer.

pub mod dispatch;
mod state;
mod themes;

pub use state::{AppState, Command, Phase, ReducerContext, SelectionMode};
pub use themes::Theme;
