//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus
//! - **[`panes`]**: stateless render functions for each visible pane (steps,
//!   grammar, structures, status bar)
//! - **[`theme`]**: centralized color palette used by all panes, including the
//!   colour of each decay tag
//!
//! The entry point for consumers is [`App`]: construct it with a finished
//! [`Controller`] and call [`App::run`] to start the event loop.
//!
//! [`Controller`]: crate::controller::Controller
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
