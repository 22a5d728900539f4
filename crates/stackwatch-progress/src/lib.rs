//! # stackwatch-progress
//!
//! A small component model for rendering live deployment progress in a
//! terminal. Listening components consume event channels on background
//! threads and keep their state behind a mutex; the render driver
//! periodically erases the previous frame and asks the component tree to
//! write a fresh one.

pub mod columns;
pub mod cursor;
pub mod driver;
pub mod env_controller;
pub mod multi;
pub mod renderer;
pub mod resource;
pub mod rolling_update;
pub mod stack;
pub mod stack_set;
pub mod style;
pub mod summary_bar;
pub mod table;
pub mod text;
pub mod tree;

pub use cursor::TerminalSink;
pub use driver::{erase_and_render, render, RenderInterval};
pub use env_controller::EnvControllerComponent;
pub use multi::MultiRenderer;
pub use renderer::{DynamicRenderer, RenderOptions, Renderer};
pub use resource::ResourceComponent;
pub use rolling_update::{RollingUpdateComponent, RollingUpdateOptions};
pub use stack::StackComponent;
pub use stack_set::StackSetComponent;
pub use summary_bar::SummaryBar;
pub use table::Table;
pub use text::SingleLine;
pub use tree::{Child, DynamicTreeComponent, TreeComponent};
