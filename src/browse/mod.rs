//! Terminal browsing screens composed from the catalog hooks.

pub mod browser;
pub mod command;
pub mod pager;
pub mod render;
pub mod views;

pub use browser::{Browser, Flow, Screen};
pub use command::Command;
pub use pager::{PaginationView, Pager};
pub use views::View;
