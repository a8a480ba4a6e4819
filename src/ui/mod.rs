// src/ui/mod.rs
pub mod actions;
pub mod canvas_view;
pub mod dialog;
pub mod event;
pub mod layout;
pub mod menu;
pub mod shell;

pub use shell::Shell;
