// src/core/mod.rs
pub mod canvas;
pub mod renderer;
