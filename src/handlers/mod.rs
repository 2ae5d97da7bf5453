// src/handlers/mod.rs
pub mod catalog;
pub mod dashboard;
pub mod error;
