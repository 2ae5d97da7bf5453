// src/services/mod.rs
pub mod cache;
pub mod catalog;
pub mod dashboard;
pub mod fetcher;
pub mod normalize;
pub mod panel;
pub mod provider;
pub mod tidy;
pub mod yahoo;
