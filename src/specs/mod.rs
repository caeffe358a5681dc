// src/specs/mod.rs
//! # Page specs
//!
//! Where the ground truth lives in each scraped page and how to turn its
//! cells into typed records. Specs are pure: the HTML arrives already split
//! into rows of cell text (`core::html::table_rows`), nothing here touches the
//! network or the store.
//!
//! Rows that do not fit are reported as a typed [`crate::error::RowError`];
//! the caller logs and skips them.
pub mod players;
