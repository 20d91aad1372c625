//! Diamond listing harvester.
//!
//! The pipeline forces a client-rendered results table to fully materialize
//! (lazy-load convergence), pages through price-filtered windows with a
//! cursor derived from the accumulated records, and normalizes raw table
//! rows into typed, deduplicated records. The browser is consumed behind the
//! [`driver::PageDriver`] capability, so the whole pipeline runs against a
//! scripted fake in tests.

pub mod cli;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod poll;
pub mod sink;
pub mod site;
