//! Atelier: a browsable interior-design photo gallery.
//!
//! The crate is a thin query and presentation layer over a relational store:
//!
//! - [`db`] composes the gallery, tag and profile queries for SQLite (and
//!   PostgreSQL with the `postgres` feature) and normalizes embedded tag lists.
//! - [`server`] exposes the read-only JSON API and the HTML pages.
//! - [`filter`] is the persisted tag-selection state used by clients.
//! - [`client`] fetches listings from a running server on behalf of that state.

pub mod client;
pub mod config;
pub mod db;
pub mod filter;
pub mod logging;
pub mod server;
