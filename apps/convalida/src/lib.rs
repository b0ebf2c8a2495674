//! # convalida
//!
//! Host application for `convalida-core`: a CLI over a working snapshot file
//! and an HTTP JSON API for a web front-end. Exposed as a library so the
//! router and configuration can be exercised by integration tests.

pub mod api;
pub mod cli;
pub mod config;
