//! flvmeta - FLV metadata injector
//!
//! This library crate exposes the command-line configuration and exit code
//! handling for integration testing. The FLV work itself lives in the
//! `flvmeta-media` crate.

pub mod config;
pub mod exit;
