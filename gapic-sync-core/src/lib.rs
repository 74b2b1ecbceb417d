#![doc = "gapic-sync-core: core logic library for gapic-sync."]

//! This crate contains the artifact locator, the retrieval layer over the
//! `gsutil` transfer tool, the proto merge step and the provenance collectors.
//! The CLI crate only parses arguments and config and wires these together.
//!
//! # Usage
//! Build a [`gapic::GapicCloudBuild`] from [`config::SyncSettings`], a
//! [`transfer::TransferTool`] and the two collectors in [`contract`], then call
//! [`gapic::GapicCloudBuild::fetch`] per library.

pub mod cache;
pub mod config;
pub mod contract;
pub mod error;
pub mod gapic;
pub mod language;
pub mod locator;
pub mod metadata;
pub mod protos;
pub mod retrieve;
pub mod synchronise;
pub mod tracked_paths;
pub mod transfer;

pub use error::SyncError;
pub use language::Language;
