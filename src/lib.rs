//! Workcopy - a working copy engine for a version control client in Rust.
//!
//! The crate covers the pipeline that keeps a local tree in step with a
//! repository: the [`reporter`] walks the working copy and describes it to an
//! external update consumer, the [`subst`] translator converts files between
//! their canonical repository form and their materialised working form, and
//! the [`merge`] engine reconciles two streams of edits with conflict
//! detection. The [`entries`], [`textbase`] and [`props`] stores hold the
//! per-directory bookkeeping that the pipeline reads and writes, all rooted
//! in the [`admin`] area owned by every versioned directory.

pub mod admin;
pub mod cancel;
pub mod config;
pub mod entries;
mod error;
pub mod merge;
pub mod props;
pub mod reporter;
pub mod subst;
pub mod textbase;

pub use crate::error::{Error, Result};
