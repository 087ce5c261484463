//! Filesystem helpers for namespace handle files.
//!
//! Handles are plain files kept alive by bind mounts, so the only
//! filesystem operations needed are bind mounting and lazy unmounting.

pub mod mount;
