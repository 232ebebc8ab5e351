//! # utils
//!
//! Client utilities

pub mod path;
pub mod smb;
pub mod xattr;
