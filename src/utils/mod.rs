//! Utility modules for common functionality

pub mod tag_utils;
