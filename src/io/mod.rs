//! I/O utilities for file handling
//!
//! This module provides traits and helpers for positioned reads and writes
//! and for byte order handling.

pub mod seekable;
pub mod byte_order;
