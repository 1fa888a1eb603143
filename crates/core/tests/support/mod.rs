//! Shared test helpers for `tollgate-core` integration tests.
//!
//! In-memory implementations of the core ports with call counting and
//! failure injection, so scenarios can focus on behaviour instead of
//! boilerplate.

#![allow(dead_code)]

pub mod social;
pub mod storage;
