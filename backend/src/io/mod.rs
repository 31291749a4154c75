//! # IO Module
//!
//! Interfaces through which clients reach the scheduler. Only the REST API
//! lives here today; handlers translate HTTP to domain calls and back and
//! hold no business rules of their own.

pub mod rest;
