// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `classifier`: kind and canonical name decisions
//! - `domain_name`: DNS validation and splitting

mod classifier;
mod domain_name;
