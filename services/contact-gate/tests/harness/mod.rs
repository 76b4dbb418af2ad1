// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for contact gate abuse simulation.
//!
//! This module provides payload generators, abuse patterns and outcome
//! tallies for driving the gate the way a hostile client would.

pub mod attacks;
pub mod generators;
pub mod metrics;
