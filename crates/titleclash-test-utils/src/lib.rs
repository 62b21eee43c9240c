// SPDX-FileCopyrightText: 2026 TitleClash Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for TitleClash routing and gateway tests.
//!
//! Provides deterministic building blocks so tests never depend on the wall
//! clock or hand-written JSON.
//!
//! # Components
//!
//! - [`ManualClock`] - settable clock for simulating quota and rate-limit windows
//! - [`fixtures`] - request body builders

pub mod clock;
pub mod fixtures;

pub use clock::ManualClock;
