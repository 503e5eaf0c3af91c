// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Relay integration tests.
//!
//! Provides [`MockAdapter`], a scripted [`relay_core::ModelAdapter`] usable
//! anywhere a real backend would be bound, including registry overrides.

pub mod mock_adapter;

pub use mock_adapter::{MOCK_USAGE, MockAdapter, MockReply};
