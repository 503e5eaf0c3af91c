// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Every backend implements [`ModelAdapter`]; it uses `#[async_trait]` so the
//! registry can hold adapters as trait objects.

pub mod adapter;

pub use adapter::{EventStream, ModelAdapter};
