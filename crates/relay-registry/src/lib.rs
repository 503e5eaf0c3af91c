// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry for the Relay model provider layer.
//!
//! Builds one backend adapter from configuration and binds it to the logical
//! roles `chat`, `chat-with-reasoning`, `title` and `artifact`.

pub mod registry;
pub mod role;

pub use registry::{ProviderRegistry, RegistryBuilder, build_adapter};
pub use role::Role;
