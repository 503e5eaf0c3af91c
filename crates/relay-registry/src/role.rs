// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical roles the chat application requests models by.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A logical model role.
///
/// Every role is bound at start-up. Only [`Role::ChatWithReasoning`] is wrapped
/// by the reasoning middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Role {
    Chat,
    ChatWithReasoning,
    Title,
    Artifact,
}

impl Role {
    /// Whether the role's binding extracts reasoning segments.
    pub fn extracts_reasoning(self) -> bool {
        matches!(self, Role::ChatWithReasoning)
    }
}
