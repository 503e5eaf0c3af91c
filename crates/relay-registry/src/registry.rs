// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry mapping roles to bound adapters.
//!
//! The registry is built once from configuration. It instantiates exactly one
//! backend adapter and shares it across every role that is not overridden;
//! `chat-with-reasoning` gets the same adapter behind the reasoning middleware.
//! Bindings are read-only afterwards and lookups return the same instance on
//! every call.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use futures::stream;
use relay_config::{ProviderKind, RelayConfig};
use relay_core::{EventStream, GenerateResult, ModelAdapter, Prompt, ReasoningAdapter, RelayError};
use relay_ollama::OllamaProvider;
use relay_openai::OpenAiProvider;
use relay_webhook::WebhookProvider;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::role::Role;

/// Role-to-adapter bindings.
pub struct ProviderRegistry {
    bindings: HashMap<Role, Arc<dyn ModelAdapter>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for role in Role::iter() {
            if let Some(adapter) = self.bindings.get(&role) {
                map.entry(&role, &format!("{}/{}", adapter.name(), adapter.model_id()));
            }
        }
        map.finish()
    }
}

impl ProviderRegistry {
    /// Builds the registry from configuration with no overrides.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        RegistryBuilder::new(config).build()
    }

    /// Starts a builder for registries with substituted bindings.
    pub fn builder(config: &RelayConfig) -> RegistryBuilder<'_> {
        RegistryBuilder::new(config)
    }

    /// Returns the adapter bound to `role`.
    pub fn get(&self, role: Role) -> Result<Arc<dyn ModelAdapter>, RelayError> {
        self.bindings
            .get(&role)
            .cloned()
            .ok_or_else(|| RelayError::RoleNotFound {
                role: role.to_string(),
            })
    }

    /// Returns the adapter bound to the role named `name` (e.g. `"title"`).
    pub fn get_by_name(&self, name: &str) -> Result<Arc<dyn ModelAdapter>, RelayError> {
        let role = Role::from_str(name).map_err(|_| RelayError::RoleNotFound {
            role: name.to_string(),
        })?;
        self.get(role)
    }

    /// One-shot generation through the adapter bound to `role`.
    pub async fn generate(&self, role: Role, prompt: Prompt) -> Result<GenerateResult, RelayError> {
        self.get(role)?.generate(prompt).await
    }

    /// Streaming generation through the adapter bound to `role`.
    ///
    /// A lookup failure is delivered as the stream's only item.
    pub fn stream(&self, role: Role, prompt: Prompt) -> EventStream {
        match self.get(role) {
            Ok(adapter) => adapter.stream(prompt),
            Err(e) => Box::pin(stream::once(async move { Err(e) })),
        }
    }
}

/// Builder for a [`ProviderRegistry`] with optional substitute bindings.
pub struct RegistryBuilder<'a> {
    config: &'a RelayConfig,
    base: Option<Arc<dyn ModelAdapter>>,
    overrides: HashMap<Role, Arc<dyn ModelAdapter>>,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(config: &'a RelayConfig) -> Self {
        Self {
            config,
            base: None,
            overrides: HashMap::new(),
        }
    }

    /// Binds `adapter` to `role` as given.
    ///
    /// An override for `chat-with-reasoning` is not wrapped by the reasoning
    /// middleware.
    pub fn with_override(mut self, role: Role, adapter: Arc<dyn ModelAdapter>) -> Self {
        self.overrides.insert(role, adapter);
        self
    }

    /// Uses `adapter` instead of constructing one from the provider kind.
    ///
    /// It is bound like a configured backend, including the reasoning wrap.
    pub fn with_base(mut self, adapter: Arc<dyn ModelAdapter>) -> Self {
        self.base = Some(adapter);
        self
    }

    /// Constructs the backend adapter (if any role still needs it) and binds every role.
    pub fn build(self) -> Result<ProviderRegistry, RelayError> {
        let RegistryBuilder {
            config,
            base,
            mut overrides,
        } = self;

        let needs_base = Role::iter().any(|role| !overrides.contains_key(&role));
        let base = match base {
            Some(adapter) => Some(adapter),
            None if needs_base => Some(build_adapter(config)?),
            None => None,
        };

        let mut bindings = HashMap::new();
        for role in Role::iter() {
            let adapter: Arc<dyn ModelAdapter> = match (overrides.remove(&role), &base) {
                (Some(adapter), _) => {
                    debug!(role = %role, adapter = adapter.name(), "role overridden");
                    adapter
                }
                (None, Some(base)) if role.extracts_reasoning() => {
                    let tag = config.reasoning.tag.clone();
                    Arc::new(ReasoningAdapter::new(Arc::clone(base), tag))
                }
                (None, Some(base)) => Arc::clone(base),
                (None, None) => {
                    return Err(RelayError::Config(format!("no adapter for role {role}")));
                }
            };
            bindings.insert(role, adapter);
        }

        if let Some(base) = &base {
            info!(
                provider = base.name(),
                model = base.model_id(),
                reasoning_tag = %config.reasoning.tag,
                "provider registry built"
            );
        }

        Ok(ProviderRegistry { bindings })
    }
}

/// Instantiates the one backend adapter selected by `provider.kind`.
pub fn build_adapter(config: &RelayConfig) -> Result<Arc<dyn ModelAdapter>, RelayError> {
    let adapter: Arc<dyn ModelAdapter> = match config.provider.kind {
        ProviderKind::Hosted => Arc::new(OpenAiProvider::new(config)?),
        ProviderKind::Local => Arc::new(OllamaProvider::new(config)?),
        ProviderKind::Webhook => Arc::new(WebhookProvider::new(config)?),
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use relay_core::{FinishReason, StreamEvent, collect_stream};
    use relay_test_utils::{MockAdapter, MockReply};

    fn mock(replies: Vec<MockReply>) -> Arc<dyn ModelAdapter> {
        Arc::new(MockAdapter::with_replies(replies))
    }

    #[test]
    fn default_config_binds_local_adapter_everywhere() {
        let registry = ProviderRegistry::from_config(&RelayConfig::default()).unwrap();

        for role in Role::iter() {
            let adapter = registry.get(role).unwrap();
            assert_eq!(adapter.name(), "local");
            assert_eq!(adapter.model_id(), "llama3.2");
        }
    }

    #[test]
    fn lookups_return_the_same_instance() {
        let registry = ProviderRegistry::from_config(&RelayConfig::default()).unwrap();

        let chat = registry.get(Role::Chat).unwrap();
        assert!(Arc::ptr_eq(&chat, &registry.get(Role::Chat).unwrap()));
        assert!(Arc::ptr_eq(&chat, &registry.get(Role::Title).unwrap()));
        assert!(Arc::ptr_eq(&chat, &registry.get(Role::Artifact).unwrap()));
        assert!(!Arc::ptr_eq(
            &chat,
            &registry.get(Role::ChatWithReasoning).unwrap()
        ));
    }

    #[test]
    fn unconstructible_backend_is_a_config_error() {
        let mut config = RelayConfig::default();
        config.provider.kind = ProviderKind::Webhook;
        let err = ProviderRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)), "got: {err}");

        let mut config = RelayConfig::default();
        config.provider.kind = ProviderKind::Hosted;
        let err = ProviderRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)), "got: {err}");
    }

    #[test]
    fn fully_overridden_registry_skips_backend_construction() {
        let mut config = RelayConfig::default();
        config.provider.kind = ProviderKind::Webhook;

        let mut builder = ProviderRegistry::builder(&config);
        for role in Role::iter() {
            builder = builder.with_override(role, Arc::new(MockAdapter::new()));
        }
        let registry = builder.build().unwrap();
        assert_eq!(registry.get(Role::Title).unwrap().name(), "mock");
    }

    #[test]
    fn get_by_name_parses_roles() {
        let registry = ProviderRegistry::from_config(&RelayConfig::default()).unwrap();

        assert!(registry.get_by_name("chat-with-reasoning").is_ok());
        let Err(err) = registry.get_by_name("summary") else {
            panic!("unknown role name should not resolve");
        };
        assert!(matches!(err, RelayError::RoleNotFound { ref role } if role == "summary"));
    }

    #[tokio::test]
    async fn overrides_only_replace_their_role() {
        let title = mock(vec![MockReply::text("A Title")]);
        let registry = ProviderRegistry::builder(&RelayConfig::default())
            .with_base(mock(vec![MockReply::text("chat answer")]))
            .with_override(Role::Title, Arc::clone(&title))
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(&registry.get(Role::Title).unwrap(), &title));
        let result = registry.generate(Role::Title, Prompt::from("x")).await.unwrap();
        assert_eq!(result.text, "A Title");
        let result = registry.generate(Role::Chat, Prompt::from("x")).await.unwrap();
        assert_eq!(result.text, "chat answer");
    }

    #[tokio::test]
    async fn reasoning_role_wraps_the_base_adapter() {
        let registry = ProviderRegistry::builder(&RelayConfig::default())
            .with_base(mock(vec![
                MockReply::fragments(["<thi", "nk>plan</th", "ink>answer"]),
                MockReply::text("<think>why</think>what"),
            ]))
            .build()
            .unwrap();

        let summary = collect_stream(registry.stream(Role::ChatWithReasoning, Prompt::from("q")))
            .await
            .unwrap();
        assert_eq!(summary.reasoning, "plan");
        assert_eq!(summary.text, "answer");
        assert_eq!(summary.finish.map(|(reason, _)| reason), Some(FinishReason::Stop));

        let result = registry
            .generate(Role::ChatWithReasoning, Prompt::from("q"))
            .await
            .unwrap();
        assert_eq!(result.reasoning.as_deref(), Some("why"));
        assert_eq!(result.text, "what");
    }

    #[tokio::test]
    async fn reasoning_override_is_not_rewrapped() {
        let registry = ProviderRegistry::builder(&RelayConfig::default())
            .with_override(
                Role::ChatWithReasoning,
                mock(vec![MockReply::text("<think>raw</think>")]),
            )
            .build()
            .unwrap();

        let summary = collect_stream(registry.stream(Role::ChatWithReasoning, Prompt::from("q")))
            .await
            .unwrap();
        assert_eq!(summary.text, "<think>raw</think>");
        assert_eq!(summary.reasoning, "");
    }

    #[tokio::test]
    async fn configured_tag_is_used() {
        let mut config = RelayConfig::default();
        config.reasoning.tag = "reason".into();
        let registry = ProviderRegistry::builder(&config)
            .with_base(mock(vec![MockReply::text("<reason>r</reason><think>t</think>")]))
            .build()
            .unwrap();

        let summary = collect_stream(registry.stream(Role::ChatWithReasoning, Prompt::from("q")))
            .await
            .unwrap();
        assert_eq!(summary.reasoning, "r");
        assert_eq!(summary.text, "<think>t</think>");
    }

    #[tokio::test]
    async fn other_roles_do_not_extract_reasoning() {
        let registry = ProviderRegistry::builder(&RelayConfig::default())
            .with_base(mock(vec![MockReply::text("<think>x</think>y")]))
            .build()
            .unwrap();

        let mut events = registry.stream(Role::Chat, Prompt::from("q"));
        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first, StreamEvent::text("<think>x</think>y"));
    }
}
