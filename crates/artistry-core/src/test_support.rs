//! Scripted providers shared by the unit tests in this crate.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use artistry_types::error::ProviderError;
use artistry_types::provider::{Capability, ProviderOutput, ProviderRequest};

use crate::provider::{BoxGenerationProvider, GenerationProvider};

/// Provider that replays scripted outcomes, then repeats a default.
pub struct ScriptedProvider {
    name: String,
    capability: Capability,
    configured: bool,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    default: Result<String, ProviderError>,
    probe: Result<(), ProviderError>,
    calls: Arc<AtomicU32>,
    probes: Arc<AtomicU32>,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// Handles kept by a test after the provider is boxed.
#[derive(Clone)]
pub struct ProviderProbe {
    calls: Arc<AtomicU32>,
    probes: Arc<AtomicU32>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ProviderProbe {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ScriptedProvider {
    pub fn ok(name: &str, capability: Capability, content: &str) -> Self {
        Self::with_default(name, capability, Ok(content.to_string()))
    }

    pub fn failing(name: &str, capability: Capability, error: ProviderError) -> Self {
        Self::with_default(name, capability, Err(error))
    }

    fn with_default(
        name: &str,
        capability: Capability,
        default: Result<String, ProviderError>,
    ) -> Self {
        Self {
            name: name.to_string(),
            capability,
            configured: true,
            script: Mutex::new(VecDeque::new()),
            default,
            probe: Ok(()),
            calls: Arc::new(AtomicU32::new(0)),
            probes: Arc::new(AtomicU32::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Outcomes returned (in order) before falling back to the default.
    pub fn then(self, outcome: Result<&str, ProviderError>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(outcome.map(str::to_string));
        self
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn with_probe(mut self, probe: Result<(), ProviderError>) -> Self {
        self.probe = probe;
        self
    }

    pub fn handle(&self) -> ProviderProbe {
        ProviderProbe {
            calls: self.calls.clone(),
            probes: self.probes.clone(),
            prompts: self.prompts.clone(),
        }
    }

    pub fn boxed(self) -> (BoxGenerationProvider, ProviderProbe) {
        let handle = self.handle();
        (BoxGenerationProvider::new(self), handle)
    }
}

impl GenerationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        self.capability
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn generate(
        &self,
        request: &ProviderRequest,
    ) -> impl Future<Output = Result<ProviderOutput, ProviderError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone());
        async move {
            outcome.map(|content| ProviderOutput {
                content,
                model: "mock-model".to_string(),
            })
        }
    }

    fn probe(&self) -> impl Future<Output = Result<(), ProviderError>> + Send {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let result = self.probe.clone();
        async move { result }
    }
}

pub fn transport(message: &str) -> ProviderError {
    ProviderError::Transport {
        message: message.to_string(),
    }
}

/// Span captured by [`SpanRecorder`], with every field recorded on it.
#[derive(Debug, Clone)]
pub struct RecordedSpan {
    id: u64,
    pub name: &'static str,
    pub fields: Vec<(String, String)>,
}

impl RecordedSpan {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Layer that keeps every span opened while it is the default subscriber.
#[derive(Clone, Default)]
pub struct SpanRecorder {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
}

impl SpanRecorder {
    pub fn named(&self, name: &str) -> Vec<RecordedSpan> {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .filter(|span| span.name == name)
            .cloned()
            .collect()
    }
}

struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for SpanRecorder {
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut fields = Vec::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        self.spans.lock().unwrap().push(RecordedSpan {
            id: id.into_u64(),
            name: attrs.metadata().name(),
            fields,
        });
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut spans = self.spans.lock().unwrap();
        if let Some(span) = spans.iter_mut().rev().find(|span| span.id == id.into_u64()) {
            values.record(&mut FieldVisitor(&mut span.fields));
        }
    }
}
