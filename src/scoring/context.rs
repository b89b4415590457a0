use super::{EngineKind, EngineResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Demographic,
    Comorbidity,
    Course,
    Treatment,
    Interaction,
    Dependency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextDetail {
    pub label: String,
    pub detail: String,
    pub icon: &'static str,
    #[serde(rename = "type")]
    pub kind: ContextKind,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    pub context_modifier: f64,
    pub details: Vec<ContextDetail>,
}

impl Context {
    pub fn neutral() -> Self {
        Self {
            context_modifier: 1.0,
            details: Vec::new(),
        }
    }
}

/// Accumulates context factors multiplicatively. No clamp is applied here.
#[derive(Debug)]
pub struct ContextBuilder {
    context: Context,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            context: Context::neutral(),
        }
    }

    pub fn apply(
        &mut self,
        triggered: bool,
        factor: f64,
        kind: ContextKind,
        icon: &'static str,
        label: impl Into<String>,
        detail: impl Into<String>,
    ) -> &mut Self {
        if triggered {
            self.context.context_modifier *= factor;
            self.context.details.push(ContextDetail {
                label: label.into(),
                detail: detail.into(),
                icon,
                kind,
                factor,
            });
        }
        self
    }

    pub fn finish(self) -> Context {
        self.context
    }
}

/// Results of engines that already ran, in execution order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorResults<'a> {
    entries: &'a [(EngineKind, &'a EngineResult)],
}

impl<'a> PriorResults<'a> {
    pub fn new(entries: &'a [(EngineKind, &'a EngineResult)]) -> Self {
        Self { entries }
    }

    pub fn get(&self, engine: EngineKind) -> Option<&'a EngineResult> {
        self.entries
            .iter()
            .find(|(kind, _)| *kind == engine)
            .map(|(_, result)| *result)
    }

    pub fn score(&self, engine: EngineKind) -> Option<u8> {
        self.get(engine).map(|result| result.synthesis.score)
    }
}
