// ABOUTME: AI Adapter (C10) — query rewriting, categorisation, suggestions, and optimisation hints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! AI Enrichment Adapter (§4.10). Strictly-typed, timeout-bounded, fail-soft.

mod adapter;
mod types;

pub use adapter::LlmAdapter;
pub use types::{AnalysisResult, Insight, RewriteResult};
