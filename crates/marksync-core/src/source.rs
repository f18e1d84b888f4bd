//! Module: source
//! Responsibility: deciding, per refresh, where markers come from and
//! shaping the query request for the host store.
//! Does not own: execution (host-side) or reconciliation.
//!
//! Exactly one strategy is chosen per call: serve from cache, invoke a
//! host action, or query the store directly. A context object whose entity
//! matches the target entity bypasses all three.

use crate::{
    config::{CONTEXT_PLACEHOLDER, WidgetConfig},
    record::{Guid, SourceRecord},
    schema::SchemaPlan,
};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// QueryRequest
///
/// Direct-query shape handed to the host store: entity, substituted
/// constraint, and the projection/reference filter from schema resolution.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QueryRequest {
    pub entity: String,
    pub constraint: String,
    pub projection: Vec<String>,
    pub references: BTreeMap<String, Vec<String>>,
}

///
/// SkipReason
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum SkipReason {
    /// The constraint requires a context object and none is bound.
    MissingContext,
}

///
/// FetchPlan
///
/// The routing decision for one fetch cycle.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FetchPlan {
    /// The context object itself is the sole result; no fetch.
    UseContext,
    /// Re-display the cached marker set.
    ServeFromCache,
    /// Invoke the configured host action scoped to the context identity.
    RunAction { action: String, target: Guid },
    /// Query the host store directly.
    RunQuery(QueryRequest),
    /// Do nothing this cycle; diagnostic only.
    Skip(SkipReason),
}

/// Decide the fetch strategy for one cycle.
///
/// Pure decision over configuration, context, and cache state; the engine
/// re-plans with `cache_populated = false` when a cache serve comes up
/// empty.
#[must_use]
pub fn plan_fetch(
    config: &WidgetConfig,
    plan: &SchemaPlan,
    context: Option<&SourceRecord>,
    cache_populated: bool,
) -> FetchPlan {
    // Self-query avoidance: the bound context already is the target entity.
    if let Some(ctx) = context
        && ctx.entity() == config.entity
    {
        return FetchPlan::UseContext;
    }

    if cache_populated && !config.refresh_on_update {
        return FetchPlan::ServeFromCache;
    }

    if let Some(action) = &config.data_action
        && let Some(ctx) = context
    {
        return FetchPlan::RunAction {
            action: action.clone(),
            target: ctx.guid().clone(),
        };
    }

    match (context, config.constraint_requires_context()) {
        (Some(ctx), _) => FetchPlan::RunQuery(query_request(config, plan, Some(ctx.guid()))),
        (None, true) => FetchPlan::Skip(SkipReason::MissingContext),
        (None, false) => FetchPlan::RunQuery(query_request(config, plan, None)),
    }
}

fn query_request(config: &WidgetConfig, plan: &SchemaPlan, context: Option<&Guid>) -> QueryRequest {
    let constraint = match context {
        Some(guid) => config
            .constraint
            .replace(CONTEXT_PLACEHOLDER, guid.as_str()),
        None => config.constraint.clone(),
    };

    QueryRequest {
        entity: config.entity.clone(),
        constraint,
        projection: plan.projection().to_vec(),
        references: plan.references().clone(),
    }
}
