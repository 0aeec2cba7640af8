//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the live session (goal, tactic and metric ids) or from
//! the fixed label sets (statuses, block types, vision kinds, metric kinds).
//! Ids sort naturally, so `t2` comes before `t10`.

use crate::{
    bot::BotData,
    core::{
        cycle::VisionKind,
        metric::MetricKind,
        session::tactic_key,
        tactic::{BlockType, TacticStatus},
    },
    errors::Error,
};

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;

fn matching<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let matching = candidates
        .into_iter()
        .filter(|c| c.to_lowercase().contains(&partial_lower));
    first_sorted(matching)
}

/// Sorts naturally, then keeps the first `MAX_CHOICES`
fn first_sorted(candidates: impl Iterator<Item = String>) -> Vec<String> {
    let mut sorted: Vec<String> = candidates.collect();
    sorted.sort_by_cached_key(|c| natural_key(c));
    sorted.truncate(MAX_CHOICES);
    sorted
}

/// Splits `g1/t10` into `[("g", 1), ("/t", 10)]` so numbers compare by value
fn natural_key(value: &str) -> Vec<(String, u64)> {
    let mut key = Vec::new();
    let mut text = String::new();
    let mut digits = String::new();

    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if !digits.is_empty() {
                key.push((std::mem::take(&mut text), digits.parse().unwrap_or(u64::MAX)));
                digits.clear();
            }
            text.extend(c.to_lowercase());
        }
    }
    if !digits.is_empty() || !text.is_empty() {
        key.push((text, digits.parse().unwrap_or(0)));
    }
    key
}

/// Suggests goal ids, matching on id or title.
pub async fn autocomplete_goal_id(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let session = ctx.data().session.lock().await;
    let partial_lower = partial.to_lowercase();

    first_sorted(
        session
            .cycle()
            .goals
            .iter()
            .filter(|g| {
                g.id.to_lowercase().contains(&partial_lower)
                    || g.title.to_lowercase().contains(&partial_lower)
            })
            .map(|g| g.id.clone()),
    )
}

/// Suggests `goal/tactic` keys, matching on the key or the tactic title.
pub async fn autocomplete_tactic_id(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let session = ctx.data().session.lock().await;
    tactic_choices(session.cycle(), partial)
}

fn tactic_choices(cycle: &crate::core::cycle::Cycle, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    first_sorted(
        cycle
            .all_tactics()
            .map(|(g, t)| (tactic_key(&g.id, &t.id), t))
            .filter(|(key, t)| {
                key.to_lowercase().contains(&partial_lower)
                    || t.title.to_lowercase().contains(&partial_lower)
            })
            .map(|(key, _)| key),
    )
}

/// Suggests metric ids across all goals.
pub async fn autocomplete_metric_id(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let session = ctx.data().session.lock().await;
    let ids = session
        .cycle()
        .goals
        .iter()
        .flat_map(|g| g.metrics.iter().map(|m| m.id.clone()));
    matching(ids, partial)
}

/// Suggests tactic statuses.
pub async fn autocomplete_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(TacticStatus::ALL.iter().map(|s| s.as_str().to_string()), partial)
}

/// Suggests block types.
pub async fn autocomplete_block_type(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(BlockType::ALL.iter().map(|b| b.as_str().to_string()), partial)
}

/// Suggests vision kinds.
pub async fn autocomplete_vision_kind(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(
        [VisionKind::ThreeYear, VisionKind::OneYear]
            .iter()
            .map(|k| k.as_str().to_string()),
        partial,
    )
}

/// Suggests metric kinds.
pub async fn autocomplete_metric_kind(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(
        [MetricKind::Lead, MetricKind::Lag]
            .iter()
            .map(|k| k.as_str().to_string()),
        partial,
    )
}

/// Suggests day names.
pub async fn autocomplete_day(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let days = [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ];
    let partial_lower = partial.to_lowercase();

    // Keep weekday order rather than sorting
    days.iter()
        .filter(|d| d.to_lowercase().starts_with(&partial_lower))
        .map(|&d| d.to_string())
        .collect()
}
