//! Autocomplete handlers for Discord slash command parameters.
//!
//! Student suggestions come from the roster cache and carry the student ID as their
//! value, so students sharing a name stay distinguishable. Class suggestions come
//! straight from the database; there are few classes.

use crate::{bot::BotData, core::class, errors::Error};
use poise::serenity_prelude::AutocompleteChoice;
use tracing::{error, trace};

/// Discord autocomplete limit
const MAX_CHOICES: usize = 25;

/// Suggests students whose name contains the partial input.
pub async fn autocomplete_student(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<AutocompleteChoice> {
    trace!(partial, "Student autocomplete request");
    ctx.data()
        .roster
        .suggest(partial, MAX_CHOICES)
        .await
        .into_iter()
        .map(|s| AutocompleteChoice::new(s.label(), s.id.to_string()))
        .collect()
}

/// Suggests class names that contain the partial input, alphabetically.
pub async fn autocomplete_class(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<AutocompleteChoice> {
    let classes = match class::get_all_classes(&ctx.data().database).await {
        Ok(classes) => classes,
        Err(e) => {
            error!("Autocomplete: failed to fetch classes: {e}");
            return Vec::new();
        }
    };

    let partial_lower = partial.trim().to_lowercase();
    classes
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .map(|c| AutocompleteChoice::new(c.name.clone(), c.name))
        .collect()
}
