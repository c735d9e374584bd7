//! Violation recording commands - `mark` and `late`.
//!
//! Both commands resolve every student first, then record the violation for each of
//! them one after another and reply with a single summary.

use crate::core::fines::{Prayer, ViolationType};

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{PrayerChoice, ViolationChoice};
    use crate::{
        bot::{
            BotData,
            commands::utils::{parse_date, resolve_students},
            handlers::autocomplete,
        },
        core::{
            fines::ViolationSlot,
            live::RecordKind,
            violation::{BatchOutcome, record_violations_batch},
        },
        errors::{Error, Result},
    };
    use chrono::NaiveDate;
    use std::fmt::Write;

    async fn record_and_reply(
        ctx: poise::Context<'_, BotData, Error>,
        students: Vec<String>,
        date: NaiveDate,
        slot: ViolationSlot,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let resolved = resolve_students(db, students).await?;
        let ids: Vec<i64> = resolved.iter().map(|s| s.id).collect();

        let outcome: BatchOutcome = record_violations_batch(db, &ids, date, slot).await;
        if outcome.succeeded() > 0 {
            ctx.data()
                .publish(&[RecordKind::Violations, RecordKind::Students]);
        }

        let icon = if outcome.succeeded() > 0 { "✅" } else { "⚠️" };
        let mut reply = format!(
            "{icon} {} - {} ({}) on {date}",
            outcome.summary(),
            slot.kind(),
            slot.prayer()
        );
        if outcome.succeeded() > 0 {
            write!(reply, ", {} in fines", outcome.total_fine())?;
        }
        ctx.say(reply).await?;
        Ok(())
    }

    /// Records a prayer violation for up to five students.
    #[poise::command(slash_command)]
    #[allow(clippy::too_many_arguments)]
    pub async fn mark(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Prayer the violation happened at"] prayer: PrayerChoice,
        #[description = "What happened"] violation: ViolationChoice,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_2: Option<String>,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_3: Option<String>,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_4: Option<String>,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_5: Option<String>,
        #[description = "Date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let date = parse_date(date.as_deref())?;
        let slot = ViolationSlot::new(prayer.into(), violation.into())?;

        let students = std::iter::once(student)
            .chain([student_2, student_3, student_4, student_5].into_iter().flatten())
            .collect();
        record_and_reply(ctx, students, date, slot).await
    }

    /// Records a Late to School violation for up to five students.
    #[poise::command(slash_command)]
    pub async fn late(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_2: Option<String>,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_3: Option<String>,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_4: Option<String>,
        #[description = "Another student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student_5: Option<String>,
        #[description = "Date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
    ) -> Result<()> {
        let date = parse_date(date.as_deref())?;

        let students = std::iter::once(student)
            .chain([student_2, student_3, student_4, student_5].into_iter().flatten())
            .collect();
        record_and_reply(ctx, students, date, ViolationSlot::late_to_school()).await
    }
}

/// Prayer choices offered by `/mark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum PrayerChoice {
    /// Dawn prayer
    Subh,
    /// Midday prayer
    Luhar,
    /// Afternoon prayer
    Asar,
    /// Sunset prayer
    Magrib,
    /// Night prayer
    Isha,
}

impl From<PrayerChoice> for Prayer {
    fn from(choice: PrayerChoice) -> Self {
        match choice {
            PrayerChoice::Subh => Self::Subh,
            PrayerChoice::Luhar => Self::Luhar,
            PrayerChoice::Asar => Self::Asar,
            PrayerChoice::Magrib => Self::Magrib,
            PrayerChoice::Isha => Self::Isha,
        }
    }
}

/// Prayer violation choices offered by `/mark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ViolationChoice {
    /// Missed the prayer
    Absent,
    /// Joined late
    Masbooq,
    /// Attended without a cap
    #[name = "No Cap"]
    NoCap,
}

impl From<ViolationChoice> for ViolationType {
    fn from(choice: ViolationChoice) -> Self {
        match choice {
            ViolationChoice::Absent => Self::Absent,
            ViolationChoice::Masbooq => Self::Masbooq,
            ViolationChoice::NoCap => Self::NoCap,
        }
    }
}

pub use inner::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fines::ViolationSlot;

    #[test]
    fn test_choices_map_to_fine_table() {
        let slot = ViolationSlot::new(PrayerChoice::Magrib.into(), ViolationChoice::NoCap.into());
        let slot = slot.ok();
        assert_eq!(slot.map(ViolationSlot::prayer), Some(Prayer::Magrib));
        assert_eq!(slot.map(ViolationSlot::fine), Some(25));
        assert_eq!(ViolationType::from(ViolationChoice::Absent).fine(), 50);
    }
}
