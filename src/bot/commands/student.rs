//! Per-student commands - history, PDF export, clearing and removing single violations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{bounded_listing, or_dash, resolve_student, today},
            handlers::autocomplete,
        },
        core::{
            export::{render_pdf, student_report},
            live::RecordKind,
            student::get_student_by_id,
            violation::{clear_student_violations, delete_violation, get_violations_for_student},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// One student's violation record.
    #[poise::command(
        slash_command,
        subcommands(
            "student_history",
            "student_export",
            "student_clear",
            "student_remove_violation"
        ),
        subcommand_required
    )]
    pub async fn student(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Shows a student's violations, newest first.
    #[poise::command(slash_command, rename = "history")]
    pub async fn student_history(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let student = resolve_student(db, &student).await?;
        let violations = get_violations_for_student(db, student.id).await?;

        let description = if violations.is_empty() {
            "No violations recorded.".to_string()
        } else {
            let lines: Vec<String> = violations
                .iter()
                .map(|v| {
                    format!(
                        "`#{}` {} · {} · {} - {}",
                        v.id, v.date, v.prayer, v.violation_type, v.fine
                    )
                })
                .collect();
            bounded_listing(&lines)
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{}**", student.name))
            .description(description)
            .field("Class", or_dash(Some(student.class_name.as_str())), true)
            .field("Room", or_dash(student.room.as_deref()), true)
            .field("Total Fine", student.total_fine.to_string(), true)
            .color(0x0011_1111)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} violations | remove one with /student remove_violation",
                violations.len()
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Exports a student's violation report as a PDF.
    #[poise::command(slash_command, rename = "export")]
    pub async fn student_export(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
    ) -> Result<()> {
        ctx.defer().await?;

        let db = &ctx.data().database;
        let student = resolve_student(db, &student).await?;
        let violations = get_violations_for_student(db, student.id).await?;
        let report = student_report(&student, &violations, today());
        let bytes = render_pdf(&report)?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📄 {}", report.title))
                .attachment(serenity::CreateAttachment::bytes(bytes, report.file_name)),
        )
        .await?;
        Ok(())
    }

    /// Deletes all of a student's violations and resets their total to zero.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn student_clear(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "Set to True to really delete this student's violations"] confirm: bool,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let student = resolve_student(db, &student).await?;

        if !confirm {
            ctx.say(format!(
                "Nothing was cleared. Run again with `confirm: True` to clear {}'s {} in fines.",
                student.name, student.total_fine
            ))
            .await?;
            return Ok(());
        }

        let removed = clear_student_violations(db, student.id).await?;
        ctx.data()
            .publish(&[RecordKind::Violations, RecordKind::Students]);

        ctx.say(format!(
            "🗑️ Cleared {removed} violations for {}. Total fine is now 0.",
            student.name
        ))
        .await?;
        Ok(())
    }

    /// Removes one violation and refunds its fine.
    #[poise::command(slash_command, rename = "remove_violation")]
    pub async fn student_remove_violation(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Violation ID shown by /student history"] violation_id: i64,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let removed = delete_violation(db, violation_id).await?;
        ctx.data()
            .publish(&[RecordKind::Violations, RecordKind::Students]);

        let total = get_student_by_id(db, removed.student_id)
            .await?
            .map_or(0, |s| s.total_fine);
        ctx.say(format!(
            "✅ Removed {} ({}) on {} from {} (-{}). Total fine is now {total}.",
            removed.violation_type, removed.prayer, removed.date, removed.student_name, removed.fine
        ))
        .await?;
        Ok(())
    }
}

pub use inner::*;
