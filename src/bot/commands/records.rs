//! Records commands - roster-wide fine listing, PDF export, bulk clear and the ledger audit.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{bounded_listing, or_dash, today},
        },
        core::{
            export::{render_pdf, roster_report},
            live::RecordKind,
            report::search_students,
            student::get_all_students,
            violation::{clear_all_violations, reconcile_total_fines},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Fine records for the whole roster.
    #[poise::command(
        slash_command,
        subcommands("records_list", "records_export", "records_clear"),
        subcommand_required
    )]
    pub async fn records(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Lists students and their total fines, optionally filtered by name.
    #[poise::command(slash_command, rename = "list")]
    pub async fn records_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Part of a student's name"] search: Option<String>,
    ) -> Result<()> {
        let students = get_all_students(&ctx.data().database).await?;
        let query = search.as_deref().unwrap_or_default();
        let mut matches = search_students(&students, query);
        matches.sort_by(|a, b| {
            b.total_fine
                .cmp(&a.total_fine)
                .then_with(|| a.name.cmp(&b.name))
        });

        if matches.is_empty() {
            ctx.say(format!("No students match '{}'.", query.trim()))
                .await?;
            return Ok(());
        }

        let lines: Vec<String> = matches
            .iter()
            .map(|s| {
                format!(
                    "**{}** · {} · Room {} - {}",
                    s.name,
                    or_dash(Some(s.class_name.as_str())),
                    or_dash(s.room.as_deref()),
                    s.total_fine
                )
            })
            .collect();
        let total: i64 = matches.iter().map(|s| s.total_fine).sum();

        let embed = serenity::CreateEmbed::default()
            .title("**Student Fines**")
            .description(bounded_listing(&lines))
            .color(0x0010_B981)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} students | {} in fines",
                matches.len(),
                total
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Exports every student with an outstanding fine as a PDF.
    #[poise::command(slash_command, rename = "export")]
    pub async fn records_export(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;

        let students = get_all_students(&ctx.data().database).await?;
        let report = roster_report(&ctx.data().settings.report.title, &students, today());
        let bytes = render_pdf(&report)?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!("📄 {}", report.total))
                .attachment(serenity::CreateAttachment::bytes(bytes, report.file_name)),
        )
        .await?;
        Ok(())
    }

    /// Deletes every violation and resets every student's total to zero.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn records_clear(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Set to True to really delete all violations"] confirm: bool,
    ) -> Result<()> {
        if !confirm {
            ctx.say("Nothing was cleared. Run again with `confirm: True` to delete all violations.")
                .await?;
            return Ok(());
        }

        let summary = clear_all_violations(&ctx.data().database).await?;
        ctx.data()
            .publish(&[RecordKind::Violations, RecordKind::Students]);

        ctx.say(format!(
            "🗑️ All records cleared: {} violations deleted, {} students reset.",
            summary.violations_removed, summary.students_reset
        ))
        .await?;
        Ok(())
    }

    /// Checks every total fine against the violation ledger and repairs drift.
    #[poise::command(slash_command)]
    pub async fn audit(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let corrections = reconcile_total_fines(&ctx.data().database).await?;

        if corrections.is_empty() {
            ctx.say("✅ All totals match the violation ledger.").await?;
            return Ok(());
        }

        ctx.data().publish(&[RecordKind::Students]);
        let lines: Vec<String> = corrections
            .iter()
            .map(|c| {
                format!(
                    "**{}**: {} → {}",
                    c.student_name, c.recorded_total, c.ledger_total
                )
            })
            .collect();
        let embed = serenity::CreateEmbed::default()
            .title("**Totals Repaired**")
            .description(bounded_listing(&lines))
            .color(0x00E6_7E22);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
