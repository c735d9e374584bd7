//! Dashboard command - aggregate view of fines and violations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{or_dash, parse_date},
        },
        core::report::{Dashboard, load_dashboard},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn breakdown(dashboard: &Dashboard) -> (String, String, String) {
        let prayers = dashboard
            .prayer_counts
            .iter()
            .map(|(prayer, count)| format!("{prayer}: {count}"))
            .chain(std::iter::once(format!(
                "Late to School: {}",
                dashboard.late_count
            )))
            .collect::<Vec<_>>()
            .join("\n");

        let types = if dashboard.type_counts.is_empty() {
            "-".to_string()
        } else {
            dashboard
                .type_counts
                .iter()
                .map(|(kind, count)| format!("{kind}: {count}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let top = if dashboard.top_students.is_empty() {
            "No fines yet".to_string()
        } else {
            dashboard
                .top_students
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    format!(
                        "{}. **{}** ({}) - {}",
                        i + 1,
                        s.name,
                        or_dash(Some(s.class_name.as_str())),
                        s.total_fine
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        (prayers, types, top)
    }

    /// Shows total fines, today's violations and the students with the most fines.
    #[poise::command(slash_command)]
    pub async fn dashboard(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day to count as today, YYYY-MM-DD (defaults to today)"]
        date: Option<String>,
    ) -> Result<()> {
        let today = parse_date(date.as_deref())?;
        let top_n = ctx.data().settings.report.top_students;
        let dashboard = load_dashboard(&ctx.data().database, today, top_n).await?;
        let (prayers, types, top) = breakdown(&dashboard);

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{} Dashboard**", ctx.data().settings.report.title))
            .description(format!("As of: {today}"))
            .field("Total Fines", dashboard.total_fines.to_string(), true)
            .field("Today's Violations", dashboard.today_count.to_string(), true)
            .field("By Prayer", prayers, false)
            .field("By Type", types, false)
            .field(format!("Top {top_n}"), top, false)
            .color(0x0010_B981);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
