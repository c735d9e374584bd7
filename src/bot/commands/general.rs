//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Managea Help**\n\
        Track prayer violations and fines for the hostel.\n\n\
        **Recording**\n\
        • `/mark <prayer> <violation> <student> [more students] [date]` - Absent (50), Masbooq (25) or No Cap (25).\n\
        • `/late <student> [more students] [date]` - Late to School (25).\n\n\
        **Reports**\n\
        • `/dashboard [date]` - Totals, today's violations and top students.\n\
        • `/records list [search]` - Students and their total fines.\n\
        • `/records export` - PDF of every student with a fine.\n\
        • `/student history <student>` - A student's violations with their IDs.\n\
        • `/student export <student>` - PDF of a student's violations.\n\n\
        **Corrections**\n\
        • `/student remove_violation <id>` - Removes one violation and refunds its fine.\n\
        • `/student clear <student> confirm:True` - Clears one student's violations.\n\
        • `/records clear confirm:True` - Clears every violation.\n\
        • `/audit` - Repairs totals that disagree with the violation records.\n\n\
        **Management**\n\
        • `/manage class <add|rename|delete|list>`\n\
        • `/manage student <add|edit|remove|import|list>`\n\n\
        Duplicate entries (same student, date, prayer and violation) are skipped.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
