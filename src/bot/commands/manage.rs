//! Management commands - classes and the student roster.
//!
//! `/manage class ...` and `/manage student ...` are subcommand groups. Deleting a class
//! or a student also deletes everything that depends on it.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::utils::{bounded_listing, or_dash, resolve_class, resolve_student},
            handlers::autocomplete,
        },
        core::{
            class::{create_class, delete_class, get_classes_with_counts, rename_class},
            import::import_students,
            live::RecordKind,
            student::{
                NewStudent, StudentUpdate, create_student, delete_student, get_students_in_class,
                update_student,
            },
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for managing classes and students.
    #[poise::command(slash_command, subcommands("manage_class", "manage_student"))]
    pub async fn manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let response_text = "Welcome to the management command center!\n\
                             Available command groups:\n\
                             - `class`: Manage classes (e.g., `/manage class list`).\n\
                             - `student`: Manage students (e.g., `/manage student add ...`).";

        ctx.send(
            poise::CreateReply::default()
                .content(response_text)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Class management.
    #[poise::command(
        slash_command,
        rename = "class",
        subcommands("class_add", "class_rename", "class_delete", "class_list"),
        subcommand_required
    )]
    pub async fn manage_class(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Creates a class.
    #[poise::command(slash_command, rename = "add")]
    pub async fn class_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Class name"] name: String,
    ) -> Result<()> {
        let class = create_class(&ctx.data().database, &name).await?;
        ctx.data().publish(&[RecordKind::Classes]);
        ctx.say(format!("✅ Class '{}' created.", class.name)).await?;
        Ok(())
    }

    /// Renames a class; its students show the new name.
    #[poise::command(slash_command, rename = "rename")]
    pub async fn class_rename(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Class to rename"]
        #[autocomplete = "autocomplete::autocomplete_class"]
        class: String,
        #[description = "New name"] new_name: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let class = resolve_class(db, &class).await?;
        let renamed = rename_class(db, class.id, &new_name).await?;
        ctx.data()
            .publish(&[RecordKind::Classes, RecordKind::Students]);

        ctx.say(format!(
            "✅ Class '{}' renamed to '{}'.",
            class.name, renamed.name
        ))
        .await?;
        Ok(())
    }

    /// Deletes a class together with its students and their violations.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn class_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Class to delete"]
        #[autocomplete = "autocomplete::autocomplete_class"]
        class: String,
        #[description = "Set to True to really delete the class and its students"] confirm: bool,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let class = resolve_class(db, &class).await?;

        if !confirm {
            ctx.say(format!(
                "Nothing was deleted. Run again with `confirm: True` to delete '{}' and all of its students.",
                class.name
            ))
            .await?;
            return Ok(());
        }

        let deletion = delete_class(db, class.id).await?;
        ctx.data().publish(&[
            RecordKind::Classes,
            RecordKind::Students,
            RecordKind::Violations,
        ]);

        ctx.say(format!(
            "🗑️ Class '{}' deleted with {} students and {} violations.",
            class.name, deletion.students_removed, deletion.violations_removed
        ))
        .await?;
        Ok(())
    }

    /// Lists classes with their student counts.
    #[poise::command(slash_command, rename = "list")]
    pub async fn class_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let classes = get_classes_with_counts(&ctx.data().database).await?;

        if classes.is_empty() {
            ctx.say("No classes yet. Use `/manage class add` to create one!")
                .await?;
            return Ok(());
        }

        let embed_fields: Vec<(String, String, bool)> = classes
            .into_iter()
            .take(25)
            .map(|(class, count)| (class.name, format!("{count} students"), true))
            .collect();
        let embed = serenity::CreateEmbed::default()
            .title("**Classes**")
            .color(0x0058_65F2)
            .fields(embed_fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Student roster management.
    #[poise::command(
        slash_command,
        rename = "student",
        subcommands(
            "student_add",
            "student_edit",
            "student_remove",
            "student_import",
            "student_list"
        ),
        subcommand_required
    )]
    pub async fn manage_student(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Adds a student, optionally to a class.
    #[poise::command(slash_command, rename = "add")]
    pub async fn student_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student's name"] name: String,
        #[description = "Hostel room"] room: Option<String>,
        #[description = "Class"]
        #[autocomplete = "autocomplete::autocomplete_class"]
        class: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let class = match class {
            Some(name) => Some(resolve_class(db, &name).await?),
            None => None,
        };

        let student = create_student(db, NewStudent::new(name, room), class.as_ref()).await?;
        ctx.data().publish(&[RecordKind::Students]);

        ctx.say(format!(
            "✅ Added {} (Class: {}, Room: {}).",
            student.name,
            or_dash(Some(student.class_name.as_str())),
            or_dash(student.room.as_deref())
        ))
        .await?;
        Ok(())
    }

    /// Changes a student's name or room. Pass `-` as the room to clear it.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn student_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "New name"] name: Option<String>,
        #[description = "New room, or - to clear"] room: Option<String>,
    ) -> Result<()> {
        if name.is_none() && room.is_none() {
            ctx.say("Nothing to change; give a new name or room.").await?;
            return Ok(());
        }

        let db = &ctx.data().database;
        let student = resolve_student(db, &student).await?;
        let update = StudentUpdate {
            name,
            room: room.map(|r| if r.trim() == "-" { None } else { Some(r) }),
        };
        let updated = update_student(db, student.id, update).await?;
        ctx.data().publish(&[RecordKind::Students]);

        ctx.say(format!(
            "✅ Updated {} (Room: {}).",
            updated.name,
            or_dash(updated.room.as_deref())
        ))
        .await?;
        Ok(())
    }

    /// Removes a student together with all of their violations.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn student_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Student"]
        #[autocomplete = "autocomplete::autocomplete_student"]
        student: String,
        #[description = "Set to True to really remove the student"] confirm: bool,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let student = resolve_student(db, &student).await?;

        if !confirm {
            ctx.say(format!(
                "Nothing was removed. Run again with `confirm: True` to remove {} and their violations.",
                student.name
            ))
            .await?;
            return Ok(());
        }

        let removed = delete_student(db, student.id).await?;
        ctx.data()
            .publish(&[RecordKind::Students, RecordKind::Violations]);

        ctx.say(format!(
            "🗑️ Removed {} and {removed} violations.",
            student.name
        ))
        .await?;
        Ok(())
    }

    /// Imports students into a class from a CSV file with `Name` and `Room` columns.
    #[poise::command(slash_command, rename = "import")]
    pub async fn student_import(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Class to import into"]
        #[autocomplete = "autocomplete::autocomplete_class"]
        class: String,
        #[description = "CSV file with a Name column (Room optional)"] file: serenity::Attachment,
    ) -> Result<()> {
        ctx.defer().await?;

        let db = &ctx.data().database;
        let class = resolve_class(db, &class).await?;
        let bytes = file.download().await?;
        let created = import_students(db, &bytes, Some(&class)).await?;
        ctx.data().publish(&[RecordKind::Students]);

        ctx.say(format!(
            "✅ {} students imported into '{}'.",
            created.len(),
            class.name
        ))
        .await?;
        Ok(())
    }

    /// Lists the students of a class.
    #[poise::command(slash_command, rename = "list")]
    pub async fn student_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Class"]
        #[autocomplete = "autocomplete::autocomplete_class"]
        class: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let class = resolve_class(db, &class).await?;
        let students = get_students_in_class(db, class.id).await?;

        let description = if students.is_empty() {
            "No students in this class yet.".to_string()
        } else {
            let lines: Vec<String> = students
                .iter()
                .map(|s| {
                    format!(
                        "**{}** · Room {} · {}",
                        s.name,
                        or_dash(s.room.as_deref()),
                        s.total_fine
                    )
                })
                .collect();
            bounded_listing(&lines)
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{}**", class.name))
            .description(description)
            .color(0x0058_65F2)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} students",
                students.len()
            )));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;
