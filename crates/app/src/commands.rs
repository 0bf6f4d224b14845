use std::fs;

use chrono::Utc;
use fintrack_engine::{
    EXPORT_FILE_NAME, FileStore, Money, RecordDraft, SearchPattern, SortOrder, Tracker, stats,
};

use crate::{
    cli::{
        AddArgs, CategoryCommand, Command, CurrencyCommand, DeleteArgs, EditArgs, ExportArgs,
        ExportFormat, ListArgs, SettingsCommand,
    },
    config::AppConfig,
    error::{AppError, Result},
    prompt, render,
};

pub fn run(command: Command, tracker: &mut Tracker<FileStore>, config: &AppConfig) -> Result<()> {
    match command {
        Command::Add(args) => add(tracker, config, args),
        Command::Edit(args) => edit(tracker, args),
        Command::Delete(args) => delete(tracker, args),
        Command::List(args) => list(tracker, args),
        Command::Stats => {
            let summary = stats::summarize(tracker.records(), tracker.settings(), config.today()?);
            print!("{}", render::dashboard(&summary));
            Ok(())
        }
        Command::Import(args) => {
            let text = fs::read_to_string(&args.file)?;
            let count = tracker.import_json(&text)?;
            println!("Import successful! {count} records loaded.");
            Ok(())
        }
        Command::Export(args) => export(tracker, args),
        Command::Settings(args) => settings(tracker, args.command.unwrap_or(SettingsCommand::Show)),
    }
}

fn add(tracker: &mut Tracker<FileStore>, config: &AppConfig, args: AddArgs) -> Result<()> {
    let date = match args.date {
        Some(date) => date,
        None => config.today()?.format("%Y-%m-%d").to_string(),
    };
    let valid = RecordDraft {
        description: args.description,
        amount: args.amount,
        category: args.category,
        date,
    }
    .validate()?;

    let id = tracker.add_record(valid, Utc::now())?;
    println!("added {id}");
    Ok(())
}

fn edit(tracker: &mut Tracker<FileStore>, args: EditArgs) -> Result<()> {
    let current = tracker
        .record(&args.id)
        .ok_or_else(|| AppError::Usage(format!("no record with id {}", args.id)))?;

    let valid = RecordDraft {
        description: args.description.unwrap_or_else(|| current.description.clone()),
        amount: args.amount.unwrap_or_else(|| current.amount.to_string()),
        category: args.category.unwrap_or_else(|| current.category.clone()),
        date: args.date.unwrap_or_else(|| current.date.clone()),
    }
    .validate()?;

    let id = tracker.edit_record(&args.id, valid, Utc::now())?;
    println!("updated {id}");
    Ok(())
}

fn delete(tracker: &mut Tracker<FileStore>, args: DeleteArgs) -> Result<()> {
    if tracker.record(&args.id).is_none() {
        println!("no record with id {}", args.id);
        return Ok(());
    }
    if !args.yes && !prompt::confirm("Are you sure you want to delete this record?")? {
        println!("kept {}", args.id);
        return Ok(());
    }

    tracker.delete_record(&args.id)?;
    println!("deleted {}", args.id);
    Ok(())
}

fn list(tracker: &mut Tracker<FileStore>, args: ListArgs) -> Result<()> {
    if let Some(key) = args.sort {
        let order = if args.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        tracker.sort_records(key.into(), order)?;
    }

    let pattern = args
        .search
        .as_deref()
        .and_then(|pattern| SearchPattern::compile(pattern, !args.case_sensitive));
    print!(
        "{}",
        render::records_table(
            tracker.records(),
            tracker.settings(),
            pattern.as_ref(),
            args.only_matches
        )
    );
    Ok(())
}

fn export(tracker: &Tracker<FileStore>, args: ExportArgs) -> Result<()> {
    let (payload, default_path) = match args.format {
        ExportFormat::Json => (tracker.export_json()?, EXPORT_FILE_NAME.to_string()),
        ExportFormat::Csv => (
            tracker.export_csv()?,
            EXPORT_FILE_NAME.replace(".json", ".csv"),
        ),
    };
    let path = args.output.unwrap_or(default_path);
    fs::write(&path, payload)?;
    println!("exported {} records to {path}", tracker.records().len());
    Ok(())
}

fn settings(tracker: &mut Tracker<FileStore>, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {}
        SettingsCommand::Category { command } => match command {
            CategoryCommand::Add { name } => {
                if !tracker.add_category(&name)? {
                    println!("category {} already exists", name.trim());
                }
            }
            CategoryCommand::Remove { name } => tracker.remove_category(&name)?,
        },
        SettingsCommand::Currency { command } => match command {
            CurrencyCommand::Add { code, rate } => {
                tracker.add_currency(&code, rate)?;
            }
            CurrencyCommand::Remove { code } => {
                tracker.remove_currency(&code.trim().to_ascii_uppercase())?;
            }
            CurrencyCommand::Rate { code, rate } => {
                tracker.set_currency_rate(&code.trim().to_ascii_uppercase(), rate)?;
            }
        },
        SettingsCommand::Display { code } => tracker.set_display_currency(&code)?,
        SettingsCommand::Cap { amount } => {
            let cap: Money = amount.parse()?;
            tracker.set_monthly_cap(cap)?;
        }
    }

    print!("{}", render::settings_view(tracker.settings()));
    Ok(())
}
