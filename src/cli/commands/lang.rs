//! `mpt lang` command - Show or change the interface language

use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::{GlobalOpts, OutputFormat, Session};
use crate::core::i18n::{Locale, Translator};
use crate::core::storage::LOCALE_KEY;

#[derive(clap::Args, Debug)]
pub struct LangArgs {
    /// Language to switch to (ar, en); omit to show the current one
    pub locale: Option<Locale>,
}

pub fn run(args: LangArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let Some(locale) = args.locale else {
        let current = session.tr.locale();
        match global.format {
            OutputFormat::Json => println!(
                "{}",
                json!({ "locale": current.code(), "direction": current.direction().to_string() })
            ),
            _ => println!(
                "{} ({}, {})",
                session.tr.locale_name(current),
                current.code(),
                current.direction()
            ),
        }
        return Ok(());
    };

    let storage = session.store.storage_mut();
    storage.set(LOCALE_KEY, locale.code());
    storage.save().map_err(|e| miette::miette!("{}", e))?;
    tracing::info!(%locale, "saved locale preference");

    if !global.quiet {
        let tr = Translator::new(locale).map_err(|e| miette::miette!("{}", e))?;
        println!(
            "{} {} {}",
            style("✓").green(),
            tr.t("language_changed"),
            style(tr.locale_name(locale)).cyan()
        );
    }
    Ok(())
}
