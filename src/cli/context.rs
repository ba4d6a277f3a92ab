//! Per-invocation session: workspace, config, store and translator

use chrono::{Local, NaiveDate};
use miette::Result;
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::i18n::{Locale, Translator};
use crate::core::identity::EntityPrefix;
use crate::core::storage::{Storage, LOCALE_KEY};
use crate::core::store::Store;
use crate::core::{Config, Workspace};

pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub store: Store,
    pub tr: Translator,
    pub today: NaiveDate,
}

impl Session {
    /// Discover the workspace and open its store
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace =
            Workspace::locate(global.workspace.as_deref()).map_err(|e| miette::miette!("{}", e))?;
        let config = Config::load(Some(&workspace));
        let storage =
            Storage::load(&workspace.storage_path()).map_err(|e| miette::miette!("{}", e))?;

        let locale = resolve_locale(global, &storage, &config);
        let today = Local::now().date_naive();
        let store = Store::open(storage, today).map_err(|e| miette::miette!("{}", e))?;
        let tr = Translator::new(locale).map_err(|e| miette::miette!("{}", e))?;

        debug!(root = %workspace.root().display(), %locale, "opened session");
        Ok(Self {
            workspace,
            config,
            store,
            tr,
            today,
        })
    }

    /// Resolve the effective output format for a command
    ///
    /// An explicit `--format` wins, then the configured default, then `fallback`.
    pub fn format(&self, global: &GlobalOpts, fallback: OutputFormat) -> OutputFormat {
        resolve_format(global.format, self.config.default_format.as_deref(), fallback)
    }

    /// Resolve a user reference to a full ID
    pub fn resolve(&self, kind: EntityPrefix, reference: &str) -> Result<String> {
        self.store
            .resolve(kind, reference)
            .map_err(|e| miette::miette!("{}", e))
    }

    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.tr.t(key)
    }
}

pub fn resolve_locale(global: &GlobalOpts, storage: &Storage, config: &Config) -> Locale {
    let env = std::env::var("MPT_LOCALE").ok();
    Locale::resolve(
        global.lang,
        env.as_deref(),
        storage.get(LOCALE_KEY),
        config.locale.as_deref(),
    )
}

pub fn resolve_format(
    requested: OutputFormat,
    configured: Option<&str>,
    fallback: OutputFormat,
) -> OutputFormat {
    if requested != OutputFormat::Auto {
        return requested;
    }
    match configured.and_then(|f| f.parse::<OutputFormat>().ok()) {
        Some(OutputFormat::Auto) | None => fallback,
        Some(format) => format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_format_wins() {
        assert_eq!(
            resolve_format(OutputFormat::Json, Some("csv"), OutputFormat::Table),
            OutputFormat::Json
        );
    }

    #[test]
    fn test_configured_format_before_fallback() {
        assert_eq!(
            resolve_format(OutputFormat::Auto, Some("md"), OutputFormat::Table),
            OutputFormat::Md
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, Some("nonsense"), OutputFormat::Table),
            OutputFormat::Table
        );
        assert_eq!(
            resolve_format(OutputFormat::Auto, None, OutputFormat::Id),
            OutputFormat::Id
        );
    }
}
