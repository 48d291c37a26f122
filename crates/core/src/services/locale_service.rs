use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Display languages the dashboard renders in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Language {
    /// The other language — rotation and the manual switch both just flip.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Ar,
            Language::Ar => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Eastern Arabic-Indic digit glyphs, indexed by the ASCII digit value.
const EASTERN_ARABIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Maps already-stringified values into a language's digit glyphs.
///
/// Stateless and pure: it never parses or re-parses a number, it only
/// substitutes digit characters. Callers pre-format decimals (e.g. with
/// `format!("{:.2}")`) before handing the string over.
pub struct LocaleService;

impl LocaleService {
    pub fn new() -> Self {
        Self
    }

    /// Substitute ASCII digits 0-9 with Eastern Arabic-Indic glyphs when the
    /// language is Arabic; every non-digit character (decimal point, minus
    /// sign, spaces) passes through unchanged. For any other language the
    /// input is returned as-is.
    pub fn localize_digits(&self, text: &str, language: Language) -> String {
        if language != Language::Ar {
            return text.to_string();
        }
        text.chars()
            .map(|c| {
                if c.is_ascii_digit() {
                    EASTERN_ARABIC_DIGITS[(c as u8 - b'0') as usize]
                } else {
                    c
                }
            })
            .collect()
    }

    /// Stringify a value and localize its digits.
    pub fn format_number(&self, value: impl std::fmt::Display, language: Language) -> String {
        self.localize_digits(&value.to_string(), language)
    }
}

impl Default for LocaleService {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellable repeating task that flips the shared display language on a
/// fixed period. Runs independently of the price pipeline; its only shared
/// state is the `Language` cell.
pub struct LanguageRotator {
    handle: Option<JoinHandle<()>>,
}

impl LanguageRotator {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Restart rotation with the given configuration. Disabled or zero
    /// intervals just cancel. Must be called from within a tokio runtime
    /// when enabling.
    pub fn apply(&mut self, language: Arc<RwLock<Language>>, enabled: bool, interval_secs: u64) {
        self.cancel();
        if !enabled || interval_secs == 0 {
            return;
        }

        let period = Duration::from_secs(interval_secs);
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first interval tick fires immediately; swallow it so the
            // first flip happens a full period after enabling.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut lang = language.write().unwrap_or_else(|e| e.into_inner());
                *lang = lang.toggle();
            }
        }));
        log::debug!("language rotation enabled every {interval_secs}s");
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("language rotation cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for LanguageRotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LanguageRotator {
    fn drop(&mut self) {
        self.cancel();
    }
}
