//! Phone-prefix locale resolution.
//!
//! A WhatsApp address looks like `whatsapp:+393331234567`. The embedded
//! number's international dialing prefix picks the language the reply
//! should be written in and the locale tag the surrounding system stores.
//! Lookup is longest-prefix-first over 4, 3 and 2 characters (the `+`
//! included), falling back to configured defaults.

use std::collections::HashMap;

use parlo_core::config::LocaleConfig;

/// Built-in dialing prefix → language name.
const PREFIX_LANGUAGES: &[(&str, &str)] = &[
    ("+1", "English"),
    ("+7", "Russian"),
    ("+20", "Arabic"),
    ("+27", "English"),
    ("+30", "Greek"),
    ("+31", "Dutch"),
    ("+32", "Dutch"),
    ("+33", "French"),
    ("+34", "Spanish"),
    ("+36", "Hungarian"),
    ("+39", "Italian"),
    ("+40", "Romanian"),
    ("+41", "German"),
    ("+44", "English"),
    ("+45", "Danish"),
    ("+46", "Swedish"),
    ("+47", "Norwegian"),
    ("+48", "Polish"),
    ("+49", "German"),
    ("+51", "Spanish"),
    ("+52", "Spanish"),
    ("+53", "Spanish"),
    ("+54", "Spanish"),
    ("+55", "Portuguese"),
    ("+56", "Spanish"),
    ("+57", "Spanish"),
    ("+58", "Spanish"),
    ("+60", "English"),
    ("+61", "English"),
    ("+62", "Indonesian"),
    ("+63", "Filipino"),
    ("+64", "English"),
    ("+65", "Mandarin"),
    ("+66", "Thai"),
    ("+81", "Japanese"),
    ("+82", "Korean"),
    ("+84", "Vietnamese"),
    ("+86", "Chinese"),
    ("+90", "Turkish"),
    ("+91", "Hindi"),
    ("+92", "Urdu"),
    ("+93", "Pashto"),
    ("+94", "Sinhala"),
    ("+95", "Burmese"),
    ("+98", "Persian"),
    ("+212", "Arabic"),
    ("+213", "Arabic"),
    ("+216", "Arabic"),
    ("+218", "Arabic"),
    ("+220", "English"),
    ("+221", "French"),
    ("+222", "Arabic"),
    ("+223", "French"),
    ("+234", "English"),
    ("+250", "Kinyarwanda"),
    ("+251", "Amharic"),
    ("+254", "Swahili"),
    ("+255", "Swahili"),
    ("+256", "Swahili"),
    ("+260", "English"),
    ("+263", "English"),
];

/// Built-in dialing prefix → locale tag.
const PREFIX_LOCALES: &[(&str, &str)] = &[
    ("+1", "en-US"),
    ("+7", "ru-RU"),
    ("+33", "fr-FR"),
    ("+34", "es-ES"),
    ("+39", "it-IT"),
    ("+44", "en-GB"),
    ("+49", "de-DE"),
    ("+82", "ko-KR"),
    ("+351", "pt-PT"),
];

/// Prefix lengths tried, longest first.
const PREFIX_LENGTHS: [usize; 3] = [4, 3, 2];

/// Immutable prefix tables plus the defaults returned on a miss.
///
/// Built once from [`LocaleConfig`] and shared by reference.
#[derive(Clone, Debug)]
pub struct PhonePrefixTable {
    address_prefix: String,
    locales: HashMap<String, String>,
    languages: HashMap<String, String>,
    default_locale: String,
    default_language: String,
}

impl Default for PhonePrefixTable {
    fn default() -> Self {
        Self::from_config(&LocaleConfig::default())
    }
}

impl PhonePrefixTable {
    /// Built-in tables with the config's extra entries merged on top.
    pub fn from_config(config: &LocaleConfig) -> Self {
        Self {
            address_prefix: config.address_prefix.clone(),
            locales: merge(PREFIX_LOCALES, &config.extra_locales),
            languages: merge(PREFIX_LANGUAGES, &config.extra_languages),
            default_locale: config.default_locale.clone(),
            default_language: config.default_language.clone(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// The phone number embedded in `address`.
    ///
    /// Accepts `<prefix>+NNN...` or a bare `+NNN...`; anything else has no
    /// number.
    pub fn phone_number<'a>(&self, address: &'a str) -> Option<&'a str> {
        let address = address.trim();
        let number = if self.address_prefix.is_empty() {
            address
        } else {
            address.strip_prefix(self.address_prefix.as_str()).unwrap_or(address)
        };
        number.starts_with('+').then_some(number)
    }

    /// Locale tag for `address`, or the default locale.
    pub fn resolve_locale(&self, address: &str) -> &str {
        self.lookup(&self.locales, address)
            .unwrap_or(self.default_locale.as_str())
    }

    /// Language name for `address`, or the default language.
    pub fn resolve_language(&self, address: &str) -> &str {
        self.lookup(&self.languages, address)
            .unwrap_or(self.default_language.as_str())
    }

    fn lookup<'t>(&self, table: &'t HashMap<String, String>, address: &str) -> Option<&'t str> {
        let number = self.phone_number(address)?;
        PREFIX_LENGTHS.iter().find_map(|&len| {
            let prefix = char_prefix(number, len)?;
            table.get(prefix).map(String::as_str)
        })
    }
}

/// The first `len` chars of `s`, if it has that many.
fn char_prefix(s: &str, len: usize) -> Option<&str> {
    match s.char_indices().nth(len) {
        Some((end, _)) => Some(&s[..end]),
        None if s.chars().count() == len => Some(s),
        None => None,
    }
}

fn merge(builtin: &[(&str, &str)], extra: &HashMap<String, String>) -> HashMap<String, String> {
    let mut table: HashMap<String, String> = builtin
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    table.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    table
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
