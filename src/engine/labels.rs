//! Localized display strings: bucket headers, priority names, deadlines.

use super::pipeline::BucketKind;
use super::types::{Language, Priority};
use chrono::{DateTime, Locale, NaiveDate, NaiveTime, TimeZone, Utc};
use std::fmt::Display;

struct Strings {
    no_deadline: &'static str,
    today: &'static str,
    tomorrow: &'static str,
    high: &'static str,
    medium: &'static str,
    low: &'static str,
    empty: &'static str,
}

const EN: Strings = Strings {
    no_deadline: "No deadline",
    today: "Today",
    tomorrow: "Tomorrow",
    high: "High",
    medium: "Medium",
    low: "Low",
    empty: "No tasks",
};

const UA: Strings = Strings {
    no_deadline: "Без дедлайну",
    today: "Сьогодні",
    tomorrow: "Завтра",
    high: "Високий",
    medium: "Середній",
    low: "Низький",
    empty: "Немає задач",
};

const PL: Strings = Strings {
    no_deadline: "Bez terminu",
    today: "Dzisiaj",
    tomorrow: "Jutro",
    high: "Wysoki",
    medium: "Średni",
    low: "Niski",
    empty: "Brak zadań",
};

const DE: Strings = Strings {
    no_deadline: "Keine Frist",
    today: "Heute",
    tomorrow: "Morgen",
    high: "Hoch",
    medium: "Mittel",
    low: "Niedrig",
    empty: "Keine Aufgaben",
};

/// Display strings for one language.
///
/// Languages without a string table fall back to English; calendar names
/// come from chrono's locale data for every supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Labels {
    language: Language,
}

impl Labels {
    #[must_use]
    pub fn for_language(language: Language) -> Self {
        Self { language }
    }

    fn strings(&self) -> &'static Strings {
        match self.language {
            Language::Ua => &UA,
            Language::Pl => &PL,
            Language::De => &DE,
            _ => &EN,
        }
    }

    #[must_use]
    pub fn bucket(&self, kind: BucketKind) -> String {
        match kind {
            BucketKind::NoDeadline => self.strings().no_deadline.to_string(),
            BucketKind::Today => self.strings().today.to_string(),
            BucketKind::Tomorrow => self.strings().tomorrow.to_string(),
            BucketKind::Day(date) => self.day(date),
        }
    }

    /// Weekday, day of month and month name, e.g. "Tuesday, 20 October".
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> String {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .format_localized("%A, %-d %B", chrono_locale(self.language))
            .to_string()
    }

    #[must_use]
    pub fn priority(&self, priority: Priority) -> &'static str {
        let s = self.strings();
        match priority {
            Priority::High => s.high,
            Priority::Medium => s.medium,
            Priority::Low => s.low,
        }
    }

    #[must_use]
    pub fn empty(&self) -> &'static str {
        self.strings().empty
    }

    /// Short deadline for list rows: "Today, 18:00", "Tomorrow, 09:00",
    /// otherwise "5 Nov, 14:30".
    #[must_use]
    pub fn deadline<Tz: TimeZone>(&self, deadline: DateTime<Utc>, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let local = deadline.with_timezone(&now.timezone());
        let today = now.date_naive();
        let time = local.format("%H:%M");
        match local.date_naive() {
            d if d == today => format!("{}, {time}", self.strings().today),
            d if Some(d) == today.succ_opt() => format!("{}, {time}", self.strings().tomorrow),
            _ => local
                .format_localized("%-d %b, %H:%M", chrono_locale(self.language))
                .to_string(),
        }
    }
}

fn chrono_locale(language: Language) -> Locale {
    match language {
        Language::En => Locale::en_US,
        Language::Ua => Locale::uk_UA,
        Language::Pl => Locale::pl_PL,
        Language::De => Locale::de_DE,
        Language::Es => Locale::es_ES,
        Language::Fr => Locale::fr_FR,
        Language::It => Locale::it_IT,
        Language::Pt => Locale::pt_PT,
        Language::Tr => Locale::tr_TR,
        Language::Zh => Locale::zh_CN,
        Language::Ja => Locale::ja_JP,
        Language::Ko => Locale::ko_KR,
        Language::Sv => Locale::sv_SE,
        Language::Ar => Locale::ar_SA,
    }
}
