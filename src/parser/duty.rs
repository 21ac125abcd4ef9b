//! Supervision ("Ordnungsdienst") and chair ("Aufstuhlung") duty lines.

use crate::models::ChairService;

pub(crate) const PROPER_SERVICE_PREFIX: &str = "Ordnungsdienst: ";
pub(crate) const CHAIR_SERVICE_PREFIX: &str = "Aufstuhlung Aula & Ei nach dem 4. Block - Klasse ";

const UPCOMING_WEEK_PREFIXES: [&str; 2] = ["Kommende Woche: ", "kommende Woche: "];
const CLASS_MARKER: &str = "Klasse ";
const TUTORIAL_MARKER: &str = "Tutorium ";
const HONORIFICS: [&str; 2] = ["Herr", "Frau"];

/// One class/teacher pair read from a supervision line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ServiceClass {
    pub class: String,
    pub teacher: String,
    /// Text after the `-` separator, holding next week's pair
    pub remaining: String,
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// Read one class/teacher pair.
///
/// ```text
/// Tutorium 11.1 Frau Brandt - Kommende Woche: Tutorium 11.2 Herr Fiebig
/// Klasse 8B / Frau Hintze & Herr Leuer - kommende Woche: Klasse 8L / Frau Starke
/// ```
pub(crate) fn extract_service_class(text: &str) -> ServiceClass {
    let mut line = text.trim();
    if let Some(rest) = UPCOMING_WEEK_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(*prefix))
    {
        line = rest.trim();
    }

    let mut result = ServiceClass::default();

    if let Some(rest) = line.strip_prefix(CLASS_MARKER) {
        let rest = rest.trim();
        // "10B" vs "8B"
        let len = if rest.chars().nth(1).is_some_and(|c| c.is_ascii_digit()) {
            3
        } else {
            2
        };
        result.class = take_chars(rest, len).trim().to_string();
        line = skip_chars(rest, len);
    } else if let Some(rest) = line.strip_prefix(TUTORIAL_MARKER) {
        let rest = rest.trim();
        result.class = take_chars(rest, 4).trim().to_string();
        line = skip_chars(rest, 4);
    }

    let Some(start) = HONORIFICS.iter().filter_map(|h| line.find(*h)).min() else {
        return result;
    };

    // The honorific itself is dropped; only the surname after it is kept.
    let mut words = line[start..].splitn(3, ' ').skip(1);
    result.teacher = words.next().unwrap_or_default().trim().to_string();

    let mut rest = words.next().unwrap_or_default().trim();
    if let Some((_, after)) = rest.split_once('-') {
        rest = after.trim();
    }
    result.remaining = rest.to_string();

    result
}

/// Read the `class - subject - teacher` triple after [`CHAIR_SERVICE_PREFIX`].
pub(crate) fn parse_chair_service(rest: &str) -> Option<ChairService> {
    let fields: Vec<&str> = rest.split('-').map(str::trim).collect();
    match fields.as_slice() {
        [class, subject, teacher, ..] => Some(ChairService {
            class: class.to_string(),
            subject: subject.to_string(),
            teacher: teacher.to_string(),
        }),
        _ => None,
    }
}
