//! Grammar of the two header lines at the top of each plan page.
//!
//! ```text
//! Stundenplan 2023 - 2024
//! Vertretungsplan Klasse 24.03. / Freitag a
//! ```

use crate::models::Week;

pub(crate) const YEAR_PREFIX: &str = "Stundenplan ";
pub(crate) const HEADER_PREFIX: &str = "Vertretungsplan Klasse";

/// Fields of the "Vertretungsplan Klasse" line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderLine<'a> {
    pub day: u32,
    pub month: u32,
    pub day_name: &'a str,
    pub week: Week,
}

/// Leading decimal digits of `s` as a number, 0 when there are none.
pub(crate) fn leading_number(s: &str) -> u32 {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// School years from the text after [`YEAR_PREFIX`], e.g. `2023 - 2024`.
pub(crate) fn parse_years(rest: &str) -> Option<(u32, u32)> {
    let years: Vec<&str> = rest.split('-').map(str::trim).collect();
    match years.as_slice() {
        [first, second] => Some((leading_number(first), leading_number(second))),
        _ => None,
    }
}

/// Fields from the text after [`HEADER_PREFIX`], e.g. `24.03. / Freitag a`.
///
/// Day runs up to the first dot, month is the number right after it, the
/// weekday is the first word after the slash and the week letter is the last
/// character of the line. Missing pieces come back as 0 / empty / week A.
pub(crate) fn parse_header(rest: &str) -> HeaderLine<'_> {
    let rest = rest.trim();
    let (day, after_day) = rest.split_once('.').unwrap_or((rest, ""));

    let day_name = after_day
        .split_once('/')
        .and_then(|(_, tail)| tail.split_whitespace().next())
        .unwrap_or("");

    let week = rest.chars().last().map(Week::from_letter).unwrap_or_default();

    HeaderLine {
        day: leading_number(day),
        month: leading_number(after_day),
        day_name,
        week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_years_with_spaces() {
        assert_eq!(parse_years("2023 - 2024"), Some((2023, 2024)));
        assert_eq!(parse_years("2023-2024"), Some((2023, 2024)));
        assert_eq!(parse_years("2023"), None);
    }

    #[test]
    fn parses_header_without_trailing_dot() {
        let header = parse_header(" 24.03 / Freitag a");
        assert_eq!(
            header,
            HeaderLine {
                day: 24,
                month: 3,
                day_name: "Freitag",
                week: Week::A,
            }
        );
    }

    #[test]
    fn parses_header_with_trailing_dot() {
        let header = parse_header("5.12. / Dienstag B");
        assert_eq!(header.day, 5);
        assert_eq!(header.month, 12);
        assert_eq!(header.day_name, "Dienstag");
        assert_eq!(header.week, Week::B);
    }

    #[test]
    fn garbage_header_degrades_to_defaults() {
        let header = parse_header("unbekannt");
        assert_eq!(header.day, 0);
        assert_eq!(header.month, 0);
        assert_eq!(header.day_name, "");
        assert_eq!(header.week, Week::A);
    }

    #[test]
    fn leading_number_is_lenient() {
        assert_eq!(leading_number("03 / Freitag"), 3);
        assert_eq!(leading_number(" 12x"), 12);
        assert_eq!(leading_number("x"), 0);
    }
}
