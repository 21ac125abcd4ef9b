//! Line-oriented parser for the substitution plan text.
//!
//! The extracted document text has no reliable structure beyond the order of
//! its lines, so the parser walks them with an explicit state machine. Each
//! step looks at one line and returns the next state together with whether
//! the line was consumed; an unconsumed line is examined again in the next
//! state.
//!
//! Parsing never fails. Lines that do not fit leave fields blank or end up in
//! the free-text fields instead.

mod duty;
mod header;

use crate::models::{LessonRow, TableInformation};

use duty::{
    CHAIR_SERVICE_PREFIX, PROPER_SERVICE_PREFIX, extract_service_class, parse_chair_service,
};
use header::{HEADER_PREFIX, YEAR_PREFIX, parse_header, parse_years};

const ABSENT_TEACHERS_LINE: &str = "Abwesende Lehrer:";
const TABLE_HEADER_LINE: &str = "Stunde";
const TABLE_START_LINES: [&str; 2] = ["Vertretungs-Text", "Text"];
/// School footer printed at the bottom of every page.
const PAGE_FOOTER: &str = "Humboldt-Gymnasium Potsdam";
/// Rooms without a digit in second position.
const NAMED_ROOMS: [&str; 5] = ["SH1", "SH2", "ext", "Aula", "---"];

/// What the parser expects to read next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    YearInfo,
    Header,
    ProperService,
    ChairService,
    ExtraText,
    AbsentTeachers,
    UnneededBeforeLessons,
    Lessons,
    Classes,
    OrigSubject,
    OrigTeacher,
    NewSubject,
    NewTeacher,
    Room,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    next: State,
    consumed: bool,
}

impl Transition {
    fn consume(next: State) -> Self {
        Self {
            next,
            consumed: true,
        }
    }

    fn reexamine(next: State) -> Self {
        Self {
            next,
            consumed: false,
        }
    }
}

/// Substitution plan parser.
pub struct LessonTableParser {
    state: State,
    plan: TableInformation,
    row: LessonRow,
}

impl LessonTableParser {
    fn new() -> Self {
        Self {
            state: State::YearInfo,
            plan: TableInformation::new(),
            row: LessonRow::default(),
        }
    }

    /// Parse trimmed, non-blank text lines into a plan.
    ///
    /// Blank lines are skipped anyway, so unfiltered input is accepted too.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> TableInformation {
        let mut parser = Self::new();
        parser.plan.debug_text = lines.iter().map(|l| l.as_ref().to_string()).collect();

        let mut index = 0;
        while let Some(raw) = lines.get(index) {
            let line = raw.as_ref().trim();
            if line.is_empty() {
                index += 1;
                continue;
            }

            let transition = parser.step(line);
            parser.state = transition.next;
            if transition.consumed {
                index += 1;
            }
        }

        parser.finish()
    }

    fn step(&mut self, line: &str) -> Transition {
        match self.state {
            State::YearInfo => {
                let Some(rest) = line.strip_prefix(YEAR_PREFIX) else {
                    return Transition::consume(State::YearInfo);
                };
                if let Some((one, two)) = parse_years(rest) {
                    self.plan.time_info.year_one = one;
                    self.plan.time_info.year_two = two;
                }
                Transition::consume(State::Header)
            }

            State::Header => {
                let Some(rest) = line.strip_prefix(HEADER_PREFIX) else {
                    return Transition::consume(State::Header);
                };
                let header = parse_header(rest);
                let time = &mut self.plan.time_info;
                time.day_numerical = header.day;
                time.month_numerical = header.month;
                time.day_name = header.day_name.to_string();
                time.week = header.week;
                Transition::consume(State::ProperService)
            }

            State::ProperService => {
                let Some(rest) = line.strip_prefix(PROPER_SERVICE_PREFIX) else {
                    return Transition::reexamine(State::ExtraText);
                };
                let this_week = extract_service_class(rest);
                let next_week = extract_service_class(&this_week.remaining);

                let service = &mut self.plan.proper_service;
                service.class_this_week = this_week.class;
                service.teacher_this_week = this_week.teacher;
                service.class_next_week = next_week.class;
                service.teacher_next_week = next_week.teacher;
                Transition::consume(State::ChairService)
            }

            State::ChairService => {
                let Some(rest) = line.strip_prefix(CHAIR_SERVICE_PREFIX) else {
                    return Transition::reexamine(State::ExtraText);
                };
                if let Some(chair) = parse_chair_service(rest) {
                    self.plan.chair_service = chair;
                }
                Transition::consume(State::ExtraText)
            }

            State::ExtraText => {
                if line == ABSENT_TEACHERS_LINE {
                    return Transition::consume(State::AbsentTeachers);
                }
                if line == TABLE_HEADER_LINE {
                    return Transition::consume(State::UnneededBeforeLessons);
                }
                // The duty lines sometimes come after the announcement text.
                if line.starts_with(CHAIR_SERVICE_PREFIX) {
                    return Transition::reexamine(State::ChairService);
                }
                if line.starts_with(PROPER_SERVICE_PREFIX) {
                    return Transition::reexamine(State::ProperService);
                }

                let extra = &mut self.plan.extra_text;
                if !extra.is_empty() {
                    extra.push('\n');
                }
                extra.push_str(line);
                Transition::consume(State::ExtraText)
            }

            State::AbsentTeachers => {
                self.plan.absent_teachers = line.split(',').map(|s| s.trim().to_string()).collect();
                Transition::consume(State::UnneededBeforeLessons)
            }

            State::UnneededBeforeLessons => {
                if TABLE_START_LINES.contains(&line) {
                    Transition::consume(State::Lessons)
                } else {
                    Transition::consume(State::UnneededBeforeLessons)
                }
            }

            State::Lessons => {
                self.row.lessons = line.to_string();
                Transition::consume(State::Classes)
            }
            State::Classes => {
                self.row.classes = line.to_string();
                Transition::consume(State::OrigSubject)
            }
            State::OrigSubject => {
                self.row.orig_subject = line.to_string();
                Transition::consume(State::OrigTeacher)
            }
            State::OrigTeacher => {
                self.row.orig_teacher = line.to_string();
                Transition::consume(State::NewSubject)
            }

            State::NewSubject => {
                if is_free_text(line) {
                    // Original subject and teacher were left out, so the two
                    // lines read so far are the replacement.
                    self.row.new_subject = std::mem::take(&mut self.row.orig_subject);
                    self.row.new_teacher = std::mem::take(&mut self.row.orig_teacher);
                    return Transition::reexamine(State::Room);
                }
                self.row.new_subject = line.to_string();
                Transition::consume(State::NewTeacher)
            }
            State::NewTeacher => {
                self.row.new_teacher = line.to_string();
                Transition::consume(State::Room)
            }

            State::Room => {
                if !is_room(line) {
                    return Transition::reexamine(State::Info);
                }
                self.row.room = line.to_string();
                Transition::consume(State::Info)
            }

            State::Info => {
                if line.contains(PAGE_FOOTER) {
                    self.finalize_row();
                    return Transition::consume(State::UnneededBeforeLessons);
                }
                if should_finalize(line) {
                    self.finalize_row();
                    return Transition::reexamine(State::Lessons);
                }

                let info = &mut self.row.info;
                if !info.is_empty() {
                    info.push(' ');
                }
                info.push_str(line);
                Transition::consume(State::Info)
            }
        }
    }

    fn finalize_row(&mut self) {
        self.plan.lessons.push(std::mem::take(&mut self.row));
    }

    fn finish(mut self) -> TableInformation {
        // Input ran out while the last row was collecting info.
        if self.state == State::Info {
            self.finalize_row();
        }
        self.plan
    }
}

/// Whether a line seen in the info state starts the next row.
///
/// Info text is anything that does not start with a digit, or anything longer
/// than a lesson slot label.
fn should_finalize(line: &str) -> bool {
    let starts_with_digit = line.chars().next().is_some_and(|c| c.is_ascii_digit());
    starts_with_digit && line.chars().count() <= 5
}

/// Whether a line read as the new subject is really free text.
fn is_free_text(line: &str) -> bool {
    line.chars().count() > 6 && line.contains(char::is_whitespace)
}

fn is_room(line: &str) -> bool {
    line.chars().nth(1).is_some_and(|c| c.is_ascii_digit()) || NAMED_ROOMS.contains(&line)
}
