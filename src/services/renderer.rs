//! Announcement text for the plan channel.

use crate::error::AppError;
use crate::models::{LessonRow, TableInformation};
use crate::services::roles::ClassRoleLookup;

const NO_DATA: &str = "_Keine Angabe_";

/// Renders a parsed plan into the announcement posted to the channel.
pub struct ScheduleRenderer<'a, R: ClassRoleLookup + ?Sized> {
    roles: &'a R,
}

impl<'a, R: ClassRoleLookup + ?Sized> ScheduleRenderer<'a, R> {
    pub fn new(roles: &'a R) -> Self {
        Self { roles }
    }

    pub fn render(&self, plan: &TableInformation) -> String {
        let time = &plan.time_info;
        let service = &plan.proper_service;

        let mut sections = vec![
            format!(
                "Vertretungsplan für {}, den {}.{} {}-Woche",
                time.day_name, time.day_numerical, time.month_numerical, time.week
            ),
            format!(
                "Ordnungsdienste:\n    - Diese Woche: {}\n    - Nächste Woche: {}",
                self.service_info(&service.class_this_week, &service.teacher_this_week),
                self.service_info(&service.class_next_week, &service.teacher_next_week),
            ),
            format!("Aufstuhlung: {}", self.chair_info(plan)),
        ];

        if !plan.extra_text.is_empty() {
            sections.push(format!("__{}__", plan.extra_text));
        }

        let lessons = plan
            .lessons
            .iter()
            .map(|row| self.lesson_line(row))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Vertretungen:\n{lessons}"));

        sections.push(format!(
            "Zuletzt aktualisiert: <t:{}:R>",
            plan.processed_at.timestamp()
        ));

        sections.join("\n\n")
    }

    fn service_info(&self, class: &str, teacher: &str) -> String {
        let class = if class.is_empty() {
            String::new()
        } else {
            self.roles.mention(class)
        };
        match (class.is_empty(), teacher.is_empty()) {
            (true, true) => NO_DATA.to_string(),
            (true, false) => teacher.to_string(),
            (false, true) => class,
            (false, false) => format!("{class} mit {teacher}"),
        }
    }

    fn chair_info(&self, plan: &TableInformation) -> String {
        let chair = &plan.chair_service;
        if chair.subject.is_empty() || chair.class.is_empty() {
            return self.service_info(&chair.class, &chair.teacher);
        }
        let class = format!("{} nach {}", self.roles.mention(&chair.class), chair.subject);
        if chair.teacher.is_empty() {
            class
        } else {
            format!("{class} mit {}", chair.teacher)
        }
    }

    fn lesson_line(&self, row: &LessonRow) -> String {
        let classes = row
            .class_names()
            .map(|c| self.roles.mention(c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut line = format!(
            "{classes} {} {} mit {}",
            row.lessons, row.new_subject, row.new_teacher
        );
        if !row.room.is_empty() {
            line.push_str(" in ");
            line.push_str(&row.room);
        }
        if !row.info.is_empty() {
            line.push_str(" => ");
            line.push_str(&row.info);
        }
        line
    }
}

/// Announcement shown instead of the plan when a cycle failed.
pub fn render_error(error: &AppError) -> String {
    format!("Fehler beim Laden des Vertretungsplans:\n```\n{error}\n```")
}
