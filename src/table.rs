use crate::models::Student;
use chrono::{DateTime, FixedOffset, NaiveDate};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that cannot appear raw inside one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Case-insensitive substring match on name or class, order preserved.
pub fn filter_students<'a>(students: &'a [Student], query: &str) -> Vec<&'a Student> {
    let needle = query.to_lowercase();
    students
        .iter()
        .filter(|student| {
            student.full_name.to_lowercase().contains(&needle)
                || student.class_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Removes the record with `id`, returning whether one was found.
pub fn remove_student(students: &mut Vec<Student>, id: &str) -> bool {
    let before = students.len();
    students.retain(|student| student.id != id);
    students.len() != before
}

pub fn avatar_initial(full_name: &str) -> String {
    full_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_default()
}

/// Form action that deletes the record with `id`.
pub fn delete_action(id: &str) -> String {
    format!("/students/{}/delete", utf8_percent_encode(id, PATH_SEGMENT))
}

/// Renders a stored date as `dd/mm/yyyy`; unparseable text is shown as is.
/// Timestamps are shifted into `offset` first, so a sheet cell holding local
/// midnight as UTC lands on the right day.
pub fn display_date(value: &str, offset: FixedOffset) -> String {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp
            .with_timezone(&offset)
            .date_naive()
            .format("%d/%m/%Y")
            .to_string();
    }
    value.to_string()
}
