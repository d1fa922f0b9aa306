use crate::models::StudentDraft;
use serde::Deserialize;

/// Edit buffer behind the entry form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub birth_date: String,
}

impl StudentForm {
    pub fn is_complete(&self) -> bool {
        !self.full_name.is_empty() && !self.class_name.is_empty() && !self.birth_date.is_empty()
    }

    /// Hands out a draft and clears the buffer, or leaves everything as is
    /// when a field is missing.
    pub fn submit(&mut self) -> Option<StudentDraft> {
        if !self.is_complete() {
            return None;
        }

        let form = std::mem::take(self);
        Some(StudentDraft {
            full_name: form.full_name,
            class_name: form.class_name,
            birth_date: form.birth_date,
        })
    }
}
