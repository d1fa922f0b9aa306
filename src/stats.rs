use crate::models::{ClassCount, StatsSummary, Student};

pub const PALETTE: [&str; 6] = ["#6366f1", "#8b5cf6", "#ec4899", "#f43f5e", "#f59e0b", "#10b981"];

/// Counts students per class label, in order of first appearance.
pub fn class_stats(students: &[Student]) -> Vec<ClassCount> {
    let mut classes: Vec<ClassCount> = Vec::new();
    for student in students {
        match classes.iter_mut().find(|class| class.name == student.class_name) {
            Some(class) => class.count += 1,
            None => classes.push(ClassCount {
                name: student.class_name.clone(),
                count: 1,
            }),
        }
    }
    classes
}

pub fn build_summary(students: &[Student], classes: &[ClassCount]) -> StatsSummary {
    let total = students.len();
    let class_count = classes.len();
    let average = if total == 0 || class_count == 0 {
        "0".to_string()
    } else {
        format!("{:.1}", total as f64 / class_count as f64)
    };

    StatsSummary {
        total,
        class_count,
        average,
    }
}

pub fn bar_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
}

/// Lays out one bar per class inside a `width` x `height` plot area.
pub fn layout_bars(classes: &[ClassCount], width: f64, height: f64) -> Vec<Bar> {
    let max = classes.iter().map(|class| class.count).max().unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }

    let slot = width / classes.len() as f64;
    let bar_width = (slot * 0.6).min(64.0);
    classes
        .iter()
        .enumerate()
        .map(|(index, class)| {
            let bar_height = height * class.count as f64 / max as f64;
            Bar {
                label: class.name.clone(),
                count: class.count,
                x: slot * index as f64 + (slot - bar_width) / 2.0,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
                color: bar_color(index),
            }
        })
        .collect()
}
