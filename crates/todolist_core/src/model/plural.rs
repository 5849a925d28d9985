//! Pluralized task counters for list footers.
//!
//! Follows the Russian rule set used across the app copy: 11..=14 always
//! take the genitive plural, otherwise the last digit decides.

/// Plural form of the word "task".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TasksWord {
    /// 1, 21, 101, ...
    One,
    /// 2..=4, 22..=24, ...
    Few,
    /// 0, 5..=20, 25..=30, ...
    Many,
}

impl TasksWord {
    pub fn for_count(count: i64) -> Self {
        let abs_count = count.unsigned_abs();
        let last_two_digits = abs_count % 100;
        let last_digit = abs_count % 10;

        if (11..=14).contains(&last_two_digits) {
            return Self::Many;
        }

        match last_digit {
            1 => Self::One,
            2..=4 => Self::Few,
            _ => Self::Many,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "задача",
            Self::Few => "задачи",
            Self::Many => "задач",
        }
    }
}

/// Renders `"{count} {word}"`, e.g. `"3 задачи"`.
pub fn tasks_count_label(count: i64) -> String {
    format!("{count} {}", TasksWord::for_count(count).as_str())
}
