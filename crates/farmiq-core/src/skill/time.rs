//! Built-in time skill.
//!
//! Exposes the current date and time in a few human-readable formats so
//! prompts can reference "today".

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

use farmiq_types::error::SkillError;
use farmiq_types::skill::SkillFunction;

use super::{Skill, SkillContext, function_not_found};

/// Registered name of the time skill.
pub const TIME_SKILL: &str = "time";

const FUNCTIONS: &[(&str, &str)] = &[
    ("date", "Get the current date"),
    ("today", "Get the current date"),
    ("now", "Get the current date and time in the local time zone"),
    ("utc_now", "Get the current UTC date and time"),
    ("time", "Get the current time"),
    ("year", "Get the current year"),
    ("month", "Get the current month name"),
    ("day", "Get the current day of the month"),
    ("day_of_week", "Get the current day of the week"),
    ("hour", "Get the current clock hour"),
    ("minute", "Get the minutes on the current hour"),
];

pub struct TimeSkill {
    clock: fn() -> DateTime<Utc>,
    offset: FixedOffset,
}

impl TimeSkill {
    /// Time skill reading the system clock in the local time zone.
    pub fn new() -> Self {
        Self {
            clock: Utc::now,
            offset: Local::now().offset().fix(),
        }
    }

    /// Time skill with an injected clock and zone, for deterministic output.
    pub fn with_clock(clock: fn() -> DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// Render `function` for the given instant, or `None` for an unknown name.
    pub fn render(&self, function: &str, now: DateTime<Utc>) -> Option<String> {
        let local = now.with_timezone(&self.offset);
        let text = match function {
            "date" | "today" => local.format("%A, %B %-d, %Y").to_string(),
            "now" => local.format("%A, %B %-d, %Y %-I:%M %p").to_string(),
            "utc_now" => now.format("%A, %B %-d, %Y %-I:%M %p").to_string(),
            "time" => local.format("%-I:%M:%S %p").to_string(),
            "year" => local.format("%Y").to_string(),
            "month" => local.format("%B").to_string(),
            "day" => local.format("%d").to_string(),
            "day_of_week" => local.format("%A").to_string(),
            "hour" => local.format("%-I %p").to_string(),
            "minute" => local.format("%M").to_string(),
            _ => return None,
        };
        Some(text)
    }
}

impl Default for TimeSkill {
    fn default() -> Self {
        Self::new()
    }
}

impl Skill for TimeSkill {
    fn name(&self) -> &str {
        TIME_SKILL
    }

    fn description(&self) -> &str {
        "Current date and time"
    }

    fn functions(&self) -> Vec<SkillFunction> {
        FUNCTIONS
            .iter()
            .map(|(name, description)| SkillFunction::simple(name, description))
            .collect()
    }

    async fn invoke(
        &self,
        function: &str,
        _context: &SkillContext<'_>,
    ) -> Result<String, SkillError> {
        self.render(function, (self.clock)())
            .ok_or_else(|| function_not_found(self.name(), function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 1, 12, 15, 4, 9).unwrap()
    }

    fn skill(offset_hours: i32) -> TimeSkill {
        TimeSkill::with_clock(fixed_clock, FixedOffset::east_opt(offset_hours * 3600).unwrap())
    }

    #[test]
    fn test_render_date_parts() {
        let skill = skill(0);
        let now = fixed_clock();
        assert_eq!(skill.render("date", now).unwrap(), "Sunday, January 12, 2031");
        assert_eq!(skill.render("today", now).unwrap(), "Sunday, January 12, 2031");
        assert_eq!(skill.render("year", now).unwrap(), "2031");
        assert_eq!(skill.render("month", now).unwrap(), "January");
        assert_eq!(skill.render("day", now).unwrap(), "12");
        assert_eq!(skill.render("day_of_week", now).unwrap(), "Sunday");
    }

    #[test]
    fn test_render_time_parts() {
        let skill = skill(0);
        let now = fixed_clock();
        assert_eq!(skill.render("time", now).unwrap(), "3:04:09 PM");
        assert_eq!(skill.render("hour", now).unwrap(), "3 PM");
        assert_eq!(skill.render("minute", now).unwrap(), "04");
        assert_eq!(skill.render("now", now).unwrap(), "Sunday, January 12, 2031 3:04 PM");
    }

    #[test]
    fn test_utc_now_ignores_offset() {
        let skill = skill(-10);
        let now = fixed_clock();
        assert_eq!(skill.render("utc_now", now).unwrap(), "Sunday, January 12, 2031 3:04 PM");
        assert_eq!(skill.render("now", now).unwrap(), "Sunday, January 12, 2031 5:04 AM");
    }

    #[test]
    fn test_unknown_function() {
        assert!(skill(0).render("week", fixed_clock()).is_none());
    }

    #[test]
    fn test_functions_listed() {
        let names: Vec<String> = skill(0).functions().into_iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"utc_now".to_string()));
    }
}
