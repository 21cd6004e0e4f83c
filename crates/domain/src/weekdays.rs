// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use time::Weekday;

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// A set of weekdays drawn from the fixed `Mon..Sun` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet {
    /// Bit `n` is set when the weekday `n` days after Monday is selected.
    bits: u8,
}

impl WeekdaySet {
    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Creates a set from the given weekdays. Duplicates are ignored.
    #[must_use]
    pub fn from_weekdays(weekdays: &[Weekday]) -> Self {
        weekdays
            .iter()
            .fold(Self::empty(), |set, weekday| set.with(*weekday))
    }

    /// Parses a list of weekday symbols such as `["Mon", "wed", "FRI"]`.
    ///
    /// Both the three-letter symbol and the full English name are accepted,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidWeekday` for the first unrecognized symbol.
    pub fn parse_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self, DomainError> {
        symbols.iter().try_fold(Self::empty(), |set, symbol| {
            Ok(set.with(parse_weekday(symbol.as_ref())?))
        })
    }

    /// Returns a copy of this set with `weekday` added.
    #[must_use]
    pub const fn with(self, weekday: Weekday) -> Self {
        Self {
            bits: self.bits | bit(weekday),
        }
    }

    /// Checks whether `weekday` is selected.
    #[must_use]
    pub const fn contains(&self, weekday: Weekday) -> bool {
        self.bits & bit(weekday) != 0
    }

    /// Returns whether no weekday is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the number of selected weekdays.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.bits.count_ones()
    }

    /// Returns the selected weekdays, Monday first.
    #[must_use]
    pub fn weekdays(&self) -> Vec<Weekday> {
        ALL_WEEKDAYS
            .iter()
            .copied()
            .filter(|weekday| self.contains(*weekday))
            .collect()
    }

    /// Returns the selected weekdays as three-letter symbols, Monday first.
    #[must_use]
    pub fn symbols(&self) -> Vec<&'static str> {
        self.weekdays().into_iter().map(symbol).collect()
    }
}

const fn bit(weekday: Weekday) -> u8 {
    1 << weekday.number_days_from_monday()
}

const fn symbol(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, DomainError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Monday),
        "tue" | "tuesday" => Ok(Weekday::Tuesday),
        "wed" | "wednesday" => Ok(Weekday::Wednesday),
        "thu" | "thursday" => Ok(Weekday::Thursday),
        "fri" | "friday" => Ok(Weekday::Friday),
        "sat" | "saturday" => Ok(Weekday::Saturday),
        "sun" | "sunday" => Ok(Weekday::Sunday),
        _ => Err(DomainError::InvalidWeekday(value.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_is_case_insensitive() {
        let set: WeekdaySet = WeekdaySet::parse_symbols(&["MON", "wed", "Friday"]).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(Weekday::Monday));
        assert!(set.contains(Weekday::Wednesday));
        assert!(set.contains(Weekday::Friday));
        assert!(!set.contains(Weekday::Sunday));
    }

    #[test]
    fn test_parse_symbols_ignores_duplicates() {
        let set: WeekdaySet = WeekdaySet::parse_symbols(&["Mon", "mon", "Monday"]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_symbols_rejects_unknown() {
        let result = WeekdaySet::parse_symbols(&["Mon", "Funday"]);
        assert_eq!(result, Err(DomainError::InvalidWeekday(String::from("Funday"))));
    }

    #[test]
    fn test_symbols_are_monday_first() {
        let set: WeekdaySet = WeekdaySet::from_weekdays(&[Weekday::Sunday, Weekday::Monday]);
        assert_eq!(set.symbols(), vec!["Mon", "Sun"]);
    }
}
