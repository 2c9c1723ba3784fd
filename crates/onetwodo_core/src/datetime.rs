//! Natural-language-ish date and time parsing.
//!
//! Accepted dates: `today`, `tomorrow`/`tmr`, `yesterday`, weekday names,
//! `next <weekday>`, `YYYY-MM-DD`, `DD/MM[/YYYY]`, `DD <month> [YYYY]`,
//! `<month> DD [YYYY]` and offsets such as `+3d` or `+2w`.
//! Accepted times: `HH:MM`, `6pm`, `6:30pm`, `6 pm`, `noon`, `midnight`.
//!
//! Whatever the input leaves out is taken from the caller's default.

use crate::error::AppError;
use time::macros::{format_description, time};
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, Weekday};

const FILLER_WORDS: [&str; 3] = ["at", "on", "by"];
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Current wall-clock time in the local offset, truncated to the minute.
pub fn now_local() -> PrimitiveDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let now = OffsetDateTime::now_utc().to_offset(offset);
    let minute = now.time().replace_second(0).unwrap_or(now.time());
    let minute = minute.replace_nanosecond(0).unwrap_or(minute);
    PrimitiveDateTime::new(now.date(), minute)
}

pub fn format_timestamp(value: PrimitiveDateTime) -> Result<String, AppError> {
    value
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .map_err(|err| AppError::internal(err.to_string()))
}

pub fn parse_timestamp(raw: &str) -> Result<PrimitiveDateTime, AppError> {
    PrimitiveDateTime::parse(
        raw.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    )
    .map_err(|_| AppError::invalid_data(format!("'{raw}' is not a YYYY-MM-DD HH:MM timestamp")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeParser {
    today: Date,
}

impl DateTimeParser {
    pub fn new(today: Date) -> Self {
        Self { today }
    }

    pub fn today(&self) -> Date {
        self.today
    }

    /// Parses `input`, filling the missing date or time from `default`.
    ///
    /// Relative words (`today`, `friday`, `+3d`) are resolved against the
    /// parser's `today`, not against `default`.
    pub fn parse(
        &self,
        input: &str,
        default: PrimitiveDateTime,
    ) -> Result<PrimitiveDateTime, AppError> {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split_whitespace()
            .filter(|token| !FILLER_WORDS.contains(token))
            .collect();
        if tokens.is_empty() {
            return Err(AppError::validation(
                "Date/time is empty; try formats such as 'tomorrow 6pm' or '2026-12-25 09:00'",
            ));
        }

        let mut date = None;
        let mut clock = None;
        let mut index = 0;
        while index < tokens.len() {
            let rest = &tokens[index..];
            if let Some((parsed, used)) = self.match_date(rest, trimmed)? {
                if date.replace(parsed).is_some() {
                    return Err(invalid(trimmed, "more than one date was given"));
                }
                index += used;
            } else if let Some((parsed, used)) = match_time(rest, trimmed)? {
                if clock.replace(parsed).is_some() {
                    return Err(invalid(trimmed, "more than one time was given"));
                }
                index += used;
            } else {
                return Err(invalid(
                    trimmed,
                    &format!("'{}' is not a recognised date or time", rest[0]),
                ));
            }
        }

        Ok(PrimitiveDateTime::new(
            date.unwrap_or(default.date()),
            clock.unwrap_or(default.time()),
        ))
    }

    fn match_date(&self, rest: &[&str], input: &str) -> Result<Option<(Date, usize)>, AppError> {
        let first = rest[0];
        match first {
            "today" => return Ok(Some((self.today, 1))),
            "tomorrow" | "tmr" => return shift(self.today, 1, input).map(|date| Some((date, 1))),
            "yesterday" => return shift(self.today, -1, input).map(|date| Some((date, 1))),
            "next" => {
                return match rest.get(1).and_then(|token| parse_weekday(token)) {
                    Some(weekday) => self
                        .upcoming(weekday, true, input)
                        .map(|date| Some((date, 2))),
                    None => Ok(None),
                };
            }
            _ => {}
        }

        if let Some(weekday) = parse_weekday(first) {
            return self.upcoming(weekday, false, input).map(|date| Some((date, 1)));
        }

        if let Some(days) = parse_offset_days(first) {
            return shift(self.today, days, input).map(|date| Some((date, 1)));
        }

        if is_numeric_group(first, '-', 3) {
            return Date::parse(first, format_description!("[year]-[month]-[day]"))
                .map(|date| Some((date, 1)))
                .map_err(|_| invalid(input, &format!("'{first}' is not a valid calendar date")));
        }

        if is_numeric_group(first, '/', 2) || is_numeric_group(first, '/', 3) {
            return self.slash_date(first, input).map(|date| Some((date, 1)));
        }

        if let (Some(day), Some(month)) = (
            parse_day(first),
            rest.get(1).and_then(|token| parse_month(token)),
        ) {
            let (year, used) = trailing_year(rest.get(2), self.today.year());
            return calendar_date(year, month, day, input).map(|date| Some((date, used)));
        }

        if let (Some(month), Some(day)) = (
            parse_month(first),
            rest.get(1).and_then(|token| parse_day(token)),
        ) {
            let (year, used) = trailing_year(rest.get(2), self.today.year());
            return calendar_date(year, month, day, input).map(|date| Some((date, used)));
        }

        Ok(None)
    }

    fn upcoming(
        &self,
        weekday: Weekday,
        strictly_after: bool,
        input: &str,
    ) -> Result<Date, AppError> {
        let current = i64::from(self.today.weekday().number_days_from_monday());
        let target = i64::from(weekday.number_days_from_monday());
        let mut delta = (target - current).rem_euclid(7);
        if strictly_after && delta == 0 {
            delta = 7;
        }
        shift(self.today, delta, input)
    }

    fn slash_date(&self, token: &str, input: &str) -> Result<Date, AppError> {
        let parts: Vec<&str> = token.split('/').collect();
        let day: u8 = parts[0]
            .parse()
            .map_err(|_| invalid(input, &format!("'{token}' has an invalid day")))?;
        let month: u8 = parts[1]
            .parse()
            .map_err(|_| invalid(input, &format!("'{token}' has an invalid month")))?;
        let month = Month::try_from(month)
            .map_err(|_| invalid(input, &format!("'{token}' has an invalid month")))?;
        let year = match parts.get(2) {
            Some(raw) => {
                let year: i32 = raw
                    .parse()
                    .map_err(|_| invalid(input, &format!("'{token}' has an invalid year")))?;
                if year < 100 { 2000 + year } else { year }
            }
            None => self.today.year(),
        };
        calendar_date(year, month, day, input)
    }
}

fn match_time(rest: &[&str], input: &str) -> Result<Option<(Time, usize)>, AppError> {
    let first = rest[0];
    match first {
        "noon" => return Ok(Some((time!(12:00), 1))),
        "midnight" => return Ok(Some((Time::MIDNIGHT, 1))),
        _ => {}
    }

    if looks_like_clock(first)
        && let Some(meridiem) = rest.get(1).and_then(|token| parse_meridiem(token))
    {
        return parse_clock(first, Some(meridiem), input).map(|clock| Some((clock, 2)));
    }

    for (suffix, meridiem) in [("am", Meridiem::Am), ("pm", Meridiem::Pm)] {
        if let Some(body) = first.strip_suffix(suffix)
            && looks_like_clock(body)
        {
            return parse_clock(body, Some(meridiem), input).map(|clock| Some((clock, 1)));
        }
    }

    if first.contains(':') && looks_like_clock(first) {
        return parse_clock(first, None, input).map(|clock| Some((clock, 1)));
    }

    Ok(None)
}

fn parse_clock(body: &str, meridiem: Option<Meridiem>, input: &str) -> Result<Time, AppError> {
    let (hour_part, minute_part) = body.split_once(':').unwrap_or((body, "0"));
    let hour: u8 = hour_part
        .parse()
        .map_err(|_| invalid(input, &format!("'{body}' has an invalid hour")))?;
    let minute: u8 = minute_part
        .parse()
        .map_err(|_| invalid(input, &format!("'{body}' has an invalid minute")))?;

    let hour = match meridiem {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return Err(invalid(input, "hours must be between 1 and 12 with am/pm"));
            }
            match meridiem {
                Meridiem::Am => hour % 12,
                Meridiem::Pm => hour % 12 + 12,
            }
        }
        None => hour,
    };

    Time::from_hms(hour, minute, 0)
        .map_err(|_| invalid(input, &format!("'{body}' is not a valid time of day")))
}

fn looks_like_clock(token: &str) -> bool {
    !token.is_empty()
        && token.starts_with(|ch: char| ch.is_ascii_digit())
        && token.chars().all(|ch| ch.is_ascii_digit() || ch == ':')
        && token.matches(':').count() <= 1
}

fn parse_meridiem(token: &str) -> Option<Meridiem> {
    match token {
        "am" | "a.m." => Some(Meridiem::Am),
        "pm" | "p.m." => Some(Meridiem::Pm),
        _ => None,
    }
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    match token {
        "mon" | "monday" => Some(Weekday::Monday),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tuesday),
        "wed" | "wednesday" => Some(Weekday::Wednesday),
        "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thursday),
        "fri" | "friday" => Some(Weekday::Friday),
        "sat" | "saturday" => Some(Weekday::Saturday),
        "sun" | "sunday" => Some(Weekday::Sunday),
        _ => None,
    }
}

fn parse_month(token: &str) -> Option<Month> {
    match token {
        "jan" | "january" => Some(Month::January),
        "feb" | "february" => Some(Month::February),
        "mar" | "march" => Some(Month::March),
        "apr" | "april" => Some(Month::April),
        "may" => Some(Month::May),
        "jun" | "june" => Some(Month::June),
        "jul" | "july" => Some(Month::July),
        "aug" | "august" => Some(Month::August),
        "sep" | "sept" | "september" => Some(Month::September),
        "oct" | "october" => Some(Month::October),
        "nov" | "november" => Some(Month::November),
        "dec" | "december" => Some(Month::December),
        _ => None,
    }
}

fn parse_day(token: &str) -> Option<u8> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|day| (1..=31).contains(day))
}

fn trailing_year(token: Option<&&str>, current_year: i32) -> (i32, usize) {
    match token {
        Some(raw) if raw.len() == 4 && raw.chars().all(|ch| ch.is_ascii_digit()) => {
            (raw.parse().unwrap_or(current_year), 3)
        }
        _ => (current_year, 2),
    }
}

fn parse_offset_days(token: &str) -> Option<i64> {
    let body = token.strip_prefix('+')?;
    let unit = body.chars().last()?;
    let count = &body[..body.len() - unit.len_utf8()];
    if count.is_empty() || !count.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let count: i64 = count.parse().ok()?;
    match unit {
        'd' => Some(count),
        'w' => Some(count.saturating_mul(7)),
        _ => None,
    }
}

fn is_numeric_group(token: &str, separator: char, parts: usize) -> bool {
    let pieces: Vec<&str> = token.split(separator).collect();
    pieces.len() == parts
        && pieces
            .iter()
            .all(|piece| !piece.is_empty() && piece.chars().all(|ch| ch.is_ascii_digit()))
}

fn calendar_date(year: i32, month: Month, day: u8, input: &str) -> Result<Date, AppError> {
    Date::from_calendar_date(year, month, day)
        .map_err(|_| invalid(input, &format!("{day} {month} {year} is not a valid calendar date")))
}

fn shift(date: Date, days: i64, input: &str) -> Result<Date, AppError> {
    days.checked_mul(SECONDS_PER_DAY)
        .map(Duration::seconds)
        .and_then(|offset| date.checked_add(offset))
        .ok_or_else(|| invalid(input, "the date is out of range"))
}

fn invalid(input: &str, reason: &str) -> AppError {
    AppError::validation(format!("Date/time '{input}' is invalid: {reason}"))
}

#[cfg(test)]
mod tests {
    use super::{DateTimeParser, format_timestamp, parse_timestamp};
    use time::macros::{date, datetime};

    // 2026-10-19 is a Monday.
    fn parser() -> DateTimeParser {
        DateTimeParser::new(date!(2026 - 10 - 19))
    }

    #[test]
    fn tomorrow_with_time() {
        let parsed = parser()
            .parse("tomorrow 6pm", datetime!(2026-10-19 23:59))
            .unwrap();
        assert_eq!(parsed, datetime!(2026-10-20 18:00));
    }

    #[test]
    fn date_only_keeps_default_time() {
        let parsed = parser().parse("Tomorrow", datetime!(2026-10-19 23:59)).unwrap();
        assert_eq!(parsed, datetime!(2026-10-20 23:59));
    }

    #[test]
    fn time_only_keeps_default_date() {
        let parsed = parser().parse("at 9:30am", datetime!(2026-11-02 00:00)).unwrap();
        assert_eq!(parsed, datetime!(2026-11-02 09:30));
    }

    #[test]
    fn weekday_resolves_to_upcoming_occurrence() {
        let default = datetime!(2026-10-19 00:00);
        assert_eq!(
            parser().parse("friday", default).unwrap().date(),
            date!(2026 - 10 - 23)
        );
        assert_eq!(
            parser().parse("mon", default).unwrap().date(),
            date!(2026 - 10 - 19)
        );
        assert_eq!(
            parser().parse("next monday", default).unwrap().date(),
            date!(2026 - 10 - 26)
        );
    }

    #[test]
    fn accepts_numeric_and_named_dates() {
        let default = datetime!(2026-10-19 23:59);
        assert_eq!(
            parser().parse("2026-12-25 09:00", default).unwrap(),
            datetime!(2026-12-25 09:00)
        );
        assert_eq!(
            parser().parse("25/12/2026", default).unwrap(),
            datetime!(2026-12-25 23:59)
        );
        assert_eq!(
            parser().parse("1/11", default).unwrap(),
            datetime!(2026-11-01 23:59)
        );
        assert_eq!(
            parser().parse("3rd march 2027 noon", default).unwrap(),
            datetime!(2027-03-03 12:00)
        );
        assert_eq!(
            parser().parse("Oct 31 7 pm", default).unwrap(),
            datetime!(2026-10-31 19:00)
        );
        assert_eq!(
            parser().parse("+1w", default).unwrap(),
            datetime!(2026-10-26 23:59)
        );
    }

    #[test]
    fn twelve_am_and_pm() {
        let default = datetime!(2026-10-19 23:59);
        assert_eq!(parser().parse("12am", default).unwrap(), datetime!(2026-10-19 00:00));
        assert_eq!(parser().parse("12pm", default).unwrap(), datetime!(2026-10-19 12:00));
    }

    #[test]
    fn rejects_unknown_words() {
        let err = parser()
            .parse("banana", datetime!(2026-10-19 23:59))
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert!(err.message().contains("'banana'"));
    }

    #[test]
    fn rejects_impossible_values() {
        let default = datetime!(2026-10-19 23:59);
        for input in [
            "2026-02-30",
            "31/4/2026",
            "13pm",
            "25:00",
            "",
            "at",
            "today tomorrow",
            "+999999999999999d",
            "+99999999999999w",
            "+-5d",
            "+d",
        ] {
            let err = parser().parse(input, default).unwrap_err();
            assert_eq!(err.code(), "validation_error", "input {input:?}");
        }
    }

    #[test]
    fn timestamp_storage_format() {
        let value = datetime!(2026-01-05 07:04);
        let rendered = format_timestamp(value).unwrap();
        assert_eq!(rendered, "2026-01-05 07:04");
        assert_eq!(parse_timestamp(&rendered).unwrap(), value);
        assert_eq!(parse_timestamp("yesterday").unwrap_err().code(), "invalid_data");
    }
}
