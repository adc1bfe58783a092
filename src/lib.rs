use std::{fmt::Display, fs, num::ParseIntError, path::Path, str::FromStr};

use logos::Logos;
use thiserror::Error;
use time::{Date, Month};

/// Unit suffix appended to every rendered temperature.
pub const DEGREE_CELSIUS: &str = "°C";

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Ignore this regex pattern between tokens
enum Token {
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9:]+(\.[0-9]+)?)?")]
    Date,

    #[regex(r"-?[0-9]+")]
    Number,

    #[token(",")]
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRecord {
    pub date: Date,

    // Fahrenheit, whole degrees, as loaded
    pub low_temp: i32,
    pub high_temp: i32,
}

#[derive(Debug, Error)]
pub enum ParseRecordError {
    #[error("expected an ISO date, got `{0}`")]
    BadDate(String),
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("expected a whole-degree temperature, got `{0}`")]
    BadTemperature(String),
    #[error(transparent)]
    Date(#[from] DateParseError),
    #[error("temperature does not fit in an integer: {0}")]
    TemperatureRange(#[from] ParseIntError),
}

impl DayRecord {
    fn parse(s: &str) -> Result<Self, ParseRecordError> {
        let mut row = Token::lexer(s);
        let date = match row.next() {
            Some(Ok(Token::Date)) => parse_iso_date(row.slice())?,
            _ => return Err(ParseRecordError::BadDate(row.slice().to_string())),
        };

        match row.next() {
            Some(Ok(Token::Comma)) => (),
            _ => return Err(ParseRecordError::MissingField("low temperature")),
        };
        let low_temp = match row.next() {
            Some(Ok(Token::Number)) => row.slice().parse()?,
            _ => return Err(ParseRecordError::BadTemperature(row.slice().to_string())),
        };

        match row.next() {
            Some(Ok(Token::Comma)) => (),
            _ => return Err(ParseRecordError::MissingField("high temperature")),
        };
        let high_temp = match row.next() {
            Some(Ok(Token::Number)) => row.slice().parse()?,
            _ => return Err(ParseRecordError::BadTemperature(row.slice().to_string())),
        };

        // Some sources carry extra columns after the two temperatures;
        // they are not part of the record.
        Ok(Self {
            date,
            low_temp,
            high_temp,
        })
    }
}

/// An ordered run of days. Positions are load-bearing: an extremum
/// computed over one of its columns indexes back into `records`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherTable {
    pub records: Vec<DayRecord>,
}

#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct ParseTableError {
    pub line: usize,
    source: ParseRecordError,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseTableError),
}

impl WeatherTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Ok(fs::read_to_string(path)?.parse()?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn low_series(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|day| f64::from(day.low_temp))
            .collect()
    }

    pub fn high_series(&self) -> Vec<f64> {
        self.records
            .iter()
            .map(|day| f64::from(day.high_temp))
            .collect()
    }
}

impl FromStr for WeatherTable {
    type Err = ParseTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut records = Vec::new();

        // The first line is the header, always skipped.
        for (number, line) in s.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let record = DayRecord::parse(line).map_err(|source| ParseTableError {
                line: number + 1,
                source,
            })?;
            records.push(record);
        }

        Ok(Self { records })
    }
}

#[derive(Debug, Error)]
pub enum DateParseError {
    #[error("not an ISO-8601 date: `{0}`")]
    Malformed(String),
    #[error(transparent)]
    OutOfRange(#[from] time::error::ComponentRange),
}

/// Parses the calendar-date part of an ISO-8601 string. A trailing time
/// component is accepted and ignored.
pub fn parse_iso_date(s: &str) -> Result<Date, DateParseError> {
    let calendar = match s.split_once(['T', ' ']) {
        Some((calendar, _time)) => calendar,
        None => s,
    };

    let mut fields = calendar.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(DateParseError::Malformed(s.to_string()));
    };

    let year = year
        .parse()
        .map_err(|_| DateParseError::Malformed(s.to_string()))?;
    let month: u8 = month
        .parse()
        .map_err(|_| DateParseError::Malformed(s.to_string()))?;
    let day = day
        .parse()
        .map_err(|_| DateParseError::Malformed(s.to_string()))?;

    Ok(Date::from_calendar_date(year, Month::try_from(month)?, day)?)
}

/// Renders an ISO date string like `Tuesday 06 July 2021`.
pub fn format_long_date(iso: &str) -> Result<String, DateParseError> {
    Ok(long_date(parse_iso_date(iso)?))
}

fn long_date(date: Date) -> String {
    format!(
        "{} {:02} {} {}",
        date.weekday(),
        date.day(),
        date.month(),
        date.year()
    )
}

/// Converts to Celsius, rounded to one decimal place. `f64::round`
/// rounds halves away from zero.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    ((fahrenheit - 32.0) * 5.0 / 9.0 * 10.0).round() / 10.0
}

pub fn format_temperature(temperature: impl Display) -> String {
    format!("{temperature}{DEGREE_CELSIUS}")
}

// Converted temperatures always show one decimal, even on whole degrees.
fn display_celsius(fahrenheit: f64) -> String {
    format_temperature(format!("{:.1}", fahrenheit_to_celsius(fahrenheit)))
}

/// An extreme value and the position of its *last* occurrence in the
/// series it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub index: usize,
}

#[derive(Debug, Error)]
#[error("cannot take the mean of an empty series")]
pub struct EmptyInputError;

pub fn mean(series: &[f64]) -> Result<f64, EmptyInputError> {
    if series.is_empty() {
        return Err(EmptyInputError);
    }

    Ok(series.iter().sum::<f64>() / series.len() as f64)
}

pub fn find_minimum(series: &[f64]) -> Option<Extremum> {
    let mut best = Extremum {
        value: *series.first()?,
        index: 0,
    };

    for (index, &value) in series.iter().enumerate().skip(1) {
        // `<=` so the last of several equal minima wins
        if value <= best.value {
            best = Extremum { value, index };
        }
    }

    Some(best)
}

pub fn find_maximum(series: &[f64]) -> Option<Extremum> {
    let mut best = Extremum {
        value: *series.first()?,
        index: 0,
    };

    for (index, &value) in series.iter().enumerate().skip(1) {
        // `>=` so the last of several equal maxima wins
        if value >= best.value {
            best = Extremum { value, index };
        }
    }

    Some(best)
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("cannot summarize an empty table")]
    EmptyTable,
}

pub fn generate_summary(table: &WeatherTable) -> Result<String, SummaryError> {
    let lows = table.low_series();
    let highs = table.high_series();

    let (Some(lowest), Some(highest)) = (find_minimum(&lows), find_maximum(&highs)) else {
        return Err(SummaryError::EmptyTable);
    };

    let avg_low = mean(&lows).map_err(|_| SummaryError::EmptyTable)?;
    let avg_high = mean(&highs).map_err(|_| SummaryError::EmptyTable)?;

    let mut report = format!("{} Day Overview\n", table.len());
    report.push_str(&format!(
        "  The lowest temperature will be {}, and will occur on {}.\n",
        display_celsius(lowest.value),
        long_date(table.records[lowest.index].date),
    ));
    report.push_str(&format!(
        "  The highest temperature will be {}, and will occur on {}.\n",
        display_celsius(highest.value),
        long_date(table.records[highest.index].date),
    ));
    report.push_str(&format!(
        "  The average low this week is {}.\n",
        display_celsius(avg_low),
    ));
    report.push_str(&format!(
        "  The average high this week is {}.\n",
        display_celsius(avg_high),
    ));

    Ok(report)
}

pub fn generate_daily_summary(table: &WeatherTable) -> String {
    let mut report = String::new();

    for day in &table.records {
        report.push_str(&format!("---- {} ----\n", long_date(day.date)));
        report.push_str(&format!(
            "  Minimum Temperature: {}\n",
            display_celsius(f64::from(day.low_temp)),
        ));
        report.push_str(&format!(
            "  Maximum Temperature: {}\n\n",
            display_celsius(f64::from(day.high_temp)),
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_point() {
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
    }

    #[test]
    fn boiling_hot_day() {
        assert_eq!(fahrenheit_to_celsius(100.0), 37.8);
    }

    #[test]
    fn negative_fahrenheit() {
        assert_eq!(fahrenheit_to_celsius(-40.0), -40.0);
    }

    #[test]
    fn degree_suffix_has_no_space() {
        assert_eq!(format_temperature(5), "5°C");
        assert_eq!(format_temperature(9.4), "9.4°C");
    }

    #[test]
    fn long_date_from_iso() {
        assert_eq!(
            format_long_date("2021-07-06").unwrap(),
            "Tuesday 06 July 2021"
        );
    }

    #[test]
    fn long_date_zero_pads_the_day() {
        assert_eq!(
            format_long_date("2021-07-01").unwrap(),
            "Thursday 01 July 2021"
        );
    }

    #[test]
    fn long_date_ignores_time_component() {
        assert_eq!(
            format_long_date("2021-07-06T09:30:00").unwrap(),
            "Tuesday 06 July 2021"
        );
    }

    #[test]
    fn long_date_rejects_garbage() {
        assert!(matches!(
            format_long_date("yesterday"),
            Err(DateParseError::Malformed(_))
        ));
        assert!(matches!(
            format_long_date("2021-13-01"),
            Err(DateParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn mean_of_a_short_series() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn mean_of_nothing_is_an_error() {
        assert!(mean(&[]).is_err());
    }

    #[test]
    fn extrema_of_an_empty_series() {
        assert_eq!(find_minimum(&[]), None);
        assert_eq!(find_maximum(&[]), None);
    }

    #[test]
    fn minimum_keeps_the_last_tie() {
        let found = find_minimum(&[1.0, 2.0, 1.0]).unwrap();
        assert_eq!(found.value, 1.0);
        assert_eq!(found.index, 2);
    }

    #[test]
    fn maximum_keeps_the_last_tie() {
        let found = find_maximum(&[1.0, 5.0, 5.0, 2.0]).unwrap();
        assert_eq!(found.value, 5.0);
        assert_eq!(found.index, 2);
    }

    #[test]
    fn parse_a_row() {
        let day = DayRecord::parse("2021-07-02,49,57").unwrap();
        assert_eq!(
            day.date,
            Date::from_calendar_date(2021, Month::July, 2).unwrap()
        );
        assert_eq!(day.low_temp, 49);
        assert_eq!(day.high_temp, 57);
    }

    #[test]
    fn parse_a_row_with_negative_temperatures() {
        let day = DayRecord::parse("2021-01-02,-12,-3").unwrap();
        assert_eq!(day.low_temp, -12);
        assert_eq!(day.high_temp, -3);
    }

    #[test]
    fn short_row_is_rejected() {
        assert!(matches!(
            DayRecord::parse("2021-07-02,49"),
            Err(ParseRecordError::MissingField(_))
        ));
    }

    #[test]
    fn table_skips_header_and_blank_lines() {
        let table: WeatherTable = "date,min,max\n2021-07-02,49,57\n\n2021-07-03,57,67\n"
            .parse()
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.low_series(), vec![49.0, 57.0]);
        assert_eq!(table.high_series(), vec![57.0, 67.0]);
    }

    #[test]
    fn table_reports_the_bad_line() {
        let err = "date,min,max\n2021-07-02,49,57\nnot a row\n"
            .parse::<WeatherTable>()
            .unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn empty_input_is_an_empty_table() {
        let table: WeatherTable = "".parse().unwrap();
        assert!(table.is_empty());
    }
}
