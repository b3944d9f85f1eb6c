//! Date/time/duration functions (spec.md §5.3). Absent from the teacher
//! (its `xpath1` grammar predates `xs:date`/`xs:duration`); grounded in
//! `examples/original_source/elementpath`'s `xpath2/_datetime_operators.py`
//! component-accessor and current-date family, re-expressed against the
//! `chrono`-backed [`crate::types::atomic::Timezoned`] representation.
//! Date/time ± duration arithmetic lives here rather than in
//! `crate::operators`, since it needs the same component-accessor
//! machinery as the rest of this module.

use crate::engine::{single_atomic, EvaluationContext};
use crate::error::XPathError;
use crate::types::{AtomicValue, XdmValue};
use chrono::{Datelike, Duration as ChronoDuration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use xpath_core::DataSourceNode;
use xpath_core::error::ErrorCode;

pub fn handles(name: &str) -> bool {
    matches!(
        name,
        "current-dateTime"
            | "current-date"
            | "current-time"
            | "implicit-timezone"
            | "year-from-dateTime"
            | "month-from-dateTime"
            | "day-from-dateTime"
            | "hours-from-dateTime"
            | "minutes-from-dateTime"
            | "seconds-from-dateTime"
            | "timezone-from-dateTime"
            | "year-from-date"
            | "month-from-date"
            | "day-from-date"
            | "timezone-from-date"
            | "hours-from-time"
            | "minutes-from-time"
            | "seconds-from-time"
            | "timezone-from-time"
            | "years-from-duration"
            | "months-from-duration"
            | "days-from-duration"
            | "hours-from-duration"
            | "minutes-from-duration"
            | "seconds-from-duration"
            | "adjust-dateTime-to-timezone"
            | "adjust-date-to-timezone"
            | "adjust-time-to-timezone"
    )
}

pub fn call<'d, N: DataSourceNode<'d>>(
    name: &str,
    args: &[XdmValue<N>],
    ctx: &EvaluationContext<'d, N>,
) -> Result<XdmValue<N>, XPathError> {
    match name {
        "current-dateTime" => Ok(XdmValue::from_atomic(AtomicValue::DateTimeStamp(
            ctx.dynamic.current_datetime.naive_local(),
            ctx.dynamic.current_datetime.timezone(),
        ))),
        "current-date" => Ok(XdmValue::from_atomic(AtomicValue::Date(crate::types::atomic::Timezoned {
            value: ctx.dynamic.current_datetime.date_naive(),
            tz: Some(ctx.dynamic.current_datetime.timezone()),
        }))),
        "current-time" => Ok(XdmValue::from_atomic(AtomicValue::Time(crate::types::atomic::Timezoned {
            value: ctx.dynamic.current_datetime.time(),
            tz: Some(ctx.dynamic.current_datetime.timezone()),
        }))),
        "implicit-timezone" => Ok(XdmValue::from_atomic(AtomicValue::DayTimeDuration(Decimal::from(
            ctx.dynamic.implicit_timezone.local_minus_utc(),
        )))),

        "year-from-dateTime" => dt_component(args, |dt| dt.year() as i64),
        "month-from-dateTime" => dt_component(args, |dt| dt.month() as i64),
        "day-from-dateTime" => dt_component(args, |dt| dt.day() as i64),
        "hours-from-dateTime" => dt_component(args, |dt| dt.hour() as i64),
        "minutes-from-dateTime" => dt_component(args, |dt| dt.minute() as i64),
        "seconds-from-dateTime" => {
            let (dt, _) = naive_date_time(args)?;
            Ok(XdmValue::from_atomic(AtomicValue::Decimal(
                Decimal::from(dt.second()) + Decimal::new(dt.nanosecond() as i64, 9),
            )))
        }
        "timezone-from-dateTime" => {
            let (_, tz) = naive_date_time(args)?;
            tz_duration(tz)
        }

        "year-from-date" => date_component(args, |d| d.year() as i64),
        "month-from-date" => date_component(args, |d| d.month() as i64),
        "day-from-date" => date_component(args, |d| d.day() as i64),
        "timezone-from-date" => {
            let (_, tz) = naive_date(args)?;
            tz_duration(tz)
        }

        "hours-from-time" => time_component(args, |t| t.hour() as i64),
        "minutes-from-time" => time_component(args, |t| t.minute() as i64),
        "seconds-from-time" => {
            let (t, _) = naive_time(args)?;
            Ok(XdmValue::from_atomic(AtomicValue::Decimal(
                Decimal::from(t.second()) + Decimal::new(t.nanosecond() as i64, 9),
            )))
        }
        "timezone-from-time" => {
            let (_, tz) = naive_time(args)?;
            tz_duration(tz)
        }

        "years-from-duration" => duration_component(args, |months, _| months / 12),
        "months-from-duration" => duration_component(args, |months, _| months % 12),
        "days-from-duration" => duration_component(args, |_, secs| (secs / Decimal::from(86400)).trunc().to_string().parse().unwrap_or(0)),
        "hours-from-duration" => duration_component(args, |_, secs| {
            ((secs / Decimal::from(3600)).trunc().to_string().parse::<i64>().unwrap_or(0)) % 24
        }),
        "minutes-from-duration" => duration_component(args, |_, secs| {
            ((secs / Decimal::from(60)).trunc().to_string().parse::<i64>().unwrap_or(0)) % 60
        }),
        "seconds-from-duration" => {
            let (_, seconds) = duration_parts(args)?;
            let remainder = seconds - (seconds / Decimal::from(60)).trunc() * Decimal::from(60);
            Ok(XdmValue::from_atomic(AtomicValue::Decimal(remainder)))
        }

        "adjust-dateTime-to-timezone" => adjust_timezone(args),
        "adjust-date-to-timezone" => adjust_date_timezone(args),
        "adjust-time-to-timezone" => adjust_time_timezone(args),

        _ => unreachable!("datetime::call dispatched to an unhandled name"),
    }
}

fn naive_date_time<N: Clone>(args: &[XdmValue<N>]) -> Result<(NaiveDateTime, Option<FixedOffset>), XPathError> {
    match single_atomic(&args[0])? {
        AtomicValue::DateTime(t) => Ok((t.value, t.tz)),
        AtomicValue::DateTimeStamp(dt, tz) => Ok((dt, Some(tz))),
        other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected xs:dateTime, got {}", other.type_name()))),
    }
}

fn naive_date<N: Clone>(args: &[XdmValue<N>]) -> Result<(NaiveDate, Option<FixedOffset>), XPathError> {
    match single_atomic(&args[0])? {
        AtomicValue::Date(t) => Ok((t.value, t.tz)),
        other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected xs:date, got {}", other.type_name()))),
    }
}

fn naive_time<N: Clone>(args: &[XdmValue<N>]) -> Result<(NaiveTime, Option<FixedOffset>), XPathError> {
    match single_atomic(&args[0])? {
        AtomicValue::Time(t) => Ok((t.value, t.tz)),
        other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected xs:time, got {}", other.type_name()))),
    }
}

fn duration_parts<N: Clone>(args: &[XdmValue<N>]) -> Result<(i64, Decimal), XPathError> {
    match single_atomic(&args[0])? {
        AtomicValue::YearMonthDuration(m) => Ok((m, Decimal::ZERO)),
        AtomicValue::DayTimeDuration(s) => Ok((0, s)),
        AtomicValue::Duration { months, seconds } => Ok((months, seconds)),
        other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected a duration, got {}", other.type_name()))),
    }
}

fn dt_component<N: Clone>(args: &[XdmValue<N>], f: impl Fn(NaiveDateTime) -> i64) -> Result<XdmValue<N>, XPathError> {
    let (dt, _) = naive_date_time(args)?;
    Ok(XdmValue::from_atomic(AtomicValue::Integer(f(dt))))
}

fn date_component<N: Clone>(args: &[XdmValue<N>], f: impl Fn(NaiveDate) -> i64) -> Result<XdmValue<N>, XPathError> {
    let (d, _) = naive_date(args)?;
    Ok(XdmValue::from_atomic(AtomicValue::Integer(f(d))))
}

fn time_component<N: Clone>(args: &[XdmValue<N>], f: impl Fn(NaiveTime) -> i64) -> Result<XdmValue<N>, XPathError> {
    let (t, _) = naive_time(args)?;
    Ok(XdmValue::from_atomic(AtomicValue::Integer(f(t))))
}

fn duration_component<N: Clone>(args: &[XdmValue<N>], f: impl Fn(i64, Decimal) -> i64) -> Result<XdmValue<N>, XPathError> {
    let (months, seconds) = duration_parts(args)?;
    Ok(XdmValue::from_atomic(AtomicValue::Integer(f(months, seconds))))
}

fn tz_duration<N: Clone>(tz: Option<FixedOffset>) -> Result<XdmValue<N>, XPathError> {
    match tz {
        None => Ok(XdmValue::empty()),
        Some(offset) => Ok(XdmValue::from_atomic(AtomicValue::DayTimeDuration(Decimal::from(offset.local_minus_utc())))),
    }
}

fn requested_offset<N: Clone>(args: &[XdmValue<N>]) -> Result<Option<FixedOffset>, XPathError> {
    match args.get(1) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => match single_atomic(v)? {
            AtomicValue::DayTimeDuration(seconds) => {
                let secs: i32 = seconds.to_string().parse::<f64>().unwrap_or(0.0) as i32;
                Ok(Some(FixedOffset::east_opt(secs).ok_or_else(|| XPathError::new(ErrorCode::FODT0003, "timezone offset out of range"))?))
            }
            other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected xs:dayTimeDuration, got {}", other.type_name()))),
        },
    }
}

fn adjust_timezone<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let (naive, current_tz) = naive_date_time(args)?;
    let requested = requested_offset(args)?;
    let base_offset = current_tz.unwrap_or(FixedOffset::east_opt(0).unwrap());
    match requested {
        None => Ok(XdmValue::from_atomic(AtomicValue::DateTime(crate::types::atomic::Timezoned { value: naive, tz: None }))),
        Some(target) => {
            let shifted = naive + ChronoDuration::seconds((target.local_minus_utc() - base_offset.local_minus_utc()) as i64);
            Ok(XdmValue::from_atomic(AtomicValue::DateTime(crate::types::atomic::Timezoned { value: shifted, tz: Some(target) })))
        }
    }
}

fn adjust_date_timezone<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let (naive, _) = naive_date(args)?;
    let requested = requested_offset(args)?;
    Ok(XdmValue::from_atomic(AtomicValue::Date(crate::types::atomic::Timezoned { value: naive, tz: requested })))
}

fn adjust_time_timezone<N: Clone>(args: &[XdmValue<N>]) -> Result<XdmValue<N>, XPathError> {
    if args[0].is_empty() {
        return Ok(XdmValue::empty());
    }
    let (naive, _) = naive_time(args)?;
    let requested = requested_offset(args)?;
    Ok(XdmValue::from_atomic(AtomicValue::Time(crate::types::atomic::Timezoned { value: naive, tz: requested })))
}

/// `xs:dateTime`/`xs:date` ± `xs:yearMonthDuration`/`xs:dayTimeDuration`
/// (spec.md §4.2). Exposed for [`crate::operators::evaluate_arithmetic`]'s
/// counterpart, which handles numeric and same-kind-duration arithmetic but
/// defers date/time combinations here since they need calendar-aware
/// month/day rollover rather than plain scalar math.
pub fn add_duration_to_date_time(dt: NaiveDateTime, duration: &AtomicValue, negate: bool) -> Result<NaiveDateTime, XPathError> {
    let sign = if negate { -1 } else { 1 };
    match duration {
        AtomicValue::YearMonthDuration(months) => Ok(shift_months(dt, sign * months)),
        AtomicValue::DayTimeDuration(seconds) => Ok(dt + chrono_duration_from_decimal(*seconds * Decimal::from(sign))),
        AtomicValue::Duration { months, seconds } => {
            let shifted = shift_months(dt, sign * months);
            Ok(shifted + chrono_duration_from_decimal(*seconds * Decimal::from(sign)))
        }
        other => Err(XPathError::new(ErrorCode::XPTY0004, format!("expected a duration, got {}", other.type_name()))),
    }
}

pub fn add_duration_to_date(date: NaiveDate, duration: &AtomicValue, negate: bool) -> Result<NaiveDate, XPathError> {
    let dt = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    Ok(add_duration_to_date_time(dt, duration, negate)?.date())
}

fn shift_months(dt: NaiveDateTime, months: i64) -> NaiveDateTime {
    let total = dt.year() as i64 * 12 + (dt.month() as i64 - 1) + months;
    let year = total.div_euclid(12) as i32;
    let month = (total.rem_euclid(12) + 1) as u32;
    let last_day = days_in_month(year, month);
    let day = dt.day().min(last_day);
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or(dt.date())
        .and_time(dt.time())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 { NaiveDate::from_ymd_opt(year + 1, 1, 1) } else { NaiveDate::from_ymd_opt(year, month + 1, 1) };
    next.and_then(|n| n.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn chrono_duration_from_decimal(seconds: Decimal) -> ChronoDuration {
    let whole = seconds.trunc().to_string().parse::<i64>().unwrap_or(0);
    let nanos = ((seconds - seconds.trunc()) * Decimal::from(1_000_000_000)).to_string().parse::<i64>().unwrap_or(0);
    ChronoDuration::seconds(whole) + ChronoDuration::nanoseconds(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_months_clamps_to_shorter_month() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let shifted = shift_months(dt, 1);
        assert_eq!(shifted.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn add_year_month_duration_to_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let result = add_duration_to_date(date, &AtomicValue::YearMonthDuration(14), false).unwrap();
        assert_eq!(result, NaiveDate::from_ymd_opt(2025, 8, 15).unwrap());
    }
}
