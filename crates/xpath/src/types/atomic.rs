//! `xs:anyAtomicType` and its subtypes (spec.md §3.2). The teacher's
//! `xpath31::types::atomic` keeps dates/times/durations as raw lexical
//! strings; here they carry real `chrono` values so comparison, arithmetic
//! and `format-date`/`format-time` don't have to re-parse on every use.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq)]
pub struct QNameValue {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl fmt::Display for QNameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// A value with an optional timezone offset, shared by every `gDay`-family
/// and `date`/`time`/`dateTime` variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timezoned<T> {
    pub value: T,
    pub tz: Option<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AtomicValue {
    String(String),
    UntypedAtomic(String),
    Boolean(bool),
    Decimal(Decimal),
    Integer(i64),
    Float(f32),
    Double(f64),
    AnyUri(String),
    QName(QNameValue),
    Notation(QNameValue),
    Base64Binary(Vec<u8>),
    HexBinary(Vec<u8>),

    Date(Timezoned<NaiveDate>),
    DateTime(Timezoned<NaiveDateTime>),
    /// `xs:dateTimeStamp`: a `dateTime` whose timezone is mandatory.
    DateTimeStamp(NaiveDateTime, FixedOffset),
    Time(Timezoned<NaiveTime>),
    GYear(Timezoned<i32>),
    GYearMonth(Timezoned<(i32, u32)>),
    GMonth(Timezoned<u32>),
    GMonthDay(Timezoned<(u32, u32)>),
    GDay(Timezoned<u32>),

    /// Signed whole months (`xs:yearMonthDuration`).
    YearMonthDuration(i64),
    /// Signed whole seconds, possibly fractional (`xs:dayTimeDuration`).
    DayTimeDuration(Decimal),
    /// General `xs:duration`: months and seconds vary independently and
    /// may carry opposite signs per the XSD value space.
    Duration { months: i64, seconds: Decimal },
}

impl AtomicValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            AtomicValue::String(_) => "xs:string",
            AtomicValue::UntypedAtomic(_) => "xs:untypedAtomic",
            AtomicValue::Boolean(_) => "xs:boolean",
            AtomicValue::Decimal(_) => "xs:decimal",
            AtomicValue::Integer(_) => "xs:integer",
            AtomicValue::Float(_) => "xs:float",
            AtomicValue::Double(_) => "xs:double",
            AtomicValue::AnyUri(_) => "xs:anyURI",
            AtomicValue::QName(_) => "xs:QName",
            AtomicValue::Notation(_) => "xs:NOTATION",
            AtomicValue::Base64Binary(_) => "xs:base64Binary",
            AtomicValue::HexBinary(_) => "xs:hexBinary",
            AtomicValue::Date(_) => "xs:date",
            AtomicValue::DateTime(_) => "xs:dateTime",
            AtomicValue::DateTimeStamp(..) => "xs:dateTimeStamp",
            AtomicValue::Time(_) => "xs:time",
            AtomicValue::GYear(_) => "xs:gYear",
            AtomicValue::GYearMonth(_) => "xs:gYearMonth",
            AtomicValue::GMonth(_) => "xs:gMonth",
            AtomicValue::GMonthDay(_) => "xs:gMonthDay",
            AtomicValue::GDay(_) => "xs:gDay",
            AtomicValue::YearMonthDuration(_) => "xs:yearMonthDuration",
            AtomicValue::DayTimeDuration(_) => "xs:dayTimeDuration",
            AtomicValue::Duration { .. } => "xs:duration",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AtomicValue::Integer(_) | AtomicValue::Decimal(_) | AtomicValue::Float(_) | AtomicValue::Double(_)
        )
    }

    pub fn is_duration(&self) -> bool {
        matches!(
            self,
            AtomicValue::YearMonthDuration(_) | AtomicValue::DayTimeDuration(_) | AtomicValue::Duration { .. }
        )
    }

    /// `fn:string()` applied to an atomic value (spec.md §3.4).
    pub fn to_string_value(&self) -> String {
        match self {
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) | AtomicValue::AnyUri(s) => s.clone(),
            AtomicValue::Boolean(b) => b.to_string(),
            AtomicValue::Decimal(d) => d.normalize().to_string(),
            AtomicValue::Integer(i) => i.to_string(),
            AtomicValue::Float(f) => format_xsd_float(*f as f64),
            AtomicValue::Double(d) => format_xsd_float(*d),
            AtomicValue::QName(q) | AtomicValue::Notation(q) => q.to_string(),
            AtomicValue::Base64Binary(bytes) => base64_encode(bytes),
            AtomicValue::HexBinary(bytes) => bytes.iter().map(|b| format!("{:02X}", b)).collect(),
            AtomicValue::Date(t) => format!("{}{}", t.value.format("%Y-%m-%d"), format_tz(t.tz)),
            AtomicValue::DateTime(t) => format!("{}{}", t.value.format("%Y-%m-%dT%H:%M:%S%.f"), format_tz(t.tz)),
            AtomicValue::DateTimeStamp(dt, tz) => format!("{}{}", dt.format("%Y-%m-%dT%H:%M:%S%.f"), format_tz(Some(*tz))),
            AtomicValue::Time(t) => format!("{}{}", t.value.format("%H:%M:%S%.f"), format_tz(t.tz)),
            AtomicValue::GYear(t) => format!("{:04}{}", t.value, format_tz(t.tz)),
            AtomicValue::GYearMonth(t) => format!("{:04}-{:02}{}", t.value.0, t.value.1, format_tz(t.tz)),
            AtomicValue::GMonth(t) => format!("--{:02}{}", t.value, format_tz(t.tz)),
            AtomicValue::GMonthDay(t) => format!("--{:02}-{:02}{}", t.value.0, t.value.1, format_tz(t.tz)),
            AtomicValue::GDay(t) => format!("---{:02}{}", t.value, format_tz(t.tz)),
            AtomicValue::YearMonthDuration(months) => format_year_month_duration(*months),
            AtomicValue::DayTimeDuration(seconds) => format_day_time_duration(*seconds),
            AtomicValue::Duration { months, seconds } => format_duration(*months, *seconds),
        }
    }

    pub fn to_double(&self) -> Option<f64> {
        match self {
            AtomicValue::Integer(i) => Some(*i as f64),
            AtomicValue::Decimal(d) => d.to_string().parse().ok(),
            AtomicValue::Float(f) => Some(*f as f64),
            AtomicValue::Double(d) => Some(*d),
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn to_boolean(&self) -> Option<bool> {
        match self {
            AtomicValue::Boolean(b) => Some(*b),
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            AtomicValue::Integer(i) => Some(*i != 0),
            AtomicValue::Double(d) => Some(*d != 0.0 && !d.is_nan()),
            _ => None,
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_value())
    }
}

// `map:merge`/`map:get` key atomic values by their lexical identity, so we
// treat float bit-patterns as the hash/equality key (this means NaN == NaN
// for map-key purposes only, unlike `eq`/`=` comparison semantics).
impl Eq for AtomicValue {}

impl Hash for AtomicValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            AtomicValue::String(s) | AtomicValue::UntypedAtomic(s) | AtomicValue::AnyUri(s) => s.hash(state),
            AtomicValue::Boolean(b) => b.hash(state),
            AtomicValue::Decimal(d) => d.hash(state),
            AtomicValue::Integer(i) => i.hash(state),
            AtomicValue::Float(f) => f.to_bits().hash(state),
            AtomicValue::Double(d) => d.to_bits().hash(state),
            AtomicValue::QName(q) | AtomicValue::Notation(q) => q.to_string().hash(state),
            AtomicValue::Base64Binary(b) | AtomicValue::HexBinary(b) => b.hash(state),
            AtomicValue::Date(t) => (t.value, t.tz).hash(state),
            AtomicValue::DateTime(t) => (t.value, t.tz).hash(state),
            AtomicValue::DateTimeStamp(dt, tz) => (dt, tz).hash(state),
            AtomicValue::Time(t) => (t.value, t.tz).hash(state),
            AtomicValue::GYear(t) => (t.value, t.tz).hash(state),
            AtomicValue::GYearMonth(t) => (t.value, t.tz).hash(state),
            AtomicValue::GMonth(t) => (t.value, t.tz).hash(state),
            AtomicValue::GMonthDay(t) => (t.value, t.tz).hash(state),
            AtomicValue::GDay(t) => (t.value, t.tz).hash(state),
            AtomicValue::YearMonthDuration(m) => m.hash(state),
            AtomicValue::DayTimeDuration(s) => s.hash(state),
            AtomicValue::Duration { months, seconds } => (months, seconds).hash(state),
        }
    }
}

fn format_tz(tz: Option<FixedOffset>) -> String {
    match tz {
        None => String::new(),
        Some(offset) => {
            let secs = offset.local_minus_utc();
            if secs == 0 {
                "Z".to_string()
            } else {
                let sign = if secs < 0 { '-' } else { '+' };
                let secs = secs.abs();
                format!("{}{:02}:{:02}", sign, secs / 3600, (secs % 3600) / 60)
            }
        }
    }
}

/// `xs:float`/`xs:double` canonical lexical mapping: `NaN`, `INF`, `-INF`,
/// otherwise the shortest round-tripping decimal (spec.md §3.2).
fn format_xsd_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "INF".to_string() } else { "-INF".to_string() }
    } else {
        let mut s = format!("{}", value);
        if !s.contains('.') && !s.contains('e') && !s.contains('E') {
            s.push_str(".0");
        }
        s
    }
}

fn format_year_month_duration(months: i64) -> String {
    let sign = if months < 0 { "-" } else { "" };
    let months = months.abs();
    format!("{}P{}Y{}M", sign, months / 12, months % 12)
}

fn format_day_time_duration(seconds: Decimal) -> String {
    let sign = if seconds.is_sign_negative() { "-" } else { "" };
    let seconds = seconds.abs();
    let whole = seconds.trunc();
    let days = (whole / Decimal::from(86400)).trunc();
    let rem = whole - days * Decimal::from(86400);
    let hours = (rem / Decimal::from(3600)).trunc();
    let rem = rem - hours * Decimal::from(3600);
    let minutes = (rem / Decimal::from(60)).trunc();
    let secs = seconds - whole + (rem - minutes * Decimal::from(60));
    format!("{}P{}DT{}H{}M{}S", sign, days, hours, minutes, secs.normalize())
}

fn format_duration(months: i64, seconds: Decimal) -> String {
    if months == 0 {
        format_day_time_duration(seconds)
    } else if seconds == Decimal::ZERO {
        format_year_month_duration(months)
    } else {
        let ym = format_year_month_duration(months).trim_start_matches('-').to_string();
        let dt = format_day_time_duration(seconds).trim_start_matches('-').trim_start_matches('P').to_string();
        let sign = if months < 0 || seconds.is_sign_negative() { "-" } else { "" };
        format!("{}{}{}", sign, ym, dt)
    }
}

fn base64_encode(bytes: &[u8]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::new();
    for chunk in bytes.chunks(3) {
        let b0 = chunk[0];
        let b1 = chunk.get(1).copied();
        let b2 = chunk.get(2).copied();
        out.push(ALPHABET[(b0 >> 2) as usize] as char);
        out.push(ALPHABET[(((b0 & 0x03) << 4) | (b1.unwrap_or(0) >> 4)) as usize] as char);
        out.push(if let Some(b1) = b1 {
            ALPHABET[(((b1 & 0x0f) << 2) | (b2.unwrap_or(0) >> 6)) as usize] as char
        } else {
            '='
        });
        out.push(if let Some(b2) = b2 { ALPHABET[(b2 & 0x3f) as usize] as char } else { '=' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_year_month_duration() {
        assert_eq!(format_year_month_duration(14), "P1Y2M");
        assert_eq!(format_year_month_duration(-14), "-P1Y2M");
    }

    #[test]
    fn formats_double_with_infinities() {
        assert_eq!(format_xsd_float(f64::INFINITY), "INF");
        assert_eq!(format_xsd_float(f64::NAN), "NaN");
        assert_eq!(format_xsd_float(2.0), "2.0");
    }

    #[test]
    fn encodes_base64() {
        assert_eq!(base64_encode(b"Man"), "TWFu");
        assert_eq!(base64_encode(b"Ma"), "TWE=");
    }
}
