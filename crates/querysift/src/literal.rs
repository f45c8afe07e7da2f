//! Literal codec.
//!
//! Decoding turns the text of one literal into a typed [`Scalar`] of a given
//! [`ScalarKind`]. Encoding ([`LiteralValue`]) is its exact inverse: every
//! value encodes to text that decodes back to the same value, bit for bit
//! for floats and instant for instant for date/times.
//!
//! | kind | text form |
//! |------|-----------|
//! | bool | `true` / `false` (any ASCII case when decoding) |
//! | char | exactly one character |
//! | integers | decimal, range checked against the declared width |
//! | f32, f64 | shortest round-trip form, `NaN`, `inf`, `-inf`, `1e300` |
//! | decimal | plain or exponent notation |
//! | date/time | RFC 3339 (ISO-8601 with an explicit offset) |
//! | duration | `[-][d.]hh:mm:ss[.fffffffff]` |
//! | uuid | hyphenated, simple, braced or URN form |

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta, Utc};
use uuid::Uuid;

use crate::clause::{Atom, RawLiteral};
use crate::value::{Scalar, ScalarKind};

/// Reserved literal text standing for "no value".
///
/// Accepted bare (`eq('P', $!NULL!$)`) or quoted (`eq('P', '$!NULL!$')`); it
/// is never decoded as data.
pub const NULL_SENTINEL: &str = "$!NULL!$";

const SECONDS_PER_DAY: i64 = 86_400;

/// Wraps text in single quotes, escaping `'` and `\` with a backslash.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// Decodes literal text into a value of `kind`.
///
/// The error is a human readable reason; the compiler wraps it with the
/// property and literal into a coercion error.
pub fn decode(kind: ScalarKind, text: &str) -> Result<Scalar, String> {
    fn int<T>(text: &str) -> Result<T, String>
    where
        T: FromStr<Err = std::num::ParseIntError>,
    {
        text.parse::<T>().map_err(|e| e.to_string())
    }

    let value = match kind {
        ScalarKind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Scalar::Bool(true)
            } else if text.eq_ignore_ascii_case("false") {
                Scalar::Bool(false)
            } else {
                return Err("expected 'true' or 'false'".to_string());
            }
        }
        ScalarKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Scalar::Char(c),
                _ => return Err("expected exactly one character".to_string()),
            }
        }
        ScalarKind::I8 => Scalar::Int(i64::from(int::<i8>(text)?)),
        ScalarKind::I16 => Scalar::Int(i64::from(int::<i16>(text)?)),
        ScalarKind::I32 => Scalar::Int(i64::from(int::<i32>(text)?)),
        ScalarKind::I64 => Scalar::Int(int::<i64>(text)?),
        ScalarKind::U8 => Scalar::UInt(u64::from(int::<u8>(text)?)),
        ScalarKind::U16 => Scalar::UInt(u64::from(int::<u16>(text)?)),
        ScalarKind::U32 => Scalar::UInt(u64::from(int::<u32>(text)?)),
        ScalarKind::U64 => Scalar::UInt(int::<u64>(text)?),
        ScalarKind::F32 => Scalar::F32(text.parse::<f32>().map_err(|e| e.to_string())?),
        ScalarKind::F64 => Scalar::F64(text.parse::<f64>().map_err(|e| e.to_string())?),
        ScalarKind::Decimal => {
            Scalar::Decimal(BigDecimal::from_str(text).map_err(|e| e.to_string())?)
        }
        ScalarKind::String => Scalar::String(text.to_string()),
        ScalarKind::DateTime => Scalar::DateTime(
            DateTime::parse_from_rfc3339(text)
                .map_err(|e| format!("expected an RFC 3339 date/time: {e}"))?,
        ),
        ScalarKind::Duration => Scalar::Duration(parse_duration(text)?),
        ScalarKind::Uuid => Scalar::Uuid(Uuid::parse_str(text).map_err(|e| e.to_string())?),
    };
    Ok(value)
}

/// Formats a duration as `[-][d.]hh:mm:ss[.fffffffff]`.
///
/// The day part is omitted when zero; the fraction is omitted when zero and
/// otherwise trimmed of trailing zeros.
pub fn format_duration(delta: TimeDelta) -> String {
    let negative = delta < TimeDelta::zero();
    let magnitude = delta.abs();
    let total = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();

    let days = total / SECONDS_PER_DAY;
    let rest = total % SECONDS_PER_DAY;
    let (hours, minutes, seconds) = (rest / 3600, rest % 3600 / 60, rest % 60);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Parses the format written by [`format_duration`].
pub fn parse_duration(text: &str) -> Result<TimeDelta, String> {
    const FORMAT: &str = "expected a duration like [-][d.]hh:mm:ss[.fffffffff]";

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut parts = body.split(':');
    let (Some(head), Some(minutes), Some(tail), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(FORMAT.to_string());
    };

    let (days, hours) = match head.split_once('.') {
        Some((d, h)) => (digits(d, FORMAT)?, h),
        None => (0, head),
    };
    let (seconds, fraction) = match tail.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (tail, None),
    };

    let hours = two_digits(hours, 24, FORMAT)?;
    let minutes = two_digits(minutes, 60, FORMAT)?;
    let seconds = two_digits(seconds, 60, FORMAT)?;
    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.len() <= 9 => {
            let padded = format!("{f:0<9}");
            u32::try_from(digits(&padded, FORMAT)?).map_err(|_| FORMAT.to_string())?
        }
        Some(_) => return Err(FORMAT.to_string()),
        None => 0,
    };

    let total = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|s| s.checked_add(hours * 3600 + minutes * 60 + seconds))
        .ok_or_else(|| "duration out of range".to_string())?;
    let delta = TimeDelta::new(total, nanos).ok_or_else(|| "duration out of range".to_string())?;
    Ok(if negative { -delta } else { delta })
}

fn digits(text: &str, format: &str) -> Result<i64, String> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format.to_string());
    }
    text.parse::<i64>().map_err(|_| format.to_string())
}

fn two_digits(text: &str, limit: i64, format: &str) -> Result<i64, String> {
    if text.len() != 2 {
        return Err(format.to_string());
    }
    let value = digits(text, format)?;
    if value >= limit {
        return Err(format.to_string());
    }
    Ok(value)
}

/// A value that can be written as a query literal.
///
/// Implemented for every supported scalar type, `str`, references and
/// `Option` (where `None` encodes as the null sentinel).
pub trait LiteralValue {
    fn to_atom(&self) -> Atom;
}

macro_rules! display_literals {
    ($($ty:ty),*) => {
        $(
            impl LiteralValue for $ty {
                fn to_atom(&self) -> Atom {
                    Atom::Text(self.to_string())
                }
            }
        )*
    };
}

display_literals!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64, BigDecimal, String, str, Uuid);

impl LiteralValue for f32 {
    fn to_atom(&self) -> Atom {
        Atom::Text(format!("{self:?}"))
    }
}

impl LiteralValue for f64 {
    fn to_atom(&self) -> Atom {
        Atom::Text(format!("{self:?}"))
    }
}

impl LiteralValue for DateTime<Utc> {
    fn to_atom(&self) -> Atom {
        Atom::Text(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl LiteralValue for DateTime<FixedOffset> {
    fn to_atom(&self) -> Atom {
        Atom::Text(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl LiteralValue for TimeDelta {
    fn to_atom(&self) -> Atom {
        Atom::Text(format_duration(*self))
    }
}

impl<T: LiteralValue> LiteralValue for Option<T> {
    fn to_atom(&self) -> Atom {
        match self {
            Some(v) => v.to_atom(),
            None => Atom::Null,
        }
    }
}

impl<T: LiteralValue + ?Sized> LiteralValue for &T {
    fn to_atom(&self) -> Atom {
        (**self).to_atom()
    }
}

/// Conversion into a clause literal, used by [`QueryBuilder`](crate::QueryBuilder).
///
/// Any [`LiteralValue`] becomes a scalar literal; build list literals with
/// [`list`].
pub trait IntoLiteral {
    fn into_literal(self) -> RawLiteral;
}

impl<T: LiteralValue> IntoLiteral for T {
    fn into_literal(self) -> RawLiteral {
        RawLiteral::Scalar(self.to_atom())
    }
}

impl IntoLiteral for RawLiteral {
    fn into_literal(self) -> RawLiteral {
        self
    }
}

/// Builds a list literal from values.
///
/// ```
/// use querysift::literal::list;
///
/// assert_eq!(list([1, 2, 3]).to_string(), "['1', '2', '3']");
/// ```
pub fn list<I>(values: I) -> RawLiteral
where
    I: IntoIterator,
    I::Item: LiteralValue,
{
    RawLiteral::List(values.into_iter().map(|v| v.to_atom()).collect())
}

/// Encodes a value as quoted literal text, ready to splice into a query.
pub fn encode<T: LiteralValue + ?Sized>(value: &T) -> String {
    value.to_atom().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text(atom: Atom) -> String {
        atom.as_text().map(str::to_string).unwrap_or_default()
    }

    #[test]
    fn quoting_escapes() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn decode_bool() {
        assert_eq!(decode(ScalarKind::Bool, "true"), Ok(Scalar::Bool(true)));
        assert_eq!(decode(ScalarKind::Bool, "False"), Ok(Scalar::Bool(false)));
        assert!(decode(ScalarKind::Bool, "yes").is_err());
    }

    #[test]
    fn decode_char() {
        assert_eq!(decode(ScalarKind::Char, "é"), Ok(Scalar::Char('é')));
        assert!(decode(ScalarKind::Char, "ab").is_err());
        assert!(decode(ScalarKind::Char, "").is_err());
    }

    #[test]
    fn decode_integers_checks_width() {
        assert_eq!(decode(ScalarKind::I8, "-128"), Ok(Scalar::Int(-128)));
        assert!(decode(ScalarKind::I8, "128").is_err());
        assert_eq!(decode(ScalarKind::U16, "65535"), Ok(Scalar::UInt(65535)));
        assert!(decode(ScalarKind::U32, "-1").is_err());
        assert!(decode(ScalarKind::I64, "1.5").is_err());
        assert!(decode(ScalarKind::I32, " 1").is_err());
    }

    #[test]
    fn decode_floats() {
        assert_eq!(decode(ScalarKind::F64, "0.1"), Ok(Scalar::F64(0.1)));
        assert_eq!(decode(ScalarKind::F32, "1e3"), Ok(Scalar::F32(1000.0)));
        assert_eq!(
            decode(ScalarKind::F64, "-inf"),
            Ok(Scalar::F64(f64::NEG_INFINITY))
        );
        assert!(matches!(decode(ScalarKind::F64, "NaN"), Ok(Scalar::F64(n)) if n.is_nan()));
        assert!(decode(ScalarKind::F64, "one").is_err());
    }

    #[test]
    fn decode_decimal_and_uuid() {
        assert_eq!(
            decode(ScalarKind::Decimal, "12.50"),
            Ok(Scalar::Decimal(BigDecimal::from_str("12.5").unwrap()))
        );
        assert!(decode(ScalarKind::Decimal, "12,5").is_err());
        assert_eq!(
            decode(ScalarKind::Uuid, "00000000-0000-0000-0000-000000000000"),
            Ok(Scalar::Uuid(Uuid::nil()))
        );
        assert!(decode(ScalarKind::Uuid, "not-a-uuid").is_err());
    }

    #[test]
    fn decode_date_time_requires_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 13, 45, 0).unwrap();
        match decode(ScalarKind::DateTime, "2024-02-29T15:45:00+02:00") {
            Ok(Scalar::DateTime(t)) => assert_eq!(t, expected),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(decode(ScalarKind::DateTime, "2024-02-29").is_err());
        assert!(decode(ScalarKind::DateTime, "29/02/2024 13:45").is_err());
        assert!(decode(ScalarKind::DateTime, "2024-02-29T13:45:00").is_err());
    }

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(TimeDelta::zero()), "00:00:00");
        assert_eq!(format_duration(TimeDelta::seconds(90)), "00:01:30");
        assert_eq!(
            format_duration(TimeDelta::days(2) + TimeDelta::hours(3)),
            "2.03:00:00"
        );
        assert_eq!(
            format_duration(-TimeDelta::milliseconds(1500)),
            "-00:00:01.5"
        );
        assert_eq!(
            format_duration(TimeDelta::nanoseconds(1)),
            "00:00:00.000000001"
        );
    }

    #[test]
    fn duration_parse() {
        assert_eq!(parse_duration("00:01:30"), Ok(TimeDelta::seconds(90)));
        assert_eq!(
            parse_duration("1.00:00:00.25"),
            Ok(TimeDelta::days(1) + TimeDelta::milliseconds(250))
        );
        assert_eq!(parse_duration("-00:00:05"), Ok(-TimeDelta::seconds(5)));
        assert!(parse_duration("1:00:00").is_err());
        assert!(parse_duration("00:60:00").is_err());
        assert!(parse_duration("24:00:00").is_err());
        assert!(parse_duration("00:00:00.").is_err());
        assert!(parse_duration("00:00:00.1234567890").is_err());
        assert!(parse_duration("PT5M").is_err());
    }

    #[test]
    fn encoders() {
        assert_eq!(text(true.to_atom()), "true");
        assert_eq!(text(0.1f64.to_atom()), "0.1");
        assert_eq!(text(1e300f64.to_atom()), "1e300");
        assert_eq!(text("abc".to_atom()), "abc");
        assert_eq!(None::<i32>.to_atom(), Atom::Null);
        assert_eq!(text(Uuid::nil().to_atom()), "00000000-0000-0000-0000-000000000000");
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(text(t.to_atom()), "2024-01-02T03:04:05Z");
    }

    #[test]
    fn encode_quotes_and_sentinels() {
        assert_eq!(encode("O'Brien"), r"'O\'Brien'");
        assert_eq!(encode(&None::<String>), NULL_SENTINEL);
        assert_eq!(encode(&42u8), "'42'");
    }

    #[test]
    fn list_literals() {
        assert_eq!(
            list([Some(1), None]),
            RawLiteral::List(vec![Atom::text("1"), Atom::Null])
        );
        assert_eq!(list(["a", "b"]).to_string(), "['a', 'b']");
    }

    #[test]
    fn into_literal() {
        assert_eq!(5i32.into_literal(), RawLiteral::text("5"));
        assert_eq!(RawLiteral::null().into_literal(), RawLiteral::null());
    }
}
