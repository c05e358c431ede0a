//! Loosely-typed descriptors.
//!
//! Descriptors often arrive as plain JSON objects where a field may be a string or an
//! array. These conversions map that shape onto the typed descriptors:
//!
//! - `columns`: absent, `null`, `""` or `"*"` select everything; an array lists columns;
//!   any other string is a single column.
//! - `from`: a string or an array of strings.
//! - `where`: a string is inlined, an array is space-joined (`null`, object and nested
//!   array entries are skipped), anything else means no WHERE clause at all.
//! - INSERT `values`: each JSON value is bound with a native Postgres type, see
//!   [`JsonParam`].

use crate::error::{DbError, DbResult};
use crate::qb::insert::InsertQuery;
use crate::qb::param::{Param, ParamList};
use crate::qb::select::{Columns, Predicate, SelectQuery, Tables};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

impl TryFrom<Value> for SelectQuery {
    type Error = DbError;

    fn try_from(value: Value) -> DbResult<Self> {
        let mut obj = into_object(value, "SELECT")?;
        Ok(SelectQuery {
            columns: columns_from_json(obj.remove("columns"))?,
            from: tables_from_json(obj.remove("from"))?,
            filter: predicate_from_json(obj.remove("where")),
        })
    }
}

impl TryFrom<Value> for InsertQuery {
    type Error = DbError;

    fn try_from(value: Value) -> DbResult<Self> {
        let mut obj = into_object(value, "INSERT")?;

        let into = match obj.remove("into") {
            Some(Value::String(table)) => table,
            _ => return Err(DbError::descriptor("`into` must be a table name")),
        };
        let columns = match obj.remove("columns") {
            Some(Value::Array(items)) => string_list(items, "columns")?,
            _ => return Err(DbError::descriptor("`columns` must be an array of names")),
        };
        let values = match obj.remove("values") {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|v| Param::new(JsonParam::from(v)))
                .collect::<ParamList>(),
            _ => return Err(DbError::descriptor("`values` must be an array")),
        };

        Ok(InsertQuery {
            into,
            columns,
            values,
        })
    }
}

impl InsertQuery {
    /// Map a loosely-typed `{into, columns, values}` object.
    pub fn from_json(value: Value) -> DbResult<Self> {
        Self::try_from(value)
    }
}

impl SelectQuery {
    /// Map a loosely-typed `{columns, from, where}` object.
    pub fn from_json(value: Value) -> DbResult<Self> {
        Self::try_from(value)
    }
}

fn into_object(value: Value, kind: &str) -> DbResult<Map<String, Value>> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(DbError::descriptor(format!(
            "{kind} descriptor must be an object, got {other}"
        ))),
    }
}

fn columns_from_json(value: Option<Value>) -> DbResult<Columns> {
    match value {
        None | Some(Value::Null) => Ok(Columns::All),
        Some(Value::String(s)) if s.is_empty() || s == "*" => Ok(Columns::All),
        Some(Value::String(s)) => Ok(Columns::List(vec![s])),
        Some(Value::Array(items)) => Ok(Columns::List(string_list(items, "columns")?)),
        Some(other) => Err(DbError::descriptor(format!(
            "`columns` must be \"*\" or an array of names, got {other}"
        ))),
    }
}

fn tables_from_json(value: Option<Value>) -> DbResult<Tables> {
    match value {
        Some(Value::String(table)) => Ok(Tables::One(table)),
        Some(Value::Array(items)) => Ok(Tables::Many(string_list(items, "from")?)),
        Some(other) => Err(DbError::descriptor(format!(
            "`from` must be a table name or an array of names, got {other}"
        ))),
        None => Err(DbError::descriptor("`from` is required")),
    }
}

fn predicate_from_json(value: Option<Value>) -> Option<Predicate> {
    match value {
        Some(Value::String(text)) => Some(Predicate::Raw(text)),
        Some(Value::Array(items)) => Some(Predicate::Parts(
            items.iter().filter_map(scalar_text).collect(),
        )),
        _ => None,
    }
}

/// Strings pass through; numbers and booleans are rendered as text.
fn string_list(items: Vec<Value>, field: &str) -> DbResult<Vec<String>> {
    items
        .iter()
        .map(|item| {
            scalar_text(item).ok_or_else(|| {
                DbError::descriptor(format!("`{field}` entries must be strings, got {item}"))
            })
        })
        .collect()
}

fn scalar_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A JSON value bound as a native Postgres parameter.
///
/// The encoding follows the parameter type the server reports:
///
/// | value | binds to |
/// |-------|----------|
/// | `null` | NULL, any type |
/// | bool | `bool`, `json`/`jsonb`, text types |
/// | integer | `int2`/`int4`/`int8`, `float4`/`float8`, `numeric`*, `json`/`jsonb`, text types |
/// | float | `float4`/`float8`, `numeric`*, `json`/`jsonb`, text types |
/// | string | text types, parsed into `bool`, integers, floats, `numeric`*, `date`, `time`, `timestamp`, `timestamptz`, `uuid`, `json`/`jsonb` |
/// | array, object | `json`/`jsonb`, text types |
///
/// `*` needs the `rust_decimal` feature. Any other pairing fails at bind time with a
/// [`DbError::Descriptor`] naming the value and the type.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(Value),
}

impl From<Value> for JsonParam {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonParam::Null,
            Value::Bool(b) => JsonParam::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => JsonParam::Int(i),
                None => JsonParam::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => JsonParam::Text(s),
            other => JsonParam::Json(other),
        }
    }
}

type BindError = Box<dyn Error + Sync + Send>;

impl JsonParam {
    fn unsupported(&self, ty: &Type) -> BindError {
        DbError::descriptor(format!(
            "JSON value {self:?} cannot be bound to a `{ty}` parameter"
        ))
        .into()
    }
}

fn is_text(ty: &Type) -> bool {
    <String as ToSql>::accepts(ty)
}

fn unreadable(s: &str, ty: &Type, cause: impl Display) -> BindError {
    DbError::descriptor(format!("cannot read {s:?} as `{ty}`: {cause}")).into()
}

fn parse<T>(s: &str, ty: &Type) -> Result<T, BindError>
where
    T: FromStr,
    T::Err: Display,
{
    s.trim().parse().map_err(|e| unreadable(s, ty, e))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// `2024-01-01T10:30:00`, `2024-01-01 10:30:00.5` or a bare date at midnight.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| s.parse::<NaiveDate>().ok().map(|d| d.and_time(NaiveTime::MIN)))
}

/// Offsets are normalized to UTC; a timestamp without one is taken as UTC.
fn parse_timestamptz(s: &str) -> Option<DateTime<Utc>> {
    s.trim()
        .parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| parse_timestamp(s).map(|naive| naive.and_utc()))
}

impl ToSql for JsonParam {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BindError> {
        match self {
            JsonParam::Null => Ok(IsNull::Yes),
            JsonParam::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                Type::JSON | Type::JSONB => Value::Bool(*b).to_sql(ty, out),
                _ if is_text(ty) => b.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            JsonParam::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => rust_decimal::Decimal::from(*i).to_sql(ty, out),
                Type::JSON | Type::JSONB => Value::from(*i).to_sql(ty, out),
                _ if is_text(ty) => i.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            JsonParam::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => rust_decimal::Decimal::try_from(*f)?.to_sql(ty, out),
                Type::JSON | Type::JSONB => Value::from(*f).to_sql(ty, out),
                _ if is_text(ty) => f.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            JsonParam::Text(s) => match *ty {
                _ if is_text(ty) => s.to_sql(ty, out),
                Type::BOOL => parse_bool(s)
                    .ok_or_else(|| unreadable(s, ty, "not a boolean"))?
                    .to_sql(ty, out),
                Type::INT2 => parse::<i16>(s, ty)?.to_sql(ty, out),
                Type::INT4 => parse::<i32>(s, ty)?.to_sql(ty, out),
                Type::INT8 => parse::<i64>(s, ty)?.to_sql(ty, out),
                Type::FLOAT4 => parse::<f32>(s, ty)?.to_sql(ty, out),
                Type::FLOAT8 => parse::<f64>(s, ty)?.to_sql(ty, out),
                #[cfg(feature = "rust_decimal")]
                Type::NUMERIC => parse::<rust_decimal::Decimal>(s, ty)?.to_sql(ty, out),
                Type::DATE => parse::<NaiveDate>(s, ty)?.to_sql(ty, out),
                Type::TIME => parse::<NaiveTime>(s, ty)?.to_sql(ty, out),
                Type::TIMESTAMP => parse_timestamp(s)
                    .ok_or_else(|| unreadable(s, ty, "not a timestamp"))?
                    .to_sql(ty, out),
                Type::TIMESTAMPTZ => parse_timestamptz(s)
                    .ok_or_else(|| unreadable(s, ty, "not a timestamp"))?
                    .to_sql(ty, out),
                Type::UUID => parse::<Uuid>(s, ty)?.to_sql(ty, out),
                // A string that is not itself JSON is stored as a JSON string.
                Type::JSON | Type::JSONB => serde_json::from_str::<Value>(s)
                    .unwrap_or_else(|_| Value::String(s.clone()))
                    .to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            JsonParam::Json(v) => match *ty {
                Type::JSON | Type::JSONB => v.to_sql(ty, out),
                _ if is_text(ty) => v.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
        }
    }

    /// `null` binds to every type, so every type is accepted here. Non-null values
    /// without an encoding for `ty` are rejected by `to_sql`.
    fn accepts(_: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn bind(param: JsonParam, ty: &Type) -> Result<BytesMut, String> {
        let mut buf = BytesMut::new();
        param
            .to_sql_checked(ty, &mut buf)
            .map(|_| buf)
            .map_err(|e| e.to_string())
    }

    fn encoded<T: ToSql>(value: T, ty: &Type) -> BytesMut {
        let mut buf = BytesMut::new();
        value.to_sql_checked(ty, &mut buf).unwrap();
        buf
    }

    fn text(s: &str) -> JsonParam {
        JsonParam::Text(s.to_string())
    }

    #[test]
    fn int_narrows_to_int4() {
        let mut buf = BytesMut::new();
        let res = JsonParam::Int(7).to_sql_checked(&Type::INT4, &mut buf);
        assert!(matches!(res, Ok(IsNull::No)));
        assert_eq!(&buf[..], &7i32.to_be_bytes());
    }

    #[test]
    fn int_out_of_range_for_int2_errors() {
        let mut buf = BytesMut::new();
        assert!(JsonParam::Int(70_000).to_sql_checked(&Type::INT2, &mut buf).is_err());
    }

    #[test]
    fn null_binds_for_any_type() {
        let mut buf = BytesMut::new();
        let res = JsonParam::Null.to_sql_checked(&Type::UUID, &mut buf);
        assert!(matches!(res, Ok(IsNull::Yes)));
    }

    #[test]
    fn text_into_int_column_is_rejected() {
        let err = bind(text("x"), &Type::INT8).unwrap_err();
        assert!(err.contains("\"x\""), "{err}");
        assert!(err.contains("int8"), "{err}");
    }

    #[test]
    fn text_into_int_column_is_parsed() {
        assert_eq!(bind(text(" 7 "), &Type::INT4).unwrap(), encoded(7i32, &Type::INT4));
        assert_eq!(bind(text("t"), &Type::BOOL).unwrap(), encoded(true, &Type::BOOL));
    }

    #[test]
    fn scalars_into_text_columns() {
        assert_eq!(&bind(JsonParam::Int(42), &Type::TEXT).unwrap()[..], b"42");
        assert_eq!(&bind(JsonParam::Float(1.5), &Type::VARCHAR).unwrap()[..], b"1.5");
        assert_eq!(&bind(JsonParam::Bool(true), &Type::TEXT).unwrap()[..], b"true");
        assert_eq!(
            &bind(JsonParam::Json(json!({"k": 1})), &Type::TEXT).unwrap()[..],
            br#"{"k":1}"#
        );
    }

    #[test]
    fn text_into_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            bind(text("2024-01-01"), &Type::DATE).unwrap(),
            encoded(date, &Type::DATE)
        );

        let err = bind(text("not-a-date"), &Type::DATE).unwrap_err();
        assert!(err.contains("not-a-date"), "{err}");
        assert!(err.contains("`date`"), "{err}");
    }

    #[test]
    fn text_into_timestamp_takes_space_or_t() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let expected = encoded(ts, &Type::TIMESTAMP);
        assert_eq!(bind(text("2024-01-01T10:30:00"), &Type::TIMESTAMP).unwrap(), expected);
        assert_eq!(bind(text("2024-01-01 10:30:00"), &Type::TIMESTAMP).unwrap(), expected);
    }

    #[test]
    fn text_into_timestamptz_normalizes_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();
        let expected = encoded(utc, &Type::TIMESTAMPTZ);
        assert_eq!(
            bind(text("2024-01-01T12:30:00+02:00"), &Type::TIMESTAMPTZ).unwrap(),
            expected
        );
        assert_eq!(
            bind(text("2024-01-01 10:30:00"), &Type::TIMESTAMPTZ).unwrap(),
            expected
        );
    }

    #[test]
    fn text_into_uuid() {
        let raw = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let id = Uuid::parse_str(raw).unwrap();
        assert_eq!(bind(text(raw), &Type::UUID).unwrap(), encoded(id, &Type::UUID));
        assert!(bind(text("nope"), &Type::UUID).is_err());
    }

    #[test]
    fn text_into_jsonb() {
        assert_eq!(
            bind(text(r#"{"a": 1}"#), &Type::JSONB).unwrap(),
            encoded(json!({"a": 1}), &Type::JSONB)
        );
        assert_eq!(
            bind(text("plain"), &Type::JSONB).unwrap(),
            encoded(json!("plain"), &Type::JSONB)
        );
    }

    #[cfg(feature = "rust_decimal")]
    #[test]
    fn numbers_into_numeric() {
        use rust_decimal::Decimal;

        assert_eq!(
            bind(JsonParam::Int(42), &Type::NUMERIC).unwrap(),
            encoded(Decimal::from(42), &Type::NUMERIC)
        );
        assert_eq!(
            bind(JsonParam::Float(1.5), &Type::NUMERIC).unwrap(),
            encoded(Decimal::try_from(1.5f64).unwrap(), &Type::NUMERIC)
        );
        assert_eq!(
            bind(text("12.50"), &Type::NUMERIC).unwrap(),
            encoded(Decimal::from_str("12.50").unwrap(), &Type::NUMERIC)
        );
    }

    #[cfg(not(feature = "rust_decimal"))]
    #[test]
    fn numeric_without_decimal_support_is_a_descriptor_error() {
        let err = bind(JsonParam::Int(42), &Type::NUMERIC).unwrap_err();
        assert_eq!(
            err,
            "Descriptor error: JSON value Int(42) cannot be bound to a `numeric` parameter"
        );
    }

    #[test]
    fn unsupported_pairing_names_value_and_type() {
        let err = bind(JsonParam::Int(1), &Type::INET).unwrap_err();
        assert_eq!(
            err,
            "Descriptor error: JSON value Int(1) cannot be bound to a `inet` parameter"
        );
        assert!(bind(JsonParam::Json(json!([1])), &Type::INT4).is_err());
    }

    #[test]
    fn json_value_kinds() {
        assert_eq!(JsonParam::from(json!(null)), JsonParam::Null);
        assert_eq!(JsonParam::from(json!(true)), JsonParam::Bool(true));
        assert_eq!(JsonParam::from(json!(42)), JsonParam::Int(42));
        assert_eq!(JsonParam::from(json!(1.5)), JsonParam::Float(1.5));
        assert_eq!(JsonParam::from(json!("a")), JsonParam::Text("a".into()));
        assert_eq!(
            JsonParam::from(json!({"k": 1})),
            JsonParam::Json(json!({"k": 1}))
        );
    }
}
