//! 宽松的反序列化辅助函数
//!
//! 后端的金额/读数字段有时是 JSON 数字，有时是数字字符串（如 `"1523.50"`），
//! 这里统一接受两种写法。

use serde::{Deserialize, Deserializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
    Null,
}

fn parse_text<E: Error>(s: &str) -> Result<Option<f64>, E> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| E::custom(format!("invalid number: {:?}", s)))
}

/// 数字或数字字符串，`null`/空串视为 0
pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient_opt_f64(deserializer)?.unwrap_or(0.0))
}

/// 数字或数字字符串，`null`/空串视为 `None`
pub fn lenient_opt_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(Some(n)),
        NumberOrString::Text(s) => parse_text(&s),
        NumberOrString::Null => Ok(None),
    }
}

/// 计数字段（`pending`、`totaltenants` 等），同样接受字符串
pub fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = lenient_opt_f64(deserializer)?.unwrap_or(0.0);
    if value < 0.0 || value.fract() != 0.0 {
        return Err(D::Error::custom(format!("invalid count: {}", value)));
    }
    Ok(value as u64)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// 字符串字段（如 `unit_number`）有时以数字下发
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

pub fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Integer(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "lenient_f64")]
        amount: f64,
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        reading: Option<f64>,
        #[serde(deserialize_with = "lenient_u64")]
        count: u64,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let s: Sample =
            serde_json::from_str(r#"{"amount":"1,523.50","reading":12,"count":"4"}"#).unwrap();
        assert_eq!(s.amount, 1523.5);
        assert_eq!(s.reading, Some(12.0));
        assert_eq!(s.count, 4);
    }

    #[test]
    fn null_and_blank_become_defaults() {
        let s: Sample = serde_json::from_str(r#"{"amount":null,"reading":"","count":0}"#).unwrap();
        assert_eq!(s.amount, 0.0);
        assert_eq!(s.reading, None);
    }

    #[derive(Deserialize)]
    struct Labelled {
        #[serde(deserialize_with = "lenient_string")]
        unit_number: String,
        #[serde(default, deserialize_with = "lenient_opt_string")]
        tenant: Option<String>,
    }

    #[test]
    fn numbers_are_accepted_as_strings() {
        let l: Labelled = serde_json::from_str(r#"{"unit_number":101,"tenant":null}"#).unwrap();
        assert_eq!(l.unit_number, "101");
        assert_eq!(l.tenant, None);
    }

    #[test]
    fn garbage_is_rejected() {
        let r = serde_json::from_str::<Sample>(r#"{"amount":"abc","count":1}"#);
        assert!(r.is_err());
    }
}
