//! Builders and decoder for Notion property value fragments.
//!
//! # Design
//! Builders are pure functions returning the JSON fragment the API expects
//! for one property, ready to be placed under a property name in a
//! `properties` object. `decode` goes the other way: it reads a fragment's
//! `type` tag into a `PropertyKind` and matches on it exhaustively. Any
//! shape it cannot read (missing keys, empty arrays, wrong JSON types,
//! unknown tags) yields `None`; decoding never fails loudly.
//!
//! Date and files fragments are recognized but not decoded.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Discriminant of a property fragment, as carried in its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    Checkbox,
    Files,
    Url,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 9] = [
        PropertyKind::Title,
        PropertyKind::RichText,
        PropertyKind::Number,
        PropertyKind::Select,
        PropertyKind::MultiSelect,
        PropertyKind::Date,
        PropertyKind::Checkbox,
        PropertyKind::Files,
        PropertyKind::Url,
    ];

    /// The tag string, which is also the key holding the payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Title => "title",
            PropertyKind::RichText => "rich_text",
            PropertyKind::Number => "number",
            PropertyKind::Select => "select",
            PropertyKind::MultiSelect => "multi_select",
            PropertyKind::Date => "date",
            PropertyKind::Checkbox => "checkbox",
            PropertyKind::Files => "files",
            PropertyKind::Url => "url",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

/// A `type` tag that names no supported property kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported property kind: {0}")]
pub struct UnknownPropertyKind(pub String);

impl FromStr for PropertyKind {
    type Err = UnknownPropertyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownPropertyKind(s.to_string()))
    }
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Content of the first text run of a title or rich_text property.
    Text(String),
    Number(f64),
    Select(String),
    MultiSelect(Vec<String>),
    Checkbox(bool),
    Url(String),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) | PropertyValue::Select(s) | PropertyValue::Url(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

pub fn title(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

/// A rich_text fragment.
///
/// `link` is a bare URL string, not a link object: it is wrapped as
/// `{"url": link}`, and `None` becomes `null`.
pub fn rich_text(text: &str, link: Option<&str>) -> Value {
    let link = link.map(|url| json!({ "url": url }));
    json!({ "rich_text": [{ "text": { "content": text, "link": link } }] })
}

pub fn number(n: f64) -> Value {
    json!({ "number": n })
}

pub fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

/// One `{name}` option per input, in input order.
pub fn multi_select<I, S>(names: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let options: Vec<Value> = names
        .into_iter()
        .map(|name| json!({ "name": name.as_ref() }))
        .collect();
    json!({ "multi_select": options })
}

pub fn date(start: &str, end: Option<&str>) -> Value {
    match end {
        Some(end) => json!({ "date": { "start": start, "end": end } }),
        None => json!({ "date": { "start": start } }),
    }
}

/// External file references. Each URL doubles as the display name.
pub fn files<I, S>(file_urls: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let entries: Vec<Value> = file_urls
        .into_iter()
        .map(|url| {
            let url = url.as_ref();
            json!({ "name": url, "type": "external", "external": { "url": url } })
        })
        .collect();
    json!({ "files": entries })
}

pub fn checkbox(checked: bool) -> Value {
    json!({ "checkbox": checked })
}

pub fn url(u: &str) -> Value {
    json!({ "url": u })
}

/// Decode one property fragment into a primitive value.
///
/// The kind comes from the `type` field. Fragments built locally carry no
/// `type`, so without one the first key naming a known kind is used.
pub fn decode(fragment: &Value) -> Option<PropertyValue> {
    let kind = fragment_kind(fragment)?;
    let payload = fragment.get(kind.as_str())?;
    match kind {
        PropertyKind::Title | PropertyKind::RichText => first_text(payload).map(PropertyValue::Text),
        PropertyKind::Number => payload.as_f64().map(PropertyValue::Number),
        PropertyKind::Select => payload
            .get("name")?
            .as_str()
            .map(|name| PropertyValue::Select(name.to_string())),
        PropertyKind::MultiSelect => payload
            .as_array()?
            .iter()
            .map(|option| option.get("name")?.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(PropertyValue::MultiSelect),
        PropertyKind::Checkbox => payload.as_bool().map(PropertyValue::Checkbox),
        PropertyKind::Url => payload.as_str().map(|u| PropertyValue::Url(u.to_string())),
        PropertyKind::Date | PropertyKind::Files => None,
    }
}

/// Decode every fragment of a `properties` object, keyed by property name.
/// Non-object input yields an empty map.
pub fn decode_properties(properties: &Value) -> BTreeMap<String, Option<PropertyValue>> {
    properties
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(name, fragment)| (name.clone(), decode(fragment)))
                .collect()
        })
        .unwrap_or_default()
}

fn fragment_kind(fragment: &Value) -> Option<PropertyKind> {
    match fragment.get("type") {
        Some(tag) => PropertyKind::from_tag(tag.as_str()?),
        None => fragment
            .as_object()?
            .keys()
            .find_map(|key| PropertyKind::from_tag(key)),
    }
}

fn first_text(runs: &Value) -> Option<String> {
    runs.as_array()?
        .first()?
        .get("text")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
