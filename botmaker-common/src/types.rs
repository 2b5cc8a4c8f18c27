use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Column of a normalized template row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "state")]
    State,
    #[serde(rename = "phoneLines", alias = "phoneLinesNumbers")]
    PhoneLines,
    #[serde(rename = "botName")]
    BotName,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "requesterEmail")]
    RequesterEmail,
}

impl Field {
    /// Every field, in canonical row order.
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::State,
        Field::PhoneLines,
        Field::BotName,
        Field::Category,
        Field::RequesterEmail,
    ];

    /// The fields a user can filter on, in sidebar order.
    pub const FILTERABLE: [Field; 4] = [
        Field::PhoneLines,
        Field::Name,
        Field::State,
        Field::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::State => "state",
            Field::PhoneLines => "phoneLines",
            Field::BotName => "botName",
            Field::Category => "category",
            Field::RequesterEmail => "requesterEmail",
        }
    }

    /// Upstream key, used as the English column header.
    pub fn key(&self) -> &'static str {
        match self {
            Field::PhoneLines => "phoneLinesNumbers",
            other => other.as_str(),
        }
    }

    /// Portuguese column label.
    pub fn localized_label(&self) -> &'static str {
        match self {
            Field::Name => "Nome do Template",
            Field::State => "Estado",
            Field::PhoneLines => "Telefones",
            Field::BotName => "Nome do Bot",
            Field::Category => "Categoria",
            Field::RequesterEmail => "E-mail do Solicitante",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "state" => Ok(Field::State),
            "phoneLines" | "phoneLinesNumbers" => Ok(Field::PhoneLines),
            "botName" => Ok(Field::BotName),
            "category" => Ok(Field::Category),
            "requesterEmail" => Ok(Field::RequesterEmail),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

/// One template record as returned by the BotMaker API.
///
/// Every field is optional. Scalars of an unexpected type are kept as their
/// JSON text so a single odd record never fails the whole fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub phone_lines_numbers: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bot_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub requester_email: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let list = match Value::deserialize(deserializer)? {
        Value::Array(values) => Some(values.into_iter().filter_map(scalar_text).collect()),
        Value::Null => None,
        other => scalar_text(other).map(|s| vec![s]),
    };
    Ok(list)
}

/// Display-ready template row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRow {
    pub name: String,
    pub state: String,
    pub phone_lines: String,
    pub bot_name: String,
    pub category: String,
    pub requester_email: String,
}

impl TemplateRow {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::State => &self.state,
            Field::PhoneLines => &self.phone_lines,
            Field::BotName => &self.bot_name,
            Field::Category => &self.category,
            Field::RequesterEmail => &self.requester_email,
        }
    }
}

/// Map a raw record onto the fixed row shape. Never fails.
pub fn normalize(raw: &RawTemplate) -> TemplateRow {
    TemplateRow {
        name: raw.name.clone().unwrap_or_default(),
        state: raw.state.clone().unwrap_or_default(),
        phone_lines: raw
            .phone_lines_numbers
            .as_deref()
            .map(|numbers| numbers.join(", "))
            .unwrap_or_default(),
        bot_name: raw.bot_name.clone().unwrap_or_default(),
        category: raw.category.clone().unwrap_or_default(),
        requester_email: raw.requester_email.clone().unwrap_or_default(),
    }
}

/// Normalize a whole fetch result, keeping order and length.
pub fn normalize_all(raw: &[RawTemplate]) -> Vec<TemplateRow> {
    raw.iter().map(normalize).collect()
}
