///! Multi-select filtering over normalized template rows
use botmaker_common::{Field, TemplateRow};
use std::collections::BTreeSet;

/// Selected values per filterable field. An empty set means "any value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub name: BTreeSet<String>,
    pub state: BTreeSet<String>,
    pub phone_lines: BTreeSet<String>,
    pub category: BTreeSet<String>,
}

impl FilterSelection {
    /// Selected values for `field`; `None` for fields that cannot be filtered.
    pub fn values(&self, field: Field) -> Option<&BTreeSet<String>> {
        match field {
            Field::Name => Some(&self.name),
            Field::State => Some(&self.state),
            Field::PhoneLines => Some(&self.phone_lines),
            Field::Category => Some(&self.category),
            Field::BotName | Field::RequesterEmail => None,
        }
    }

    fn values_mut(&mut self, field: Field) -> Option<&mut BTreeSet<String>> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::State => Some(&mut self.state),
            Field::PhoneLines => Some(&mut self.phone_lines),
            Field::Category => Some(&mut self.category),
            Field::BotName | Field::RequesterEmail => None,
        }
    }

    /// Add a selected value. Returns false if `field` is not filterable.
    pub fn select(&mut self, field: Field, value: impl Into<String>) -> bool {
        match self.values_mut(field) {
            Some(values) => {
                values.insert(value.into());
                true
            }
            None => false,
        }
    }

    pub fn is_selected(&self, field: Field, value: &str) -> bool {
        self.values(field).is_some_and(|v| v.contains(value))
    }

    /// Build a selection from `field=value` pairs, e.g. a decoded query string.
    ///
    /// Unknown keys and non-filterable fields are ignored. An empty value is
    /// kept: it selects rows whose field is empty.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut selection = Self::default();
        for (key, value) in pairs {
            let Ok(field) = key.as_ref().parse::<Field>() else {
                continue;
            };
            selection.select(field, value);
        }
        selection
    }

    /// Inverse of [`FilterSelection::from_pairs`].
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        Field::FILTERABLE
            .iter()
            .flat_map(|field| {
                self.values(*field)
                    .into_iter()
                    .flatten()
                    .map(move |v| (field.as_str(), v.as_str()))
            })
            .collect()
    }

    /// Whether `row` passes every active field constraint.
    pub fn matches(&self, row: &TemplateRow) -> bool {
        Field::FILTERABLE.iter().all(|field| match self.values(*field) {
            Some(values) if !values.is_empty() => values.contains(row.value(*field)),
            _ => true,
        })
    }
}

/// Rows matching all active filters, in their original order.
pub fn apply_filters(rows: &[TemplateRow], selection: &FilterSelection) -> Vec<TemplateRow> {
    rows.iter()
        .filter(|row| selection.matches(row))
        .cloned()
        .collect()
}

/// Distinct values of `field` across `rows`, sorted.
///
/// Always computed from the full row set so options never narrow as other
/// filters are applied.
pub fn field_options(rows: &[TemplateRow], field: Field) -> Vec<String> {
    rows.iter()
        .map(|row| row.value(field).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
