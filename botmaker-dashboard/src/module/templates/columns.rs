use botmaker_common::{Field, TemplateRow};
use serde::{Deserialize, Serialize};

/// How column headers and filter controls are labelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Upstream keys, e.g. `phoneLinesNumbers`
    #[default]
    Keys,
    /// Portuguese labels, e.g. `Telefones`
    Localized,
}

/// Which fields are shown and exported, in what order, under which labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    fields: Vec<Field>,
    labels: LabelStyle,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(Field::ALL.to_vec(), LabelStyle::Keys)
    }
}

impl ColumnLayout {
    /// Duplicate fields are dropped, keeping the first occurrence.
    pub fn new(fields: Vec<Field>, labels: LabelStyle) -> Self {
        let mut unique = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Self {
            fields: unique,
            labels,
        }
    }

    pub fn label(&self, field: Field) -> &'static str {
        match self.labels {
            LabelStyle::Keys => field.key(),
            LabelStyle::Localized => field.localized_label(),
        }
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| self.label(*f)).collect()
    }

    pub fn cells<'a>(&self, row: &'a TemplateRow) -> Vec<&'a str> {
        self.fields.iter().map(|f| row.value(*f)).collect()
    }

}
