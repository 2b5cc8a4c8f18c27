///! Pure view model for the dashboard page
///!
///! `render` turns one fetch outcome plus the current filter selection into
///! everything the page shows. It is re-run on every request.
use super::cache::FetchOutcome;
use super::columns::ColumnLayout;
use super::export::Summary;
use super::filter::{FilterSelection, apply_filters, field_options};
use botmaker_common::{Field, TemplateRow, normalize_all};

pub const EMPTY_RESULT_WARNING: &str = "No templates found or failed to load data.";

/// Input of one render cycle.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub rows: Vec<TemplateRow>,
    pub fetch_error: Option<String>,
    pub selection: FilterSelection,
}

impl DashboardState {
    pub fn new(outcome: &FetchOutcome, selection: FilterSelection) -> Self {
        Self {
            rows: normalize_all(&outcome.templates),
            fetch_error: outcome.error.clone(),
            selection,
        }
    }

    pub fn filtered_rows(&self) -> Vec<TemplateRow> {
        apply_filters(&self.rows, &self.selection)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub selected: bool,
}

/// One multi-select in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    pub param: &'static str,
    pub label: &'static str,
    pub options: Vec<FilterOption>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub error: Option<String>,
    pub warning: Option<String>,
    pub summary: Summary,
    pub filters: Vec<FilterControl>,
    pub headers: Vec<&'static str>,
    pub table: Vec<Vec<String>>,
    pub rows: Vec<TemplateRow>,
    /// Encoded selection, appended to the export link
    pub query: String,
}

impl DashboardView {
    /// False when the cycle produced no records and everything below the banners is skipped.
    pub fn has_data(&self) -> bool {
        self.warning.is_none()
    }
}

pub fn render(state: &DashboardState, layout: &ColumnLayout) -> DashboardView {
    let error = state
        .fetch_error
        .as_ref()
        .map(|e| format!("Error fetching templates: {}", e));

    if state.rows.is_empty() {
        return DashboardView {
            error,
            warning: Some(EMPTY_RESULT_WARNING.to_string()),
            ..Default::default()
        };
    }

    let filters = Field::FILTERABLE
        .iter()
        .map(|field| FilterControl {
            param: field.as_str(),
            label: layout.label(*field),
            options: field_options(&state.rows, *field)
                .into_iter()
                .map(|value| FilterOption {
                    selected: state.selection.is_selected(*field, &value),
                    value,
                })
                .collect(),
        })
        .collect();

    let rows = state.filtered_rows();
    let table = rows
        .iter()
        .map(|row| layout.cells(row).into_iter().map(str::to_string).collect())
        .collect();

    DashboardView {
        error,
        warning: None,
        summary: Summary::new(&state.rows, &rows),
        filters,
        headers: layout.headers(),
        table,
        query: serde_urlencoded::to_string(state.selection.to_pairs()).unwrap_or_default(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botmaker_common::RawTemplate;
    use chrono::Utc;

    fn outcome(body: &str) -> FetchOutcome {
        FetchOutcome {
            templates: crate::module::templates::parse_envelope(body).unwrap(),
            error: None,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_template_end_to_end() {
        let outcome = outcome(
            r#"{"items":[{"name":"t1","state":"approved","phoneLinesNumbers":["111"],"botName":"bot1","category":"marketing"}]}"#,
        );
        let state = DashboardState::new(&outcome, FilterSelection::default());
        let layout = ColumnLayout::default();
        let view = render(&state, &layout);

        assert!(view.has_data());
        assert_eq!(view.summary.total, 1);
        assert_eq!(view.summary.filtered, 1);
        assert_eq!(
            view.rows[0],
            TemplateRow {
                name: "t1".to_string(),
                state: "approved".to_string(),
                phone_lines: "111".to_string(),
                bot_name: "bot1".to_string(),
                category: "marketing".to_string(),
                requester_email: String::new(),
            }
        );

        let csv = crate::module::templates::to_csv(&view.rows, &layout).unwrap();
        let text = String::from_utf8(csv).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_empty_outcome_skips_rendering() {
        let outcome = FetchOutcome {
            templates: Vec::new(),
            error: Some("request timed out: deadline".to_string()),
            fetched_at: Utc::now(),
        };
        let view = render(
            &DashboardState::new(&outcome, FilterSelection::default()),
            &ColumnLayout::default(),
        );

        assert!(!view.has_data());
        assert_eq!(view.warning.as_deref(), Some(EMPTY_RESULT_WARNING));
        assert_eq!(
            view.error.as_deref(),
            Some("Error fetching templates: request timed out: deadline")
        );
        assert!(view.filters.is_empty());
        assert!(view.table.is_empty());
    }

    #[test]
    fn test_filters_keep_full_option_lists() {
        let templates = vec![
            RawTemplate {
                name: Some("b".to_string()),
                state: Some("approved".to_string()),
                ..Default::default()
            },
            RawTemplate {
                name: Some("a".to_string()),
                state: Some("rejected".to_string()),
                ..Default::default()
            },
        ];
        let outcome = FetchOutcome {
            templates,
            error: None,
            fetched_at: Utc::now(),
        };
        let selection = FilterSelection::from_pairs([("state", "approved")]);
        let view = render(&DashboardState::new(&outcome, selection), &ColumnLayout::default());

        assert_eq!(view.summary.total, 2);
        assert_eq!(view.summary.filtered, 1);
        assert_eq!(view.table, vec![vec!["b", "approved", "", "", "", ""]]);
        assert_eq!(view.query, "state=approved");

        let names = view.filters.iter().find(|f| f.param == "name").unwrap();
        let values: Vec<&str> = names.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b"]);

        let states = view.filters.iter().find(|f| f.param == "state").unwrap();
        assert!(states.options.iter().any(|o| o.value == "approved" && o.selected));
        assert!(states.options.iter().any(|o| o.value == "rejected" && !o.selected));
    }
}
