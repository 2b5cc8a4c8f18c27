///! BotMaker WhatsApp template dashboard
///!
///! Fetches the template list from the BotMaker API, keeps it in a
///! single-slot TTL cache, filters it by user selection and exports
///! the filtered rows as CSV.
///!
///! ## Data flow
///! `ApiClient` → `TemplateCache` → `normalize_all` → `apply_filters` → `render` / `to_csv`

mod error;
pub use error::{ExportError, FetchError};

mod api_client;
pub use api_client::{ApiClient, TemplateSource, parse_envelope, ACCESS_TOKEN_HEADER};

mod cache;
pub use cache::{Clock, FetchOutcome, SystemClock, TemplateCache};
#[cfg(test)]
pub(crate) use cache::tests as test_support;

mod columns;
pub use columns::{ColumnLayout, LabelStyle};

mod filter;
pub use filter::{FilterSelection, apply_filters, field_options};

mod export;
pub use export::{CSV_BOM, CSV_MIME, Summary, export_filename, to_csv};

mod view;
pub use view::{
    DashboardState, DashboardView, FilterControl, FilterOption,
    EMPTY_RESULT_WARNING, render,
};
