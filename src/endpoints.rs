use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::types::{ExportKind, QueryParams};

/// Address the scanner backend listens on by default.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Characters `encodeURIComponent` leaves untouched besides ASCII alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds request URLs for the scanner backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET /scan?query=<escaped>&pages=<raw>`
    pub fn scan_url(&self, params: &QueryParams) -> String {
        format!("{}/scan?{}", self.base, query_string(params))
    }

    /// `GET /export/<kind>?query=<escaped>&pages=<raw>`
    pub fn export_url(&self, kind: ExportKind, params: &QueryParams) -> String {
        format!(
            "{}/export/{}?{}",
            self.base,
            kind.path_segment(),
            query_string(params)
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Percent-escape a single URL component with `encodeURIComponent` rules.
pub fn escape_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn query_string(params: &QueryParams) -> String {
    // pages goes out exactly as typed
    format!(
        "query={}&pages={}",
        escape_component(&params.query),
        params.pages
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str, pages: &str) -> QueryParams {
        QueryParams {
            query: query.into(),
            pages: pages.into(),
        }
    }

    #[test]
    fn export_csv_url() {
        let e = Endpoints::default();
        assert_eq!(
            e.export_url(ExportKind::Csv, &params("sofa", "3")),
            "http://127.0.0.1:8000/export/csv?query=sofa&pages=3"
        );
    }

    #[test]
    fn scan_url_escapes_query_only() {
        let e = Endpoints::new("http://localhost:9000/");
        assert_eq!(
            e.scan_url(&params("mesa de jantar & cadeiras", "2")),
            "http://localhost:9000/scan?query=mesa%20de%20jantar%20%26%20cadeiras&pages=2"
        );
    }

    #[test]
    fn escape_matches_uri_component_rules() {
        assert_eq!(escape_component("a-b_c.d!e~f*g'h(i)"), "a-b_c.d!e~f*g'h(i)");
        assert_eq!(escape_component("sofá/cama?"), "sof%C3%A1%2Fcama%3F");
        assert_eq!(escape_component("1+1=2"), "1%2B1%3D2");
    }

    #[test]
    fn pages_passed_verbatim() {
        let e = Endpoints::default();
        assert_eq!(
            e.export_url(ExportKind::Xls, &params("tv", " 10")),
            "http://127.0.0.1:8000/export/xls?query=tv&pages= 10"
        );
    }
}
