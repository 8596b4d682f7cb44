//! Paging parameters and the paging metadata returned by list calls.
//!
//! Pages are zero-indexed. The backend reports the total in `X-Total-Count`
//! and neighbouring pages in an RFC 5988 `Link` header; this layer passes
//! both through without enforcing anything about them.

use serde::{Deserialize, Serialize};
use url::Url;

/// Header carrying the total number of records.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Optional query parameters for a list call.
///
/// # Examples
///
/// ```
/// use etudiant_rs_client::QueryCriteria;
///
/// let criteria = QueryCriteria::new().page(1).size(20).sort("id,asc");
/// assert_eq!(criteria.to_query_string(), "page=1&size=20&sort=id%2Casc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCriteria {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort: Vec<String>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub const fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Adds a sort clause such as `id,desc`.
    #[must_use]
    pub fn sort(mut self, clause: impl Into<String>) -> Self {
        self.sort.push(clause.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_none() && self.size.is_none() && self.sort.is_empty()
    }

    /// Encodes the criteria as a query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(size) = self.size {
            serializer.append_pair("size", &size.to_string());
        }
        for clause in &self.sort {
            serializer.append_pair("sort", clause);
        }
        serializer.finish()
    }
}

/// Page numbers advertised by the `Link` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    pub first: Option<usize>,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub last: Option<usize>,
}

impl PageLinks {
    /// Parses a `Link` header such as
    /// `<http://localhost/api/pays?page=1&size=20>; rel="next",<...>; rel="last"`.
    ///
    /// Entries without a `page` parameter or with an unknown `rel` are skipped.
    pub fn parse(header: &str) -> Self {
        let mut links = Self::default();
        let mut rest = header;
        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('>') else { break };
            let target = &after[..end];
            let tail = &after[end + 1..];
            let params_end = tail.find('<').unwrap_or(tail.len());
            let params = &tail[..params_end];

            if let (Some(rel), Some(page)) = (rel_param(params), page_param(target)) {
                match rel.as_str() {
                    "first" => links.first = Some(page),
                    "prev" => links.prev = Some(page),
                    "next" => links.next = Some(page),
                    "last" => links.last = Some(page),
                    _ => {}
                }
            }
            rest = &tail[params_end..];
        }
        links
    }

    /// Renders the header for a page of `size` records out of `total`.
    ///
    /// `base` is the collection URL without query string.
    pub fn render(base: &str, page: usize, size: usize, total: usize) -> String {
        let size = size.max(1);
        let last = total.div_ceil(size).saturating_sub(1);
        let link = |p: usize, rel: &str| format!("<{base}?page={p}&size={size}>; rel=\"{rel}\"");
        let mut parts = Vec::new();
        if page < last {
            parts.push(link(page + 1, "next"));
        }
        if page > 0 {
            parts.push(link(page - 1, "prev"));
        }
        parts.push(link(last, "last"));
        parts.push(link(0, "first"));
        parts.join(",")
    }
}

fn rel_param(params: &str) -> Option<String> {
    params.split(';').find_map(|p| {
        let p = p.trim().trim_end_matches(',');
        p.strip_prefix("rel=")
            .map(|v| v.trim().trim_matches('"').to_string())
    })
}

fn page_param(target: &str) -> Option<usize> {
    let url = Url::parse(target)
        .or_else(|_| Url::parse("http://localhost").and_then(|b| b.join(target)))
        .ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
}

/// One page of a list call.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    pub items: Vec<E>,
    /// Value of `X-Total-Count`, when sent.
    pub total_count: Option<u64>,
    pub links: PageLinks,
}

impl<E> Page<E> {
    /// A page with no metadata.
    pub const fn from_items(items: Vec<E>) -> Self {
        Self {
            items,
            total_count: None,
            links: PageLinks {
                first: None,
                prev: None,
                next: None,
                last: None,
            },
        }
    }

    pub const fn has_next(&self) -> bool {
        self.links.next.is_some()
    }

    pub fn into_items(self) -> Vec<E> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_empty() {
        assert!(QueryCriteria::new().is_empty());
        assert_eq!(QueryCriteria::new().to_query_string(), "");
    }

    #[test]
    fn test_query_string_multiple_sorts() {
        let q = QueryCriteria::new().sort("nom,asc").sort("id");
        assert_eq!(q.to_query_string(), "sort=nom%2Casc&sort=id");
    }

    #[test]
    fn test_parse_link_header() {
        let header = r#"<http://localhost/api/etudiants?page=0&size=20>; rel="last",<http://localhost/api/etudiants?page=0&size=20>; rel="first""#;
        let links = PageLinks::parse(header);
        assert_eq!(links.last, Some(0));
        assert_eq!(links.first, Some(0));
        assert_eq!(links.next, None);
    }

    #[test]
    fn test_parse_link_header_with_commas_in_url() {
        let header = r#"<http://h/api/pays?page=2&size=5&sort=id,asc>; rel="next", </api/pays?page=0&size=5&sort=id,asc>; rel="prev""#;
        let links = PageLinks::parse(header);
        assert_eq!(links.next, Some(2));
        assert_eq!(links.prev, Some(0));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(PageLinks::parse("nonsense"), PageLinks::default());
        assert_eq!(PageLinks::parse("<unterminated"), PageLinks::default());
    }

    #[test]
    fn test_render_then_parse_middle_page() {
        let header = PageLinks::render("http://h/api/pays", 1, 10, 35);
        let links = PageLinks::parse(&header);
        assert_eq!(
            links,
            PageLinks {
                first: Some(0),
                prev: Some(0),
                next: Some(2),
                last: Some(3),
            }
        );
    }

    #[test]
    fn test_render_empty_collection() {
        let links = PageLinks::parse(&PageLinks::render("/api/pays", 0, 20, 0));
        assert_eq!(links.last, Some(0));
        assert_eq!(links.next, None);
        assert_eq!(links.prev, None);
    }
}
