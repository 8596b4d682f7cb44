//! Alert and paging headers attached to resource responses.
//!
//! Mutations carry `X-<app>-alert` (a message) and `X-<app>-params` (the
//! record identifier); rejected requests carry `X-<app>-error` with the
//! error key instead. List responses carry `X-Total-Count` and `Link`.

use http::{HeaderMap, HeaderName, HeaderValue};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use etudiant_rs_client::pagination::{PageLinks, TOTAL_COUNT_HEADER};

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Created,
    Updated,
    Deleted,
}

impl Mutation {
    const fn verb(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::warn!(header = name, "skipping unencodable header"),
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Headers announcing a successful mutation of `entity` record `id`.
pub fn entity_alert(app: &str, mutation: Mutation, entity: &str, id: &str) -> HeaderMap {
    let article = if mutation == Mutation::Created { "A new" } else { "A" };
    let message = format!(
        "{article} {entity} is {} with identifier {id}",
        mutation.verb()
    );
    let mut headers = HeaderMap::new();
    insert(&mut headers, &format!("X-{app}-alert"), &message);
    insert(&mut headers, &format!("X-{app}-params"), &encode(id));
    headers
}

/// Headers announcing a rejected request.
pub fn failure_alert(app: &str, entity: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &format!("X-{app}-error"), &format!("error.{error_key}"));
    insert(&mut headers, &format!("X-{app}-params"), &encode(entity));
    headers
}

/// `X-Total-Count` and `Link` for one page of a collection at `base`.
pub fn pagination_headers(base: &str, page: usize, size: usize, total: usize) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, TOTAL_COUNT_HEADER, &total.to_string());
    insert(
        &mut headers,
        http::header::LINK.as_str(),
        &PageLinks::render(base, page, size, total),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_alert() {
        let headers = entity_alert("etudiantetranger", Mutation::Created, "etudiant", "12");
        assert_eq!(
            headers["x-etudiantetranger-alert"],
            "A new etudiant is created with identifier 12"
        );
        assert_eq!(headers["x-etudiantetranger-params"], "12");
    }

    #[test]
    fn test_update_and_delete_alerts() {
        let updated = entity_alert("app", Mutation::Updated, "pays", "3");
        assert_eq!(updated["x-app-alert"], "A pays is updated with identifier 3");
        let deleted = entity_alert("app", Mutation::Deleted, "niveau", "4");
        assert_eq!(deleted["x-app-alert"], "A niveau is deleted with identifier 4");
    }

    #[test]
    fn test_failure_alert() {
        let headers = failure_alert("app", "etudiant", "idexists");
        assert_eq!(headers["x-app-error"], "error.idexists");
        assert_eq!(headers["x-app-params"], "etudiant");
    }

    #[test]
    fn test_pagination_headers() {
        let headers = pagination_headers("/api/pays", 0, 20, 41);
        assert_eq!(headers["x-total-count"], "41");
        let links = PageLinks::parse(headers["link"].to_str().unwrap());
        assert_eq!(links.next, Some(1));
        assert_eq!(links.last, Some(2));
    }
}
