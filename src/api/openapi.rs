use super::handlers::{auth, health, incidents};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Same wiring as the served router; only the generated document is kept.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Register new endpoints here with `.routes(routes!(...))` so serving and
/// documentation cannot drift apart. Undocumented extras like `/` and the
/// preflight `OPTIONS /health` are added in `api::new` instead.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Passwordless login with emailed one-time codes".to_string());

    let mut incidents_tag = Tag::new("incidents");
    incidents_tag.description = Some("Community hazard reports".to_string());

    let mut jobs_tag = Tag::new("jobs");
    jobs_tag.description = Some("Idempotent sweeps for external schedulers".to_string());

    let mut openapi = cargo_openapi();
    openapi.tags = Some(vec![auth_tag, incidents_tag, jobs_tag]);

    // `routes!` picks up each handler's #[utoipa::path], binding method and path.
    OpenApiRouter::with_openapi(openapi)
        .routes(routes!(health::health))
        .routes(routes!(auth::send_otp::send_otp))
        .routes(routes!(auth::verify_otp::verify_otp))
        .routes(routes!(auth::profile::update_user_name))
        .routes(routes!(auth::session::session))
        .routes(routes!(auth::session::logout))
        .routes(routes!(
            incidents::list::list_incidents,
            incidents::report::report_incident
        ))
        .routes(routes!(incidents::sweep::expire_incidents))
        .routes(routes!(incidents::sweep::cleanup_otps))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Seed the document from Cargo.toml metadata rather than the utoipa defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = primary_author_contact(env!("CARGO_PKG_AUTHORS"));
    info.license = non_empty(env!("CARGO_PKG_LICENSE")).map(|identifier| {
        let mut license = License::new(identifier);
        license.identifier = Some(identifier.to_string());
        license
    });

    OpenApiBuilder::new().info(info).build()
}

/// First entry of the `;`-separated Cargo authors list, split into a name and
/// an optional `<email>` part.
fn primary_author_contact(authors: &str) -> Option<Contact> {
    let primary = authors
        .split(';')
        .map(str::trim)
        .find(|author| !author.is_empty())?;

    let (name, email) = match primary.split_once('<') {
        Some((name, rest)) => (name.trim(), Some(rest.trim_end_matches('>').trim())),
        None => (primary, None),
    };

    let mut contact = Contact::new();
    contact.name = non_empty(name).map(str::to_string);
    contact.email = email.and_then(non_empty).map(str::to_string);
    (contact.name.is_some() || contact.email.is_some()).then_some(contact)
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(
            spec.info.description.as_deref(),
            Some(env!("CARGO_PKG_DESCRIPTION"))
        );

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Avizo Team"));
            assert_eq!(contact.email.as_deref(), Some("team@avizo.dev"));
        }

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.name, "BSD-3-Clause");
            assert_eq!(license.identifier.as_deref(), Some("BSD-3-Clause"));
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        assert!(tags.iter().any(|tag| tag.name == "auth"));
        assert!(tags.iter().any(|tag| tag.name == "incidents"));
        assert!(tags.iter().any(|tag| tag.name == "jobs"));
        assert!(spec.paths.paths.contains_key("/send-otp"));
        assert!(spec.paths.paths.contains_key("/verify-otp"));
        assert!(spec.paths.paths.contains_key("/update-user-name"));
        assert!(spec.paths.paths.contains_key("/incidents"));
        assert!(spec.paths.paths.contains_key("/jobs/expire-incidents"));
        assert!(spec.paths.paths.contains_key("/jobs/cleanup-otps"));
    }

    #[test]
    fn contact_from_author_string() {
        let contact = primary_author_contact("Avizo Team <team@avizo.dev>");
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Avizo Team"));
            assert_eq!(contact.email.as_deref(), Some("team@avizo.dev"));
        }

        let nameless = primary_author_contact("<team@avizo.dev>");
        assert!(nameless.is_some());
        if let Some(nameless) = nameless {
            assert!(nameless.name.is_none());
            assert_eq!(nameless.email.as_deref(), Some("team@avizo.dev"));
        }

        assert!(primary_author_contact("  ").is_none());
    }
}
