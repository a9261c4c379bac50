//! Installer page decoy.
//!
//! Not a login gate: the vendored markup is served unchanged for every
//! GET and POST, submissions are never read, nothing changes.

use std::sync::Arc;

use axum::{response::Response, routing::get, Router};

use credfix_common::{CredentialPair, Error, FixtureDescriptor, Result, VariantKind};

use super::{FixtureVariant, Outcome};
use crate::static_files::{StaticFiles, INSTALL_PAGE, INSTALL_PAGE_PATH};

pub struct StaticInstallPage {
    descriptor: FixtureDescriptor,
}

impl StaticInstallPage {
    pub fn new(descriptor: FixtureDescriptor) -> Result<Self> {
        if descriptor.variant_kind() != VariantKind::StaticInstallPage {
            return Err(Error::InvalidConfig(format!(
                "fixture {} is {}, not {}",
                descriptor.name(),
                descriptor.variant_kind(),
                VariantKind::StaticInstallPage
            )));
        }
        Ok(Self { descriptor })
    }
}

impl FixtureVariant for StaticInstallPage {
    fn descriptor(&self) -> &FixtureDescriptor {
        &self.descriptor
    }

    fn render_login_form(&self, _error: Option<&str>) -> String {
        INSTALL_PAGE.to_string()
    }

    fn handle_submit(&self, _submitted: &CredentialPair) -> Outcome {
        Outcome::Ignored
    }

    fn into_router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/", get(install_page_handler).post(install_page_handler))
            .route(INSTALL_PAGE_PATH, get(install_page_handler).post(install_page_handler))
    }
}

async fn install_page_handler() -> Response {
    StaticFiles::serve(INSTALL_PAGE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> StaticInstallPage {
        let descriptor = FixtureDescriptor::builder("wp", VariantKind::StaticInstallPage)
            .build()
            .unwrap();
        StaticInstallPage::new(descriptor).unwrap()
    }

    #[test]
    fn test_any_submission_is_ignored() {
        let f = fixture();
        for pair in [
            CredentialPair::new("admin", "admin"),
            CredentialPair::new("admin", "admin1"),
            CredentialPair::default(),
        ] {
            let outcome = f.handle_submit(&pair);
            assert_eq!(outcome, Outcome::Ignored);
            assert!(!outcome.is_authenticated());
        }
    }

    #[test]
    fn test_render_is_vendored_page_regardless_of_error() {
        let f = fixture();
        assert_eq!(f.render_login_form(None), INSTALL_PAGE);
        assert_eq!(f.render_login_form(Some("Invalid credentials.")), INSTALL_PAGE);
    }
}
