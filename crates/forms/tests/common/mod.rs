#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Form definitions shared across test files, built on the REAL services so
//! tests exercise actual rendering and validation.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trovato_forms::{FormModel, FormResult, FormSetup, Services};

pub use trovato_test_utils::{
    a_user, an_admin, assert, init_tracing, test_services, test_services_with_gate,
    test_services_with_templates, test_user,
};

/// Directory holding the templates used by these tests.
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/templates")
}

/// A form that declares nothing.
pub struct EmptyForm;

impl FormSetup for EmptyForm {}

/// A user form that counts how often setup runs.
#[derive(Default)]
pub struct UserForm {
    pub setups: Arc<AtomicUsize>,
}

impl UserForm {
    pub fn setup_count(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }
}

impl FormSetup for UserForm {
    fn setup(&self, form: &mut FormModel) -> FormResult<()> {
        self.setups.fetch_add(1, Ordering::SeqCst);
        form.text("name").required().parse_rules("max:60")?;
        form.email("email").required();
        form.select("role", [("admin", "Admin"), ("user", "User")])
            .if_is("admin");
        form.submit("save", "Save");
        Ok(())
    }

    fn creation_setup(&self, form: &mut FormModel) -> FormResult<()> {
        self.setup(form)?;
        form.password("password").required().rule(trovato_forms::Rule::Confirmed);
        Ok(())
    }
}

/// Build a model for `definition` sharing its setup counter.
pub fn user_model(services: Services) -> (FormModel, Arc<AtomicUsize>) {
    let definition = UserForm::default();
    let setups = Arc::clone(&definition.setups);
    (FormModel::new(definition, services), setups)
}
