//! In-memory [`Cloud`] used by unit tests.
//!
//! Records every call so tests can assert on ordering and on which
//! mutating operations ran.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use zeroize::Zeroizing;

use super::{AccountContext, Cloud, NewCredential};
use crate::error::{AzureError, Result};

pub(crate) struct FakeCloud {
    pub logged_in: bool,
    pub rp_present: bool,
    /// Operation label that fails, e.g. `"role:User Access Administrator"`.
    pub fail_on: RefCell<Option<String>>,
    /// Number of object-id lookups that fail before the object appears.
    pub object_id_delay: Cell<u32>,
    pub groups: RefCell<BTreeSet<String>>,
    pub calls: RefCell<Vec<String>>,
    principals: Cell<u32>,
    secrets: Cell<u32>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self {
            logged_in: true,
            rp_present: true,
            fail_on: RefCell::new(None),
            object_id_delay: Cell::new(0),
            groups: RefCell::new(BTreeSet::new()),
            calls: RefCell::new(Vec::new()),
            principals: Cell::new(0),
            secrets: Cell::new(0),
        }
    }

    pub fn fail_on(&self, label: &str) {
        *self.fail_on.borrow_mut() = Some(label.to_string());
    }

    pub fn clear_failure(&self) {
        *self.fail_on.borrow_mut() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, label: String) -> Result<()> {
        let failing = self.fail_on.borrow().as_deref() == Some(label.as_str());
        self.calls.borrow_mut().push(label.clone());
        if failing {
            return Err(AzureError::CommandFailed {
                command: label,
                stderr: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn next_secret(&self) -> Zeroizing<String> {
        self.secrets.set(self.secrets.get() + 1);
        Zeroizing::new(format!("secret-{}", self.secrets.get()))
    }
}

impl Cloud for FakeCloud {
    fn account(&self) -> Result<AccountContext> {
        self.record("account".to_string())?;
        if !self.logged_in {
            return Err(AzureError::NotAuthenticated("Please run 'az login'".to_string()).into());
        }
        Ok(AccountContext {
            subscription_id: "00000000-0000-0000-0000-000000000001".to_string(),
            subscription_name: "Dev Subscription".to_string(),
            tenant_id: "00000000-0000-0000-0000-0000000000aa".to_string(),
        })
    }

    fn register_provider(&self, namespace: &str) -> Result<()> {
        self.record(format!("provider:{}", namespace))
    }

    fn group_exists(&self, name: &str) -> Result<bool> {
        self.record(format!("group-exists:{}", name))?;
        Ok(self.groups.borrow().contains(name))
    }

    fn create_group(&self, name: &str, _location: &str) -> Result<()> {
        self.record(format!("group-create:{}", name))?;
        self.groups.borrow_mut().insert(name.to_string());
        Ok(())
    }

    fn create_service_principal(&self, display_name: &str) -> Result<NewCredential> {
        self.record(format!("sp-create:{}", display_name))?;
        self.principals.set(self.principals.get() + 1);
        Ok(NewCredential {
            app_id: format!("app-{}", self.principals.get()),
            client_secret: self.next_secret(),
        })
    }

    fn reset_credential(&self, app_id: &str) -> Result<NewCredential> {
        self.record(format!("sp-reset:{}", app_id))?;
        Ok(NewCredential {
            app_id: app_id.to_string(),
            client_secret: self.next_secret(),
        })
    }

    fn service_principal_object_id(&self, app_id: &str) -> Result<String> {
        self.record(format!("sp-show:{}", app_id))?;
        let remaining = self.object_id_delay.get();
        if remaining > 0 {
            self.object_id_delay.set(remaining - 1);
            return Err(AzureError::CommandFailed {
                command: "ad sp show".to_string(),
                stderr: format!("Resource '{}' does not exist", app_id),
            }
            .into());
        }
        Ok(format!("obj-{}", app_id))
    }

    fn assign_role(&self, role: &str, _object_id: &str, _scope: &str) -> Result<()> {
        self.record(format!("role:{}", role))
    }

    fn find_service_principal(&self, display_name: &str) -> Result<String> {
        self.record("rp-lookup".to_string())?;
        if !self.rp_present {
            return Err(AzureError::ServicePrincipalNotFound(display_name.to_string()).into());
        }
        Ok("rp-object-id".to_string())
    }
}
