use std::sync::Arc;

use crate::error::{GatewayError, Result};
use crate::models::Site;
use crate::session::SessionStore;

/// Token and counter handed back by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: String,
    pub counter: u32,
}

/// Checks sede credentials against the startup allow-list and binds tokens to sedes.
#[derive(Debug, Clone)]
pub struct Authenticator {
    sites: Arc<[Site]>,
    store: Arc<SessionStore>,
}

impl Authenticator {
    pub fn new(sites: Vec<Site>, store: Arc<SessionStore>) -> Self {
        Self {
            sites: sites.into(),
            store,
        }
    }

    pub fn login(&self, sede: &str, password: &str) -> Result<LoginGrant> {
        if sede.is_empty() || password.is_empty() {
            return Err(GatewayError::BadRequest(
                "Sede y contraseña son requeridos.".into(),
            ));
        }

        let site = self
            .sites
            .iter()
            .find(|site| site.matches(sede, password))
            .ok_or_else(|| {
                log::warn!("Rejected login for sede '{}'", sede);
                GatewayError::Unauthorized("Credenciales inválidas.".into())
            })?;

        let (token, counter) = self.store.open_session(&site.id);
        Ok(LoginGrant { token, counter })
    }

    /// Resolves a session token to the sede it belongs to.
    pub fn authenticate(&self, token: Option<&str>) -> Result<String> {
        token
            .filter(|token| !token.is_empty())
            .and_then(|token| self.store.resolve(token))
            .ok_or_else(|| GatewayError::Unauthorized("No autorizado. Inicie sesión.".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> (Authenticator, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(50));
        let sites = vec![Site::new("sede1", "clave1"), Site::new("sede2", "clave2")];
        (Authenticator::new(sites, store.clone()), store)
    }

    #[test]
    fn test_missing_fields_are_bad_requests() {
        let (auth, store) = authenticator();
        assert!(matches!(
            auth.login("", "clave1"),
            Err(GatewayError::BadRequest(_))
        ));
        assert!(matches!(
            auth.login("sede1", ""),
            Err(GatewayError::BadRequest(_))
        ));
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_invalid_credentials_create_nothing() {
        let (auth, store) = authenticator();
        for (sede, password) in [("sede1", "clave2"), ("sede3", "clave1"), ("SEDE1", "clave1")] {
            assert!(matches!(
                auth.login(sede, password),
                Err(GatewayError::Unauthorized(_))
            ));
        }
        assert_eq!(store.session_count(), 0);
        assert_eq!(store.remaining("sede1"), None);
    }

    #[test]
    fn test_repeated_login_is_idempotent() {
        let (auth, store) = authenticator();
        let first = auth.login("sede1", "clave1").unwrap();
        assert_eq!(first.counter, 50);

        store.charge("sede1");
        let second = auth.login("sede1", "clave1").unwrap();
        assert_eq!(second.token, first.token);
        assert_eq!(second.counter, 49);
    }

    #[test]
    fn test_authenticate() {
        let (auth, _) = authenticator();
        let grant = auth.login("sede2", "clave2").unwrap();

        assert_eq!(auth.authenticate(Some(&grant.token)).unwrap(), "sede2");
        assert!(matches!(
            auth.authenticate(None),
            Err(GatewayError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate(Some("")),
            Err(GatewayError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate(Some("not-a-token")),
            Err(GatewayError::Unauthorized(_))
        ));
    }
}
