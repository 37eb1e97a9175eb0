use std::sync::Arc;

use crate::error::{GatewayError, Result};
use crate::session::{ChargeOutcome, SessionStore};

/// Per-sede generation allowance. Charged once per request, before any provider call,
/// and never refunded.
#[derive(Debug, Clone)]
pub struct QuotaGate {
    store: Arc<SessionStore>,
}

impl QuotaGate {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    /// Takes one unit from the sede and returns what is left.
    pub fn authorize_and_charge(&self, site_id: &str) -> Result<u32> {
        match self.store.charge(site_id) {
            ChargeOutcome::Charged(remaining) => {
                log::debug!("Charged sede '{}', {} generations left", site_id, remaining);
                Ok(remaining)
            }
            ChargeOutcome::Exhausted => Err(GatewayError::Forbidden(
                "Límite de generación de imágenes alcanzado.".into(),
            )),
        }
    }

    pub fn remaining(&self, site_id: &str) -> Option<u32> {
        self.store.remaining(site_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_fifty_then_forbidden() {
        let store = Arc::new(SessionStore::new(50));
        store.open_session("sede1");
        let gate = QuotaGate::new(store);

        assert_eq!(gate.authorize_and_charge("sede1").unwrap(), 49);
        for _ in 1..50 {
            gate.authorize_and_charge("sede1").unwrap();
        }
        assert_eq!(gate.remaining("sede1"), Some(0));

        assert!(matches!(
            gate.authorize_and_charge("sede1"),
            Err(GatewayError::Forbidden(_))
        ));
        assert_eq!(gate.remaining("sede1"), Some(0));
    }

    #[test]
    fn test_sites_are_independent() {
        let gate = QuotaGate::new(Arc::new(SessionStore::new(3)));
        for _ in 0..3 {
            gate.authorize_and_charge("sede1").unwrap();
        }
        assert!(gate.authorize_and_charge("sede1").is_err());
        assert_eq!(gate.authorize_and_charge("sede2").unwrap(), 2);
    }

    #[test]
    fn test_concurrent_charges_never_overspend() {
        let store = Arc::new(SessionStore::new(50));
        let gate = QuotaGate::new(store);
        for _ in 0..49 {
            gate.authorize_and_charge("sede1").unwrap();
        }

        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let gate = gate.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    gate.authorize_and_charge("sede1").is_ok()
                })
            })
            .collect();

        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(granted, 1);
        assert_eq!(gate.remaining("sede1"), Some(0));
    }
}
