//! In-memory session and quota state.
//!
//! One mutex guards the token map, the per-site token index and the quota
//! counters, so login (lookup-or-mint) and charging (check-and-decrement) are
//! each a single critical section. The guard is never held across an `.await`.

use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Random bytes per token (128 bits).
pub const TOKEN_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// One unit was taken; holds the remaining count after the decrement.
    Charged(u32),
    Exhausted,
}

#[derive(Debug, Default)]
struct StoreState {
    sessions: HashMap<String, String>,
    tokens_by_site: HashMap<String, String>,
    counters: HashMap<String, u32>,
}

impl StoreState {
    fn counter_entry(&mut self, site_id: &str, initial_quota: u32) -> &mut u32 {
        self.counters
            .entry(site_id.to_string())
            .or_insert(initial_quota)
    }
}

#[derive(Debug)]
pub struct SessionStore {
    state: Mutex<StoreState>,
    initial_quota: u32,
}

impl SessionStore {
    pub fn new(initial_quota: u32) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            initial_quota,
        }
    }

    pub fn initial_quota(&self) -> u32 {
        self.initial_quota
    }

    // Every mutation leaves the maps consistent, so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the site's token (minting one on first use) and its current counter.
    pub fn open_session(&self, site_id: &str) -> (String, u32) {
        let mut state = self.lock();
        let counter = *state.counter_entry(site_id, self.initial_quota);

        if let Some(token) = state.tokens_by_site.get(site_id) {
            return (token.clone(), counter);
        }

        let token = loop {
            let candidate = mint_token();
            if !state.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        state
            .sessions
            .insert(token.clone(), site_id.to_string());
        state
            .tokens_by_site
            .insert(site_id.to_string(), token.clone());
        log::info!("Opened session for sede '{}'", site_id);

        (token, counter)
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.lock().sessions.get(token).cloned()
    }

    /// Atomically takes one unit of quota from the site, creating its counter if absent.
    pub fn charge(&self, site_id: &str) -> ChargeOutcome {
        let mut state = self.lock();
        let counter = state.counter_entry(site_id, self.initial_quota);
        if *counter == 0 {
            return ChargeOutcome::Exhausted;
        }
        *counter -= 1;
        ChargeOutcome::Charged(*counter)
    }

    pub fn remaining(&self, site_id: &str) -> Option<u32> {
        self.lock().counters.get(site_id).copied()
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }
}

fn mint_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
