use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use oauth2::{AuthorizationCode, CsrfToken};
use serde::Deserialize;

use crate::error::{OAuthError, OAuthResult};

/// Validade padrão de um `state` emitido (10 minutos)
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(600);

/// Máximo de fluxos pendentes; ao exceder, o mais antigo é descartado
pub const DEFAULT_MAX_PENDING_STATES: usize = 256;

/// Parâmetros recebidos no redirect de callback do ClickUp
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Nonces CSRF pendentes, um por fluxo de autorização iniciado
///
/// Cada valor é aleatório, expira após o TTL e só pode ser consumido uma vez.
#[derive(Debug)]
pub struct StateStore {
    pending: Mutex<HashMap<String, Issued>>,
    sequence: AtomicU64,
    ttl: Duration,
    max_pending: usize,
}

#[derive(Debug, Clone, Copy)]
struct Issued {
    at: Instant,
    sequence: u64,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_STATE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_limits(ttl, DEFAULT_MAX_PENDING_STATES)
    }

    pub fn with_limits(ttl: Duration, max_pending: usize) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
            ttl,
            max_pending: max_pending.max(1),
        }
    }

    /// Emite um novo `state` e o registra como pendente
    pub fn issue(&self) -> String {
        let state = CsrfToken::new_random().secret().clone();
        let mut pending = self.lock();
        let ttl = self.ttl;
        pending.retain(|_, issued| issued.at.elapsed() < ttl);

        while pending.len() >= self.max_pending {
            let oldest = pending
                .iter()
                .min_by_key(|(_, issued)| issued.sequence)
                .map(|(state, _)| state.clone());
            match oldest {
                Some(oldest) => {
                    pending.remove(&oldest);
                }
                None => break,
            }
        }

        let issued = Issued {
            at: Instant::now(),
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        pending.insert(state.clone(), issued);
        state
    }

    /// Valida e invalida um `state`; `false` se desconhecido ou expirado
    pub fn consume(&self, state: &str) -> bool {
        match self.lock().remove(state) {
            Some(issued) => issued.at.elapsed() < self.ttl,
            None => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Issued>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Valida o callback antes de qualquer troca de token
///
/// O `state` recebido é sempre consumido, mesmo quando o callback traz erro.
pub fn validate_callback(params: &CallbackParams, states: &StateStore) -> OAuthResult<AuthorizationCode> {
    let state_ok = params
        .state
        .as_deref()
        .map(|state| states.consume(state))
        .unwrap_or(false);

    if let Some(error) = &params.error {
        tracing::warn!("❌ [OAuth2] Callback com erro do provedor: {}", error);
        return Err(match error.as_str() {
            "access_denied" => OAuthError::AccessDenied,
            _ => OAuthError::Provider {
                error: error.clone(),
                description: params.error_description.clone(),
            },
        });
    }

    if let Some(description) = &params.error_description {
        return Err(OAuthError::Provider {
            error: "unknown_error".to_string(),
            description: Some(description.clone()),
        });
    }

    if !state_ok {
        tracing::warn!("🚨 [OAuth2] State do callback não corresponde a nenhum fluxo pendente");
        return Err(OAuthError::InvalidState);
    }

    match params.code.as_deref() {
        Some(code) if !code.trim().is_empty() => Ok(AuthorizationCode::new(code.to_string())),
        _ => Err(OAuthError::MissingCode),
    }
}
