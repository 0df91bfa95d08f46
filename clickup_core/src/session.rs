use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::auth::{validate_callback, CallbackParams, Credential, OAuthFlow, StateStore, TokenStore};
use crate::client::WorkspaceClient;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult, OAuthError, SessionError, SessionResult};

/// Estado da sessão do processo
#[derive(Debug, Clone)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Arc<WorkspaceClient>),
}

/// Resumo exposto em `/auth/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub workspace_id: Option<String>,
}

/// Sessão única do processo com o ClickUp
///
/// Só passa para `Authenticated` depois que o token autentica de fato
/// (resolução do workspace) e só então o persiste. Um 401 no meio da sessão
/// derruba para `Unauthenticated` e limpa o token salvo.
#[derive(Debug)]
pub struct SessionManager {
    oauth: OAuthFlow,
    store: TokenStore,
    states: StateStore,
    api: ApiConfig,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(oauth: OAuthFlow, api: ApiConfig) -> Self {
        let store = TokenStore::new(api.token_file.clone());
        Self::with_parts(oauth, store, StateStore::new(), api)
    }

    pub fn with_parts(oauth: OAuthFlow, store: TokenStore, states: StateStore, api: ApiConfig) -> Self {
        Self {
            oauth,
            store,
            states,
            api,
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Tenta restaurar a sessão a partir do token salvo
    ///
    /// Retorna `true` se a sessão terminou autenticada. Qualquer falha deixa
    /// a sessão sem autenticação e remove o token salvo, inclusive falhas de
    /// rede (registradas à parte para não serem confundidas com token inválido).
    pub async fn restore(&self) -> bool {
        let Some(credential) = self.store.load().await else {
            tracing::info!("🔓 [Session] Nenhum token salvo, aguardando autenticação OAuth2");
            return false;
        };

        tracing::info!("🔑 [Session] Token encontrado ({}), verificando...", credential.preview());

        let refresh_token = credential.refresh_token.clone();
        let result = match self.verify(credential).await {
            Ok(client) => self.activate(client, false).await,
            Err(e) if e.is_unauthorized() => match refresh_token {
                Some(refresh_token) => {
                    tracing::warn!("⚠️ [Session] Token salvo rejeitado, tentando refresh");
                    match self.oauth_refresh(&refresh_token).await {
                        Ok(client) => self.activate(client, true).await,
                        Err(e) => Err(e),
                    }
                }
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(_) => {
                tracing::info!("✅ [Session] Sessão restaurada do token salvo");
                true
            }
            Err(e) if is_transport(&e) => {
                tracing::error!(
                    "📡 [Session] ClickUp inacessível na verificação do token: {}. Removendo; refaça o login em /auth/clickup.",
                    e
                );
                self.invalidate().await;
                false
            }
            Err(e) => {
                tracing::warn!("❌ [Session] Token salvo inválido: {}. Removendo.", e);
                self.invalidate().await;
                false
            }
        }
    }

    /// Inicia um novo fluxo de autorização e retorna a URL do provedor
    pub fn begin_authorization(&self) -> String {
        let state = self.states.issue();
        self.oauth.authorization_url(&state)
    }

    /// Conclui o fluxo a partir dos parâmetros do callback
    ///
    /// O token só é salvo depois da verificação com o workspace.
    pub async fn complete_authorization(&self, params: &CallbackParams) -> SessionResult<SessionStatus> {
        let code = validate_callback(params, &self.states)?;
        let credential = self.oauth.exchange_code_for_token(code.secret()).await?;
        let client = self.verify(credential).await?;

        let status = self.activate(client, true).await?;
        tracing::info!("✅ [Session] Autenticação OAuth2 concluída");
        Ok(status)
    }

    /// Renova a sessão usando o refresh token salvo
    pub async fn refresh(&self) -> SessionResult<SessionStatus> {
        let refresh_token = self
            .store
            .load()
            .await
            .and_then(|credential| credential.refresh_token)
            .ok_or(SessionError::NotAuthenticated)?;

        let client = self.oauth_refresh(&refresh_token).await?;
        let status = self.activate(client, true).await?;
        tracing::info!("🔄 [Session] Sessão renovada via refresh token");
        Ok(status)
    }

    /// Cliente atual ou `NotAuthenticated`
    pub async fn client(&self) -> SessionResult<Arc<WorkspaceClient>> {
        match &*self.state.read().await {
            SessionState::Authenticated(client) => Ok(client.clone()),
            SessionState::Unauthenticated => Err(SessionError::NotAuthenticated),
        }
    }

    /// Executa uma operação com o cliente atual
    ///
    /// Se a operação falhar com `Unauthorized`, a sessão é encerrada.
    pub async fn run<T, F, Fut>(&self, op: F) -> SessionResult<T>
    where
        F: FnOnce(Arc<WorkspaceClient>) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let client = self.client().await?;

        match op(client.clone()).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("🔒 [Session] Token rejeitado pelo ClickUp, encerrando sessão");
                self.invalidate_if_current(&client).await;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn logout(&self) -> SessionResult<()> {
        let mut state = self.state.write().await;
        self.store.clear().await?;
        *state = SessionState::Unauthenticated;
        tracing::info!("👋 [Session] Logout realizado");
        Ok(())
    }

    pub async fn status(&self) -> SessionStatus {
        match &*self.state.read().await {
            SessionState::Authenticated(client) => status_of(client),
            SessionState::Unauthenticated => SessionStatus {
                authenticated: false,
                workspace_id: None,
            },
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(&*self.state.read().await, SessionState::Authenticated(_))
    }

    /// Cria o cliente e confirma que o token autentica
    async fn verify(&self, credential: Credential) -> ApiResult<Arc<WorkspaceClient>> {
        let client = WorkspaceClient::new(credential, &self.api)?;
        client.resolve_workspace_id().await?;
        Ok(Arc::new(client))
    }

    async fn oauth_refresh(&self, refresh_token: &str) -> SessionResult<Arc<WorkspaceClient>> {
        let credential = self.oauth.refresh(refresh_token).await?;
        Ok(self.verify(credential).await?)
    }

    /// Publica o cliente como sessão atual
    ///
    /// Arquivo de token e estado mudam sob o mesmo lock de escrita.
    async fn activate(&self, client: Arc<WorkspaceClient>, persist: bool) -> SessionResult<SessionStatus> {
        let mut state = self.state.write().await;
        if persist {
            self.store.store_credential(client.credential()).await?;
        }
        let status = status_of(&client);
        *state = SessionState::Authenticated(client);
        Ok(status)
    }

    async fn invalidate(&self) {
        let mut state = self.state.write().await;
        self.clear_store().await;
        *state = SessionState::Unauthenticated;
    }

    /// Só derruba a sessão se ela ainda usa o cliente que falhou
    async fn invalidate_if_current(&self, failed: &Arc<WorkspaceClient>) {
        let mut state = self.state.write().await;
        if let SessionState::Authenticated(current) = &*state {
            if !Arc::ptr_eq(current, failed) {
                return;
            }
        }
        self.clear_store().await;
        *state = SessionState::Unauthenticated;
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::error!("❌ [Session] Falha ao limpar token salvo: {}", e);
        }
    }
}

/// Falha de rede ao falar com o ClickUp ou com o endpoint de token
fn is_transport(err: &SessionError) -> bool {
    matches!(
        err,
        SessionError::Api(ApiError::Transport { .. }) | SessionError::OAuth(OAuthError::Transport(_))
    )
}

fn status_of(client: &WorkspaceClient) -> SessionStatus {
    SessionStatus {
        authenticated: true,
        workspace_id: client.cached_workspace_id().map(String::from),
    }
}
