use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Par access/refresh token do ClickUp
///
/// O access token é opaco: `Debug` nunca exibe o valor e os logs usam
/// apenas [`Credential::preview`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    /// Prévia mascarada do access token, segura para logs
    pub fn preview(&self) -> String {
        mask_secret(&self.access_token)
    }

    /// Valor do header `Authorization`
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Mascara um segredo mantendo só os 4 primeiros caracteres
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= 8 {
        return "***".to_string();
    }
    let head: String = secret.chars().take(4).collect();
    format!("{}***", head)
}

/// Registro em disco; `{}` representa "sem credencial"
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredRecord {
    fn into_credential(self) -> Option<Credential> {
        match self.access_token {
            Some(token) if !token.is_empty() => Some(Credential::new(token, self.refresh_token)),
            _ => None,
        }
    }
}

/// Armazenamento durável de no máximo uma credencial
///
/// Cada escrita grava um arquivo temporário (permissão `0o600` em Unix) e o
/// renomeia sobre o destino, então um leitor nunca vê um registro parcial.
/// Ciclos de leitura-modificação-escrita são serializados pelo `write_lock`.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Carrega a credencial armazenada
    ///
    /// Arquivo ausente, vazio ou corrompido é tratado como "sem credencial".
    pub async fn load(&self) -> Option<Credential> {
        self.read_record().await.into_credential()
    }

    /// Grava um novo access token, preservando o refresh token anterior
    /// quando nenhum novo é fornecido
    pub async fn store(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<Credential, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut record = self.read_record().await;
        record.access_token = Some(access_token.to_string());
        if let Some(refresh) = refresh_token {
            record.refresh_token = Some(refresh.to_string());
        }

        self.write_record(&record).await?;

        tracing::info!(
            "💾 [TokenStore] Credencial salva em {} (token: {})",
            self.path.display(),
            mask_secret(access_token)
        );

        Ok(Credential::new(access_token, record.refresh_token))
    }

    /// Persiste uma credencial completa (atalho para [`TokenStore::store`])
    pub async fn store_credential(&self, credential: &Credential) -> Result<Credential, StorageError> {
        self.store(&credential.access_token, credential.refresh_token.as_deref())
            .await
    }

    /// Reseta para o registro vazio
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.write_record(&StoredRecord::default()).await?;
        tracing::info!("🗑️ [TokenStore] Credencial removida de {}", self.path.display());
        Ok(())
    }

    async fn read_record(&self) -> StoredRecord {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredRecord::default(),
            Err(e) => {
                tracing::warn!(
                    "⚠️ [TokenStore] Falha ao ler {}: {}. Tratando como vazio.",
                    self.path.display(),
                    e
                );
                return StoredRecord::default();
            }
        };

        if raw.trim().is_empty() {
            return StoredRecord::default();
        }

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(
                "⚠️ [TokenStore] Registro corrompido em {}: {}. Tratando como vazio.",
                self.path.display(),
                e
            );
            StoredRecord::default()
        })
    }

    async fn write_record(&self, record: &StoredRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let payload = serde_json::to_vec_pretty(record)?;
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        if let Err(e) = write_private_file(&temp_path, &payload).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

async fn write_private_file(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(payload).await?;
    file.sync_all().await?;
    Ok(())
}
