//! 令牌持久化
//! 两个不透明字符串的持久存储，缺少任意一个视为无会话

use crate::models::auth::TokenPair;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// 令牌存储接口
///
/// 会话管理器通过这个接口读写令牌对。实现必须保证 `save` 原子地
/// 替换两个令牌，不会出现只更新一个的中间状态。
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 读取存储的令牌对，任意一个缺失时返回 None
    async fn load(&self) -> std::io::Result<Option<TokenPair>>;

    /// 原子地写入新的令牌对
    async fn save(&self, tokens: &TokenPair) -> std::io::Result<()>;

    /// 清除存储的令牌对，不存在时也成功
    async fn clear(&self) -> std::io::Result<()>;
}

/// 磁盘上的令牌文件格式
#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: String,
}

/// 基于 JSON 文件的令牌存储
///
/// 写入时先写临时文件再重命名，避免进程中断留下半写状态。
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> std::io::Result<Option<TokenPair>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        // 文件损坏等同于无会话，不阻塞启动
        match serde_json::from_str::<StoredTokens>(&contents) {
            Ok(stored) => Ok(Some(TokenPair {
                access: stored.access_token,
                refresh: stored.refresh_token,
            })),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Token file is corrupt, treating as no session");
                Ok(None)
            }
        }
    }

    async fn save(&self, tokens: &TokenPair) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let stored = StoredTokens {
            access_token: tokens.access.clone(),
            refresh_token: tokens.refresh.clone(),
        };
        let contents = serde_json::to_string_pretty(&stored)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }

    async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// 内存令牌存储（测试用）
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> std::io::Result<Option<TokenPair>> {
        Ok(self.tokens.lock().await.clone())
    }

    async fn save(&self, tokens: &TokenPair) -> std::io::Result<()> {
        *self.tokens.lock().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> std::io::Result<()> {
        *self.tokens.lock().await = None;
        Ok(())
    }
}
