//! Configuration Management
//!
//! 認証情報を環境変数（および `.env`）から読み込む

use log::debug;

use crate::domain::errors::SetupError;

pub const ENV_KEY: &str = "FLICKR_KEY";
pub const ENV_SECRET: &str = "FLICKR_SECRET";
pub const ENV_OAUTH_TOKEN: &str = "FLICKR_OAUTH_TOKEN";
pub const ENV_OAUTH_TOKEN_SECRET: &str = "FLICKR_OAUTH_TOKEN_SECRET";
pub const ENV_DELETE_KEY: &str = "FLICKR_DELETE_KEY";
pub const ENV_DELETE_SECRET: &str = "FLICKR_DELETE_SECRET";

/// Flickr API の認証情報
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub oauth_token: String,
    pub oauth_token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("oauth_token", &self.oauth_token)
            .field("oauth_token_secret", &"***")
            .finish()
    }
}

impl Credentials {
    /// アップロード・一覧用の認証情報を読み込む
    pub fn from_env() -> Result<Self, SetupError> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok(), false)
    }

    /// 削除用の認証情報を読み込む
    ///
    /// `FLICKR_DELETE_KEY` / `FLICKR_DELETE_SECRET` が無ければ通常のキーを使う
    pub fn for_delete() -> Result<Self, SetupError> {
        load_dotenv();
        Self::from_lookup(|name| std::env::var(name).ok(), true)
    }

    /// 任意の参照関数から読み込む（テスト用に環境を差し替えられる）
    pub fn from_lookup<F>(lookup: F, delete: bool) -> Result<Self, SetupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| -> Option<String> {
            lookup(name).filter(|value| !value.trim().is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(SetupError::MissingCredential(name));

        let (api_key, api_secret) = if delete {
            match (get(ENV_DELETE_KEY), get(ENV_DELETE_SECRET)) {
                (Some(key), Some(secret)) => (key, secret),
                _ => {
                    debug!("Delete credentials not set, using {}", ENV_KEY);
                    (require(ENV_KEY)?, require(ENV_SECRET)?)
                }
            }
        } else {
            (require(ENV_KEY)?, require(ENV_SECRET)?)
        };

        Ok(Self {
            api_key,
            api_secret,
            oauth_token: require(ENV_OAUTH_TOKEN)?,
            oauth_token_secret: require(ENV_OAUTH_TOKEN_SECRET)?,
        })
    }
}

fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => debug!("Ignoring .env: {}", e),
    }
}
