// エンジンオプション
//
// 型付き設定マップを方言ごとに検証し、エンジン構築に必要な
// 明示的な設定構造体へ変換する。未知の引数は構築時に拒否する。

use crate::core::coerce::{coerce_value, schema_kind, ConfigMap, ConfigValue, ValueKind};
use crate::core::dialect::{Dialect, PoolClass};
use crate::core::error::{ConfigValueError, EngineConfigError, ExpectedType};
use crate::core::url::Url;
use serde::Serialize;
use std::collections::BTreeMap;

/// 接続引数として扱うキーのプレフィックス
pub const CONNECT_ARGS_PREFIX: &str = "connect_args.";

/// SQLのログ出力モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Echo {
    #[default]
    Off,
    On,
    Debug,
}

/// Unicode変換モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertUnicode {
    #[default]
    Off,
    On,
    Force,
}

/// キュープール固有の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuePoolSettings {
    pub pool_size: u32,
    pub max_overflow: i64,
    /// 接続待ちのタイムアウト（秒）
    pub pool_timeout: u64,
}

impl Default for QueuePoolSettings {
    fn default() -> Self {
        Self {
            pool_size: 5,
            max_overflow: 10,
            pool_timeout: 30,
        }
    }
}

/// コネクションプール設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolOptions {
    pub class: PoolClass,
    /// 接続の再利用上限（秒）、-1 は無期限
    pub recycle: i64,
    pub threadlocal: bool,
    /// キュープールの場合のみ `Some`
    pub queue: Option<QueuePoolSettings>,
}

impl PoolOptions {
    fn for_class(class: PoolClass) -> Self {
        Self {
            class,
            recycle: -1,
            threadlocal: false,
            queue: (class == PoolClass::Queue).then(QueuePoolSettings::default),
        }
    }
}

/// 検証済みのエンジンオプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub url: Url,
    pub dialect: Dialect,
    pub echo: Echo,
    pub echo_pool: Echo,
    pub convert_unicode: ConvertUnicode,
    pub pool: PoolOptions,
    /// 方言固有の引数
    pub dialect_args: BTreeMap<String, ConfigValue>,
    /// ドライバへ直接渡す追加の接続引数
    pub connect_args: BTreeMap<String, ConfigValue>,
}

impl EngineOptions {
    /// 既定値でエンジンオプションを作成
    pub fn new(url: Url) -> Result<Self, EngineConfigError> {
        Self::from_config(url, &ConfigMap::new())
    }

    /// 型付き設定マップからエンジンオプションを構築
    ///
    /// `url` キーは無視する（URLは引数で渡す）。`connect_args.` で始まるキーは
    /// 接続引数として扱う。それ以外の未知のキーは `UnsupportedArgument`。
    pub fn from_config(url: Url, config: &ConfigMap) -> Result<Self, EngineConfigError> {
        let dialect = Dialect::from_url(&url)?;

        let pool_class = match config.get("poolclass") {
            Some(value) => value.to_string().parse::<PoolClass>()?,
            None => dialect.default_pool_class(),
        };

        let mut options = Self {
            url,
            dialect,
            echo: Echo::Off,
            echo_pool: Echo::Off,
            convert_unicode: ConvertUnicode::Off,
            pool: PoolOptions::for_class(pool_class),
            dialect_args: BTreeMap::new(),
            connect_args: BTreeMap::new(),
        };

        for (key, value) in config {
            options.apply(key, value)?;
        }

        Ok(options)
    }

    fn apply(&mut self, key: &str, value: &ConfigValue) -> Result<(), EngineConfigError> {
        if !self.pool.class.accepts(key) {
            return Err(EngineConfigError::IncompatiblePoolArgument {
                pool_class: self.pool.class.to_string(),
                argument: key.to_string(),
            });
        }

        match key {
            "url" | "poolclass" => {}
            "echo" => self.echo = echo_value(key, value)?,
            "echo_pool" => self.echo_pool = echo_value(key, value)?,
            "convert_unicode" => {
                self.convert_unicode = match typed(key, value)? {
                    ConfigValue::Str(_) => ConvertUnicode::Force,
                    ConfigValue::Bool(true) => ConvertUnicode::On,
                    _ => ConvertUnicode::Off,
                }
            }
            "pool_recycle" => self.pool.recycle = int_value(key, value)?,
            "pool_threadlocal" => self.pool.threadlocal = bool_value(key, value)?,
            "pool_size" => {
                let size = u32::try_from(int_value(key, value)?).map_err(|_| {
                    ConfigValueError::new(key, value.to_string(), ExpectedType::Integer)
                })?;
                self.queue_settings().pool_size = size;
            }
            "max_overflow" => self.queue_settings().max_overflow = int_value(key, value)?,
            "pool_timeout" => {
                let timeout = u64::try_from(int_value(key, value)?).map_err(|_| {
                    ConfigValueError::new(key, value.to_string(), ExpectedType::Integer)
                })?;
                self.queue_settings().pool_timeout = timeout;
            }
            _ => {
                if let Some(name) = key.strip_prefix(CONNECT_ARGS_PREFIX) {
                    self.connect_args.insert(name.to_string(), value.clone());
                } else if self.dialect.dialect_args().contains(&key) {
                    self.dialect_args.insert(key.to_string(), typed(key, value)?);
                } else {
                    return Err(EngineConfigError::UnsupportedArgument {
                        dialect: self.dialect.to_string(),
                        argument: key.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn queue_settings(&mut self) -> &mut QueuePoolSettings {
        self.pool.queue.get_or_insert_with(QueuePoolSettings::default)
    }

    /// ドライバの connect() に渡す引数
    ///
    /// URL由来の引数にクエリパラメータを重ね、最後に `connect_args` で上書きする。
    pub fn connect_params(&self) -> BTreeMap<String, ConfigValue> {
        let mut params = self.dialect.connect_args(&self.url);
        for (key, value) in self.url.query() {
            params.insert(key, ConfigValue::Str(value));
        }
        for (key, value) in &self.connect_args {
            params.insert(key.clone(), value.clone());
        }
        params
    }
}

/// スキーマに宣言されたキーなら型変換を適用する
fn typed(key: &str, value: &ConfigValue) -> Result<ConfigValue, ConfigValueError> {
    match schema_kind(key) {
        Some(kind) => coerce_value(key, value.clone(), kind),
        None => Ok(value.clone()),
    }
}

fn int_value(key: &str, value: &ConfigValue) -> Result<i64, ConfigValueError> {
    coerce_value(key, value.clone(), ValueKind::Int)?
        .as_int()
        .ok_or_else(|| ConfigValueError::new(key, value.to_string(), ExpectedType::Integer))
}

fn bool_value(key: &str, value: &ConfigValue) -> Result<bool, ConfigValueError> {
    coerce_value(key, value.clone(), ValueKind::Bool)?
        .as_bool()
        .ok_or_else(|| ConfigValueError::new(key, value.to_string(), ExpectedType::Boolean))
}

fn echo_value(key: &str, value: &ConfigValue) -> Result<Echo, ConfigValueError> {
    Ok(match typed(key, value)? {
        ConfigValue::Str(_) => Echo::Debug,
        ConfigValue::Bool(true) => Echo::On,
        _ => Echo::Off,
    })
}
