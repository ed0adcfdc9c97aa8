// データベース方言とプールクラス
//
// URLのスキームから方言を解決し、方言ごとに受け付ける引数と
// 既定のコネクションプールを定義する。

use crate::core::coerce::ConfigValue;
use crate::core::error::EngineConfigError;
use crate::core::url::Url;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dialect {
    #[serde(rename = "postgresql")]
    PostgreSQL,
    #[serde(rename = "mysql")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
    #[serde(rename = "oracle")]
    Oracle,
    #[serde(rename = "mssql")]
    MsSql,
}

impl Dialect {
    /// バックエンド名から方言を取得
    pub fn from_backend(name: &str) -> Option<Self> {
        match name {
            "postgresql" | "postgres" => Some(Dialect::PostgreSQL),
            "mysql" => Some(Dialect::MySQL),
            "sqlite" => Some(Dialect::SQLite),
            "oracle" => Some(Dialect::Oracle),
            "mssql" => Some(Dialect::MsSql),
            _ => None,
        }
    }

    /// URLのスキームから方言を解決
    ///
    /// バックエンドが未知、またはドライバ名がその方言で未知の場合はエラー。
    pub fn from_url(url: &Url) -> Result<Self, EngineConfigError> {
        let unknown = || EngineConfigError::UnknownDialect {
            scheme: url.scheme().to_string(),
        };

        let dialect = Self::from_backend(url.backend_name()).ok_or_else(unknown)?;
        if let Some(driver) = url.driver_name() {
            if !dialect.drivers().contains(&driver) {
                return Err(unknown());
            }
        }
        Ok(dialect)
    }

    /// 既知のドライバ名（先頭が既定のドライバ）
    pub fn drivers(&self) -> &'static [&'static str] {
        match self {
            Dialect::PostgreSQL => &["psycopg2", "pg8000", "pypostgresql"],
            Dialect::MySQL => &["mysqldb", "pymysql", "mysqlconnector", "oursql"],
            Dialect::SQLite => &["pysqlite"],
            Dialect::Oracle => &["cx_oracle"],
            Dialect::MsSql => &["pyodbc", "pymssql"],
        }
    }

    /// 既定のドライバ名
    pub fn default_driver(&self) -> &'static str {
        self.drivers()[0]
    }

    /// 方言固有の引数
    pub fn dialect_args(&self) -> &'static [&'static str] {
        match self {
            Dialect::PostgreSQL => &["server_side_cursors", "isolation_level", "use_native_unicode"],
            Dialect::MySQL => &["isolation_level"],
            Dialect::SQLite => &[],
            Dialect::Oracle => &["use_ansi", "threaded", "auto_convert_lobs"],
            Dialect::MsSql => &["query_timeout"],
        }
    }

    /// 既定のプールクラス
    pub fn default_pool_class(&self) -> PoolClass {
        match self {
            Dialect::SQLite => PoolClass::SingletonThread,
            _ => PoolClass::Queue,
        }
    }

    /// 既定のポート番号（ファイルベースの方言は `None`）
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Dialect::PostgreSQL => Some(5432),
            Dialect::MySQL => Some(3306),
            Dialect::SQLite => None,
            Dialect::Oracle => Some(1521),
            Dialect::MsSql => Some(1433),
        }
    }

    /// URLからドライバの接続引数を組み立てる
    pub fn connect_args(&self, url: &Url) -> BTreeMap<String, ConfigValue> {
        match self {
            Dialect::PostgreSQL => url.translate_connect_args(&[("username", "user")]),
            Dialect::MySQL => url.translate_connect_args(&[
                ("username", "user"),
                ("database", "db"),
                ("password", "passwd"),
            ]),
            Dialect::SQLite => {
                // ファイル名が無ければインメモリ
                let filename = url
                    .database()
                    .filter(|d| !d.is_empty())
                    .unwrap_or(":memory:");
                BTreeMap::from([("database".to_string(), ConfigValue::from(filename))])
            }
            Dialect::Oracle => url.translate_connect_args(&[("username", "user"), ("database", "dsn")]),
            Dialect::MsSql => url.translate_connect_args(&[("username", "user")]),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
            Dialect::Oracle => write!(f, "oracle"),
            Dialect::MsSql => write!(f, "mssql"),
        }
    }
}

/// コネクションプールクラス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolClass {
    #[serde(rename = "QueuePool")]
    Queue,
    #[serde(rename = "SingletonThreadPool")]
    SingletonThread,
    #[serde(rename = "NullPool")]
    Null,
    #[serde(rename = "StaticPool")]
    Static,
    #[serde(rename = "AssertionPool")]
    Assertion,
}

/// キュープールだけが受け付ける引数
pub const QUEUE_POOL_ARGS: &[&str] = &["pool_size", "max_overflow", "pool_timeout"];

impl PoolClass {
    /// プール引数を受け付けるかどうか
    pub fn accepts(&self, argument: &str) -> bool {
        !QUEUE_POOL_ARGS.contains(&argument) || *self == PoolClass::Queue
    }
}

impl fmt::Display for PoolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolClass::Queue => write!(f, "QueuePool"),
            PoolClass::SingletonThread => write!(f, "SingletonThreadPool"),
            PoolClass::Null => write!(f, "NullPool"),
            PoolClass::Static => write!(f, "StaticPool"),
            PoolClass::Assertion => write!(f, "AssertionPool"),
        }
    }
}

impl FromStr for PoolClass {
    type Err = EngineConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "queue" | "QueuePool" => Ok(PoolClass::Queue),
            "singleton_thread" | "SingletonThreadPool" => Ok(PoolClass::SingletonThread),
            "null" | "NullPool" => Ok(PoolClass::Null),
            "static" | "StaticPool" => Ok(PoolClass::Static),
            "assertion" | "AssertionPool" => Ok(PoolClass::Assertion),
            other => Err(EngineConfigError::InvalidPoolClass {
                name: other.to_string(),
            }),
        }
    }
}
