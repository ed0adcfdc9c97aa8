// 接続URL
//
// `scheme://[user[:password]@][host][:port]/[database][?query]` 形式の
// データベース接続URLを解析し、元の文字列をそのまま再構築する。

use crate::core::coerce::ConfigValue;
use crate::core::error::MalformedUrlError;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// 接続URLの文法
///
/// パスワードは `@` の直前までを貪欲に取るため、最初の `/` より前にある
/// 最後の `@` が認証情報の区切りになる。
const URL_PATTERN: &str = r"(?s)^(?P<scheme>[A-Za-z0-9_+]+)://(?:(?P<username>[^:/]*)(?::(?P<password>[^/]*))?@)?(?:(?P<host>[^/:]*)(?::(?P<port>[^/]*))?)?(?:/(?P<database>.*))?$";

const SCHEME_PATTERN: &str = r"^[A-Za-z0-9_+]+$";

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"))
}

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SCHEME_PATTERN).expect("scheme pattern is a valid regex"))
}

/// パスワード表示用のマスク
pub const PASSWORD_MASK: &str = "***";

/// 認証情報の構成要素
///
/// URL上の表記（エンコード済み）とデコード後の値を両方保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
struct Credential {
    raw: String,
    decoded: String,
}

impl Credential {
    /// URL上の表記からデコードする
    fn from_raw(raw: &str, input: &str) -> Result<Self, MalformedUrlError> {
        let decoded = urlencoding::decode(raw).map_err(|_| {
            MalformedUrlError::new(input, "credentials are not valid UTF-8 after percent-decoding")
        })?;
        Ok(Self {
            raw: raw.to_string(),
            decoded: decoded.into_owned(),
        })
    }

    /// デコード済みの値からエンコードする
    fn from_decoded(value: &str) -> Self {
        Self {
            raw: encode_credential(value),
            decoded: value.to_string(),
        }
    }
}

/// 文法上の区切り文字と衝突する文字だけをパーセントエンコードする
fn encode_credential(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '%' => encoded.push_str("%25"),
            '/' => encoded.push_str("%2F"),
            ':' => encoded.push_str("%3A"),
            '?' => encoded.push_str("%3F"),
            '@' => encoded.push_str("%40"),
            _ => encoded.push(ch),
        }
    }
    encoded
}

/// データベース接続URL
///
/// 一度構築された後は変更されない。`Display` は `parse` の逆変換であり、
/// 解析に成功した文字列 `s` について `Url::parse(s)?.to_string() == s` が成り立つ。
#[derive(Debug, Clone)]
pub struct Url {
    scheme: String,
    username: Option<Credential>,
    password: Option<Credential>,
    host: Option<String>,
    port: Option<u16>,
    database: Option<String>,
    query: Vec<(String, String)>,
}

impl Url {
    /// スキームだけを持つURLを作成
    pub fn new(scheme: &str) -> Result<Self, MalformedUrlError> {
        if !scheme_regex().is_match(scheme) {
            return Err(MalformedUrlError::new(
                scheme,
                "scheme must consist of letters, digits, '_' or '+'",
            ));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            username: None,
            password: None,
            host: None,
            port: None,
            database: None,
            query: Vec::new(),
        })
    }

    /// 文字列から接続URLを解析
    pub fn parse(text: &str) -> Result<Self, MalformedUrlError> {
        let caps = url_regex().captures(text).ok_or_else(|| {
            MalformedUrlError::new(
                text,
                "expected scheme://[user[:password]@][host][:port]/[database][?query]",
            )
        })?;

        let scheme = caps["scheme"].to_string();

        let username = caps
            .name("username")
            .map(|m| Credential::from_raw(m.as_str(), text))
            .transpose()?;
        let password = caps
            .name("password")
            .map(|m| Credential::from_raw(m.as_str(), text))
            .transpose()?;

        let host = caps
            .name("host")
            .map(|m| m.as_str())
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        let port = caps
            .name("port")
            .map(|m| parse_port(m.as_str(), text))
            .transpose()?;

        let (database, query) = match caps.name("database") {
            Some(m) => {
                let (database, query) = split_query(m.as_str(), text)?;
                (Some(database), query)
            }
            None => (None, Vec::new()),
        };

        Ok(Self {
            scheme,
            username,
            password,
            host,
            port,
            database,
            query,
        })
    }

    /// ユーザー名を設定
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(Credential::from_decoded(username));
        self
    }

    /// パスワードを設定
    ///
    /// ユーザー名が未設定なら空のユーザー名を補う（`scheme://:password@host`）。
    pub fn with_password(mut self, password: &str) -> Self {
        self.username.get_or_insert_with(|| Credential::from_decoded(""));
        self.password = Some(Credential::from_decoded(password));
        self
    }

    /// ホストを設定
    ///
    /// `/`, `:`, `@` を含むホストは文法上区切れないためエラー。
    pub fn with_host(mut self, host: &str) -> Result<Self, MalformedUrlError> {
        reject_reserved("host", host, &['/', ':', '@'])?;
        self.host = Some(host.to_string()).filter(|h| !h.is_empty());
        Ok(self)
    }

    /// ポートを設定
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// データベースを設定
    ///
    /// `?` はクエリの開始と区別できないためエラー。
    pub fn with_database(mut self, database: &str) -> Result<Self, MalformedUrlError> {
        reject_reserved("database", database, &['?'])?;
        self.database = Some(database.to_string());
        Ok(self)
    }

    /// クエリパラメータを追加
    ///
    /// データベースが未設定なら空のデータベースを補う（`scheme://host/?key=value`）。
    pub fn with_query_param(mut self, key: &str, value: &str) -> Result<Self, MalformedUrlError> {
        reject_reserved("query key", key, &['&', '='])?;
        reject_reserved("query value", value, &['&'])?;
        self.database.get_or_insert_with(String::new);
        self.query.push((key.to_string(), value.to_string()));
        Ok(self)
    }

    /// スキーム（`backend+driver` 形式を含む）
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// バックエンド名（`postgresql+psycopg2` なら `postgresql`）
    pub fn backend_name(&self) -> &str {
        match self.scheme.split_once('+') {
            Some((backend, _)) => backend,
            None => &self.scheme,
        }
    }

    /// ドライバ名（`postgresql+psycopg2` なら `psycopg2`）
    pub fn driver_name(&self) -> Option<&str> {
        self.scheme.split_once('+').map(|(_, driver)| driver)
    }

    /// デコード済みのユーザー名
    pub fn username(&self) -> Option<&str> {
        self.username.as_ref().map(|c| c.decoded.as_str())
    }

    /// デコード済みのパスワード
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|c| c.decoded.as_str())
    }

    /// ホスト（空の場合は `None`）
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// ポート番号
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// データベース名またはファイルパス
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// クエリパラメータ（順序に依存しないビュー、重複キーは後勝ち）
    pub fn query(&self) -> BTreeMap<String, String> {
        self.query.iter().cloned().collect()
    }

    /// URL上の順序どおりのクエリパラメータ
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// ドライバに渡す接続引数へ変換
    ///
    /// `host`, `database`, `username`, `password`, `port` のうち値を持つものだけを含める。
    /// `renames` でキー名を置き換えられる（例: `("username", "user")`）。
    pub fn translate_connect_args(&self, renames: &[(&str, &str)]) -> BTreeMap<String, ConfigValue> {
        let rename = |name: &str| -> String {
            renames
                .iter()
                .find(|(from, _)| *from == name)
                .map_or(name, |(_, to)| *to)
                .to_string()
        };

        let mut args = BTreeMap::new();
        let text_fields = [
            ("host", self.host()),
            ("database", self.database()),
            ("username", self.username()),
            ("password", self.password()),
        ];
        for (name, value) in text_fields {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                args.insert(rename(name), ConfigValue::Str(value.to_string()));
            }
        }
        if let Some(port) = self.port {
            args.insert(rename("port"), ConfigValue::Int(i64::from(port)));
        }
        args
    }

    /// パスワードをマスクした文字列表現
    pub fn to_masked_string(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out, true)
            .expect("writing to a String cannot fail");
        out
    }

    /// 表示・JSON出力用の構成要素ビュー
    pub fn components(&self, show_password: bool) -> UrlComponents {
        UrlComponents {
            scheme: self.scheme.clone(),
            backend: self.backend_name().to_string(),
            driver: self.driver_name().map(str::to_string),
            username: self.username().map(str::to_string),
            password: self.password().map(|p| {
                if show_password {
                    p.to_string()
                } else {
                    PASSWORD_MASK.to_string()
                }
            }),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            query: self.query(),
        }
    }

    fn write_to(&self, f: &mut impl fmt::Write, mask_password: bool) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;

        if let Some(username) = &self.username {
            f.write_str(&username.raw)?;
            if let Some(password) = &self.password {
                let shown = if mask_password {
                    PASSWORD_MASK
                } else {
                    password.raw.as_str()
                };
                write!(f, ":{}", shown)?;
            }
            f.write_char('@')?;
        }

        if let Some(host) = &self.host {
            f.write_str(host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }

        if let Some(database) = &self.database {
            write!(f, "/{}", database)?;
        }

        if !self.query.is_empty() {
            let joined = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            write!(f, "?{}", joined)?;
        }

        Ok(())
    }
}

/// 文法上の区切り文字を含む値を拒否する
fn reject_reserved(field: &str, value: &str, reserved: &[char]) -> Result<(), MalformedUrlError> {
    match value.chars().find(|c| reserved.contains(c)) {
        Some(c) => Err(MalformedUrlError::new(
            value,
            format!("{} must not contain '{}'", field, c),
        )),
        None => Ok(()),
    }
}

/// ポート番号を解析（元の表記に戻せない値は拒否する）
fn parse_port(text: &str, input: &str) -> Result<u16, MalformedUrlError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MalformedUrlError::new(
            input,
            format!("port '{}' is not a decimal number", text),
        ));
    }
    if text.len() > 1 && text.starts_with('0') {
        return Err(MalformedUrlError::new(
            input,
            format!("port '{}' has leading zeros", text),
        ));
    }
    text.parse::<u16>().map_err(|_| {
        MalformedUrlError::new(input, format!("port '{}' is out of range", text))
    })
}

/// データベース部分とクエリ文字列を分離
fn split_query(
    text: &str,
    input: &str,
) -> Result<(String, Vec<(String, String)>), MalformedUrlError> {
    let Some((database, query)) = text.split_once('?') else {
        return Ok((text.to_string(), Vec::new()));
    };

    if query.is_empty() {
        return Err(MalformedUrlError::new(input, "query string is empty"));
    }

    let pairs = query
        .split('&')
        .map(|segment| {
            segment
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| {
                    MalformedUrlError::new(
                        input,
                        format!("query parameter '{}' is not of the form key=value", segment),
                    )
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((database.to_string(), pairs))
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, false)
    }
}

impl FromStr for Url {
    type Err = MalformedUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s)
    }
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.username() == other.username()
            && self.password() == other.password()
            && self.host == other.host
            && self.port == other.port
            && self.database == other.database
            && self.query() == other.query()
    }
}

impl Eq for Url {}

/// URLの構成要素（JSON出力用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlComponents {
    pub scheme: String,
    pub backend: String,
    pub driver: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub query: BTreeMap<String, String>,
}
