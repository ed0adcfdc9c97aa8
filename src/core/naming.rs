// 命名ポリシー
//
// アプリケーション名と既定値の単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "dbconf";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = "dbconf.yaml";

/// 既定の設定セクション名
pub const DEFAULT_SECTION: &str = "engine";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        assert_eq!(APP_NAME, "dbconf");
        assert!(CONFIG_FILE.starts_with(APP_NAME));
    }
}
