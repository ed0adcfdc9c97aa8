/// CLI エントリーポイントのテスト
///
/// CLIの構造が正しく定義され、すべてのサブコマンドとオプションが
/// 期待通りにパースされることを確認します。
use clap::Parser;

#[cfg(test)]
mod cli_tests {
    use super::*;
    use dbconf::cli::{Cli, Commands, OutputFormat};

    /// ヘルプとバージョンフラグ
    #[test]
    fn test_cli_help_and_version() {
        assert!(Cli::try_parse_from(["dbconf", "--help"]).is_err());
        assert!(Cli::try_parse_from(["dbconf", "--version"]).is_err());
    }

    #[test]
    fn test_parse_command_parses() {
        let cli = Cli::try_parse_from(["dbconf", "parse", "sqlite:///:memory:"]).unwrap();
        match cli.command {
            Commands::Parse { url, show_password } => {
                assert_eq!(url, "sqlite:///:memory:");
                assert!(!show_password);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_parse_command_requires_url() {
        assert!(Cli::try_parse_from(["dbconf", "parse"]).is_err());
    }

    #[test]
    fn test_coerce_command_defaults() {
        let cli = Cli::try_parse_from(["dbconf", "coerce"]).unwrap();
        match cli.command {
            Commands::Coerce { section, prefix } => {
                assert_eq!(section, "engine");
                assert_eq!(prefix, "");
            }
            _ => panic!("Expected Coerce command"),
        }
    }

    #[test]
    fn test_check_command_with_options() {
        let cli = Cli::try_parse_from([
            "dbconf",
            "check",
            "--section",
            "prefixed",
            "--prefix",
            "sqlalchemy.",
            "--config",
            "settings.yaml",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("settings.yaml")));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Check { section, prefix } => {
                assert_eq!(section, "prefixed");
                assert_eq!(prefix, "sqlalchemy.");
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["dbconf", "--verbose", "--no-color", "coerce"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Cli::try_parse_from(["dbconf", "apply"]).is_err());
    }
}
