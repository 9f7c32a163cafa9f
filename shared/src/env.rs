use std::env;

/// 実行環境を表す
pub enum Environment {
    Development,
    Production,
}

/// 環境変数 ENV から実行環境を判定する。
/// 未設定の場合はビルドプロファイルに従う。
pub fn which() -> Environment {
    #[cfg(debug_assertions)]
    let default_env = "development";
    #[cfg(not(debug_assertions))]
    let default_env = "production";

    match env::var("ENV") {
        Err(_) => default_env.to_string(),
        Ok(v) => v,
    }
    .parse()
    .unwrap_or(Environment::Development)
}

impl std::str::FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}
