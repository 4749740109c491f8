#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_hosted_qwen() {
        let config = Config::default();
        assert_eq!(config.llm.model, "Qwen/Qwen2.5-7B-Instruct:together");
        assert_eq!(config.llm.api_key_env, "HUGGINGFACEHUB_API_TOKEN");
        assert_eq!(config.llm.max_tokens, 512);
        assert!((config.llm.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.dataset.path, PathBuf::from("titanic.csv"));
    }

    #[test]
    fn test_client_timeout_matches_llm_timeout() {
        let config = Config::default();
        assert_eq!(config.client.timeout_secs, 60);
        assert!(config.client.timeout_secs >= config.llm.timeout_secs);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [llm]
            model = "meta-llama/Llama-3.1-8B-Instruct"

            [charts]
            width = 1024
            "#,
        ).unwrap();
        assert_eq!(config.llm.model, "meta-llama/Llama-3.1-8B-Instruct");
        assert_eq!(config.llm.base_url, "https://router.huggingface.co");
        assert_eq!(config.charts.width, 1024);
        assert_eq!(config.charts.height, 500);
        assert_eq!(config.agent.max_iterations, 8);
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = Config::from_toml_str("[llm]\nmax_tokens = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_optional_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("titanic.toml"), false).unwrap();
        assert_eq!(config.client.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_missing_required_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml"), true).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titanic.toml");
        std::fs::write(&path, "[dataset]\npath = \"data/train.csv\"\n").unwrap();
        let config = Config::load_from(&path, true).unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("data/train.csv"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TITANIC_BIND", "127.0.0.1:9000"),
            ("TITANIC_DATASET", "/srv/titanic.csv"),
            ("TITANIC_MODEL", "Qwen/Qwen2.5-72B-Instruct"),
        ]);
        let mut config = Config::default();
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.dataset.path, PathBuf::from("/srv/titanic.csv"));
        assert_eq!(config.llm.model, "Qwen/Qwen2.5-72B-Instruct");
        assert_eq!(config.client.api_url, "http://localhost:8000");
    }

    #[test]
    fn test_placeholder_token_is_not_a_token() {
        assert!(!is_real_token("your_token_here"));
        assert!(!is_real_token("   "));
        assert!(is_real_token("hf_abc123"));
    }
}
