use std::collections::BTreeMap;

use reelsmith_utils::types::ConfigSource;

use super::Config;

fn source_label(source: Option<&ConfigSource>) -> String {
    source.unwrap_or(&ConfigSource::Default).to_string()
}

impl Config {
    /// Effective configuration as `key -> (value, source)`.
    ///
    /// Every key is present with its resolved value, so defaults show up too.
    /// Keys are sorted for stable `reelsmith config` output.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: String| {
            let source = source_label(self.source_attribution.get(key));
            config.insert(key.to_string(), (value, source));
        };

        add("model_class", self.model_class().to_string());
        add("duration_minutes", self.duration_minutes().to_string());
        add("output_dir", self.output_dir().display().to_string());
        add("verbose", self.verbose().to_string());

        add("llm_provider", self.provider().to_string());
        add("retry_attempts", self.retry_attempts().to_string());
        add(
            "retry_base_delay_ms",
            self.retry_base_delay().as_millis().to_string(),
        );
        add(
            "call_budget",
            self.call_budget()
                .map_or_else(|| "unlimited".to_string(), |b| b.to_string()),
        );
        add("timeout_secs", self.llm_timeout().as_secs().to_string());

        add("best_effort", self.best_effort().to_string());
        add(
            "fast_path_max_minutes",
            self.fast_path_max_minutes().to_string(),
        );

        add("render_binary", self.render_binary().to_string());
        add("render_quality", self.render_quality().to_string());
        add("render_preview", self.render_preview().to_string());
        add("render_max_attempts", self.max_render_attempts().to_string());
        add("render_media_dir", self.media_dir().display().to_string());

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_config_lists_defaults() {
        let config = Config::default();
        let effective = config.effective_config();

        assert_eq!(
            effective.get("duration_minutes"),
            Some(&("3".to_string(), "default".to_string()))
        );
        assert_eq!(
            effective.get("call_budget"),
            Some(&("unlimited".to_string(), "default".to_string()))
        );
        assert_eq!(
            effective.get("model_class").map(|(v, _)| v.as_str()),
            Some("high-quality")
        );
    }

    #[test]
    fn test_effective_config_reports_attributed_source() {
        let mut config = Config::default();
        config.llm.provider = Some("openai".to_string());
        config
            .source_attribution
            .insert("llm_provider".to_string(), ConfigSource::Env);

        let effective = config.effective_config();
        assert_eq!(
            effective.get("llm_provider"),
            Some(&("openai".to_string(), "env".to_string()))
        );
    }
}
