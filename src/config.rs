use crate::{
    config::date_locale::DateLocaleConfig,
    error::{BadEnvVarSnafu, TweedResult},
};
use dotenvy::var;
use snafu::ResultExt;
use std::sync::Arc;

pub mod date_locale;

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    api_config: Arc<ApiConfig>,
    date_locale_config: Arc<DateLocaleConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> TweedResult<Self> {
        let get_env_var_or = |name: &str, default: &str| -> String {
            var(name).unwrap_or_else(|_| default.to_string())
        };

        let date_locale_config = DateLocaleConfig::new(
            get_env_var_or("TWEED_TIMEZONE", "America/Sao_Paulo"),
            get_env_var_or("TWEED_LOCALE", "pt-BR"),
            get_env_var_or("TWEED_HOUR_CYCLE", "h23"),
            get_env_var_or("TWEED_CALENDAR", "gregorian"),
        )?;

        Ok(Self::from_parts(ApiConfig::from_env()?, date_locale_config))
    }

    pub fn from_parts(api_config: ApiConfig, date_locale_config: DateLocaleConfig) -> Self {
        Self {
            api_config: Arc::new(api_config),
            date_locale_config: Arc::new(date_locale_config),
        }
    }

    pub fn api_config(&self) -> Arc<ApiConfig> {
        self.api_config.clone()
    }

    pub fn date_locale_config(&self) -> Arc<DateLocaleConfig> {
        self.date_locale_config.clone()
    }
}

#[derive(Debug)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub const fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> TweedResult<Self> {
        let name = "TWEED_API_URL";
        Ok(Self::new(var(name).context(BadEnvVarSnafu { name })?))
    }

    ///eg. `http://localhost:3333`, the `/student` resource hangs off this
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
