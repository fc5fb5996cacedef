use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::datasource::LedgerSourceError;
use crate::export::ExportError;
use crate::orchestration::PipelineError;
use crate::publish::PublishError;
use crate::signals::SignalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerSourceError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_and_exit_codes() {
        let err: AppError = ConfigError::InvalidValue("CHUNK_SIZE".into(), "zero".into()).into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("CHUNK_SIZE"));

        let err: AppError = PipelineError::NoDataSource("down".into()).into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("no data source"));
    }

    fn load(vars: &[(&str, &str)]) -> Result<crate::config::Config, AppError> {
        let env_map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Ok(crate::config::Config::from_env_map(env_map)?)
    }

    #[test]
    fn test_invalid_config_exits_with_config_status() {
        let err = load(&[("CHUNK_SIZE", "0")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 2);

        assert!(load(&[]).is_ok());
    }
}
