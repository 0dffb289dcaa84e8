use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Sdk(#[from] netrules_sdk::SdkError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
