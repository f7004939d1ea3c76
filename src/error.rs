use thiserror::Error;

#[derive(Error, Debug)]
/// Export error
pub enum ExportError {
    #[error("DataSource from: {0}")]
    DataSource(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("Xml from: {0}")]
    Xml(String),

    #[error("Encoding from: {0}")]
    Encoding(String),

    #[error("Unbalanced document, still open: {}", open.join(", "))]
    Unbalanced { open: Vec<String> },

    #[error("Configuration: {0}")]
    Configuration(String),
}
