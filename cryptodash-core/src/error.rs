use std::fmt;

#[derive(Debug)]
pub enum DashError {
    Network(reqwest::Error),
    Json(serde_json::Error),
    Server { status: u16, url: String },
    Config(String),
    UnsupportedPageSize { requested: usize, allowed: Vec<usize> },
    InvalidData(String),
}

impl DashError {
    /// True for failures caused by the data source answering with a non-success status.
    pub fn is_server_error(&self) -> bool {
        matches!(self, DashError::Server { .. })
    }
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::Network(e) => write!(f, "Network error: {}", e),
            DashError::Json(e) => write!(f, "JSON parsing error: {}", e),
            DashError::Server { status, url } => {
                write!(f, "Server returned status {} for {}", status, url)
            }
            DashError::Config(e) => write!(f, "Configuration error: {}", e),
            DashError::UnsupportedPageSize { requested, allowed } => write!(
                f,
                "Unsupported page size {} (allowed: {:?})",
                requested, allowed
            ),
            DashError::InvalidData(e) => write!(f, "Invalid data: {}", e),
        }
    }
}

impl std::error::Error for DashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashError::Network(e) => Some(e),
            DashError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        DashError::Network(err)
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Json(err)
    }
}
