use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmokeError {
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("unexpected status {status}")]
	Status { status: StatusCode, body: String },
	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("invalid configuration: {0}")]
	Config(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl SmokeError {
	/// Status code for `Status` errors, `None` for transport and decode failures.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			SmokeError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn body(&self) -> Option<&str> {
		match self {
			SmokeError::Status { body, .. } => Some(body.as_str()),
			_ => None,
		}
	}

	pub fn is_transport(&self) -> bool {
		matches!(self, SmokeError::Http(_))
	}
}

pub type SmokeResult<T> = Result<T, SmokeError>;
