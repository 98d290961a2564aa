use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};
use time::OffsetDateTime;

// Remote records are read field by field: a field of an unexpected type becomes `None`
// without taking its neighbours down with it.

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bucket {
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub id: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub name: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub public: Option<bool>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub file_size_limit: Option<u64>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub allowed_mime_types: Option<Vec<String>>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub created_at: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub updated_at: Option<String>,
}

/// One row of the `user_settings` table.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSettings {
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub id: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub user_id: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub theme: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub language: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub font_size: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub background_image_url: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub updated_at: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMetadata {
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub size: Option<u64>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default, rename = "mimetype")]
	pub mime_type: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredObject {
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub name: Option<String>,
	#[serde_as(deserialize_as = "DefaultOnError")]
	#[serde(default)]
	pub metadata: Option<ObjectMetadata>,
}

impl StoredObject {
	pub fn size(&self) -> Option<u64> {
		self.metadata.as_ref().and_then(|m| m.size)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
	pub limit: u32,
	pub offset: u32,
}

impl Default for ListRequest {
	fn default() -> Self {
		Self { limit: 10, offset: 0 }
	}
}

/// Claims read from the anon key payload. Only the fields worth reporting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyClaims {
	#[serde(default)]
	pub iss: Option<String>,
	#[serde(default, rename = "ref")]
	pub project_ref: Option<String>,
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub exp: Option<i64>,
}

impl KeyClaims {
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.exp.map(|exp| exp <= now.unix_timestamp()).unwrap_or(false)
	}

	pub fn expires_iso(&self) -> Option<String> {
		let exp = OffsetDateTime::from_unix_timestamp(self.exp?).ok()?;
		exp.format(&time::format_description::well_known::Rfc3339).ok()
	}
}

pub fn now_iso() -> String {
	OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into())
}
