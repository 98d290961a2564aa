use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};

use crate::config::SmokeConfig;
use crate::errors::{SmokeError, SmokeResult};
use crate::models::{Bucket, ListRequest, StoredObject, UserSettings};

/// Unreserved characters (RFC 3986) stay as-is in path segments and filter values.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Thin wrapper over the three Supabase surfaces the smoke test touches.
#[derive(Clone)]
pub struct SupabaseClient {
	client: reqwest::Client,
	base: String,
}

impl SupabaseClient {
	pub fn new(cfg: &SmokeConfig) -> SmokeResult<Self> {
		reqwest::Url::parse(cfg.base()).map_err(|e| SmokeError::Config(format!("base url '{}': {}", cfg.base(), e)))?;
		let mut default_headers = HeaderMap::new();
		default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
		let key = HeaderValue::from_str(&cfg.anon_key).map_err(|e| SmokeError::Config(format!("anon key: {}", e)))?;
		default_headers.insert(HeaderName::from_static("apikey"), key);
		let bearer = HeaderValue::from_str(&format!("Bearer {}", cfg.anon_key)).map_err(|e| SmokeError::Config(format!("anon key: {}", e)))?;
		default_headers.insert(AUTHORIZATION, bearer);
		let client = reqwest::Client::builder()
			.user_agent(concat!("supa-smoke/", env!("CARGO_PKG_VERSION")))
			.timeout(cfg.timeout())
			.default_headers(default_headers)
			.build()?;
		Ok(Self { client, base: cfg.base().to_string() })
	}

	pub fn bucket_url(&self, bucket: &str) -> String {
		format!("{}/storage/v1/bucket/{}", self.base, encode(bucket))
	}

	pub fn table_url(&self, table: &str, column: &str, value: &str) -> String {
		format!("{}/rest/v1/{}?{}=eq.{}", self.base, encode(table), encode(column), encode(value))
	}

	pub fn function_url(&self, function: &str) -> String {
		format!("{}/functions/v1/{}", self.base, encode(function))
	}

	pub fn object_list_url(&self, bucket: &str) -> String {
		format!("{}/storage/v1/object/list/{}", self.base, encode(bucket))
	}

	/// `GET /storage/v1/bucket/{bucket}`. A 200 whose body is not a bucket yields empty fields.
	pub async fn get_bucket(&self, bucket: &str) -> SmokeResult<Bucket> {
		let body = self.send_ok(Method::GET, &self.bucket_url(bucket), None).await?;
		let parsed = serde_json::from_str::<serde_json::Value>(&body).and_then(serde_json::from_value);
		Ok(parsed.unwrap_or_else(|e| {
			tracing::debug!(error = %e, "bucket body did not match the expected shape");
			Bucket::default()
		}))
	}

	/// `GET /rest/v1/{table}?{column}=eq.{value}`. The body must be a JSON array of rows.
	pub async fn select_eq(&self, table: &str, column: &str, value: &str) -> SmokeResult<Vec<UserSettings>> {
		let body = self.send_ok(Method::GET, &self.table_url(table, column, value), None).await?;
		let rows: Vec<serde_json::Value> = serde_json::from_str(&body)?;
		Ok(rows.into_iter().map(|row| serde_json::from_value(row).unwrap_or_default()).collect())
	}

	/// CORS preflight against an edge function. Every HTTP answer counts, whatever its status.
	pub async fn preflight(&self, function: &str) -> SmokeResult<StatusCode> {
		let url = self.function_url(function);
		let resp = self.client.request(Method::OPTIONS, &url).send().await?;
		tracing::debug!(method = "OPTIONS", %url, status = %resp.status(), "response");
		Ok(resp.status())
	}

	/// `POST /storage/v1/object/list/{bucket}`.
	pub async fn list_objects(&self, bucket: &str, req: &ListRequest) -> SmokeResult<Vec<StoredObject>> {
		let payload = serde_json::to_value(req)?;
		let body = self.send_ok(Method::POST, &self.object_list_url(bucket), Some(&payload)).await?;
		let items: Vec<serde_json::Value> = serde_json::from_str(&body)?;
		Ok(items.into_iter().map(|item| serde_json::from_value(item).unwrap_or_default()).collect())
	}

	async fn send_ok(&self, method: Method, url: &str, json: Option<&serde_json::Value>) -> SmokeResult<String> {
		let mut req = self.client.request(method.clone(), url);
		if let Some(body) = json {
			req = req.json(body);
		}
		let resp = req.send().await?;
		let status = resp.status();
		tracing::debug!(method = %method, %url, status = %status, "response");
		let body = resp.text().await?;
		if status != StatusCode::OK {
			return Err(SmokeError::Status { status, body });
		}
		Ok(body)
	}
}

fn encode(s: &str) -> String {
	utf8_percent_encode(s, SEGMENT).to_string()
}
