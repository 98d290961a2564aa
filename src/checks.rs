use crate::client::SupabaseClient;
use crate::config::SmokeConfig;
use crate::errors::SmokeError;
use crate::models::ListRequest;

/// Settings rows are looked up by this column.
pub const SETTINGS_KEY_COLUMN: &str = "user_id";
/// How many listed files get their own line.
pub const LISTED_FILES_SHOWN: usize = 3;
/// Body excerpt length when the listing endpoint answers with a non-200.
pub const LIST_BODY_EXCERPT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
	Bucket,
	SettingsRead,
	FunctionReachable,
	StorageList,
}

impl CheckKind {
	pub const ALL: [CheckKind; 4] = [CheckKind::Bucket, CheckKind::SettingsRead, CheckKind::FunctionReachable, CheckKind::StorageList];

	pub fn name(self) -> &'static str {
		match self {
			CheckKind::Bucket => "Storage Bucket",
			CheckKind::SettingsRead => "数据库读取",
			CheckKind::FunctionReachable => "Edge Function",
			CheckKind::StorageList => "Storage文件列表",
		}
	}

	pub fn title(self) -> &'static str {
		match self {
			CheckKind::Bucket => "Storage Bucket验证",
			CheckKind::SettingsRead => "数据库读取验证",
			CheckKind::FunctionReachable => "Edge Function健康检查",
			CheckKind::StorageList => "Storage文件列表",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	Ok,
	Warn,
	Fail,
	Detail,
}

#[derive(Debug, Clone)]
pub struct CheckReport {
	pub kind: CheckKind,
	pub passed: bool,
	pub lines: Vec<(Marker, String)>,
}

impl CheckReport {
	fn new(kind: CheckKind) -> Self {
		Self { kind, passed: false, lines: Vec::new() }
	}

	fn push(&mut self, marker: Marker, line: impl Into<String>) {
		self.lines.push((marker, line.into()));
	}

	fn pass(mut self) -> Self {
		self.passed = true;
		self
	}

	/// Records a failed request: the status and body for HTTP errors, the message otherwise.
	fn fail(mut self, what: &str, err: &SmokeError) -> Self {
		tracing::warn!(check = self.kind.name(), error = %err, "check failed");
		if let Some(status) = err.status() {
			self.push(Marker::Fail, format!("{}: {}", what, status.as_u16()));
			self.push(Marker::Detail, format!("响应: {}", err.body().unwrap_or_default()));
		} else if err.is_transport() {
			self.push(Marker::Fail, format!("网络错误: {}", err));
		} else {
			self.push(Marker::Fail, format!("{}: {}", what, err));
		}
		self.passed = false;
		self
	}

	pub fn contains(&self, needle: &str) -> bool {
		self.lines.iter().any(|(_, l)| l.contains(needle))
	}
}

fn or_na<T: ToString>(v: Option<T>) -> String {
	v.map(|x| x.to_string()).unwrap_or_else(|| "N/A".into())
}

pub async fn check_bucket(client: &SupabaseClient, cfg: &SmokeConfig) -> CheckReport {
	let mut report = CheckReport::new(CheckKind::Bucket);
	match client.get_bucket(&cfg.bucket).await {
		Ok(bucket) => {
			report.push(Marker::Ok, "Storage Bucket存在");
			report.push(Marker::Detail, format!("Bucket名称: {}", or_na(bucket.name)));
			report.push(Marker::Detail, format!("公共访问: {}", or_na(bucket.public)));
			report.push(Marker::Detail, format!("文件大小限制: {}", or_na(bucket.file_size_limit)));
			report.pass()
		}
		Err(e) => report.fail("Bucket检查失败", &e),
	}
}

pub async fn check_settings_read(client: &SupabaseClient, cfg: &SmokeConfig) -> CheckReport {
	let mut report = CheckReport::new(CheckKind::SettingsRead);
	match client.select_eq(&cfg.settings_table, SETTINGS_KEY_COLUMN, &cfg.user_id).await {
		Ok(rows) => {
			match rows.into_iter().next() {
				Some(settings) => {
					report.push(Marker::Ok, "数据库读取成功");
					report.push(Marker::Detail, format!("主题: {}", or_na(settings.theme)));
					report.push(Marker::Detail, format!("语言: {}", or_na(settings.language)));
					report.push(Marker::Detail, format!("字体: {}", or_na(settings.font_size)));
					let bg = settings.background_image_url.filter(|u| !u.is_empty()).unwrap_or_else(|| "未设置".into());
					report.push(Marker::Detail, format!("背景URL: {}", bg));
				}
				None => {
					tracing::info!(user_id = %cfg.user_id, "no settings row yet");
					report.push(Marker::Warn, "数据库中无测试数据（这是正常的，等待前端首次保存）");
				}
			}
			report.pass()
		}
		Err(e) => report.fail("数据库读取失败", &e),
	}
}

pub async fn check_function_reachable(client: &SupabaseClient, cfg: &SmokeConfig) -> CheckReport {
	let mut report = CheckReport::new(CheckKind::FunctionReachable);
	let url = client.function_url(&cfg.function);
	match client.preflight(&cfg.function).await {
		Ok(status) => {
			report.push(Marker::Ok, "Edge Function端点可访问");
			report.push(Marker::Detail, format!("URL: {}", url));
			report.push(Marker::Detail, format!("CORS检查: {}", status.as_u16()));
			report.pass()
		}
		Err(e) => {
			tracing::warn!(check = report.kind.name(), error = %e, "check failed");
			report.push(Marker::Fail, format!("Edge Function不可访问: {}", e));
			report
		}
	}
}

pub async fn check_storage_list(client: &SupabaseClient, cfg: &SmokeConfig) -> CheckReport {
	let mut report = CheckReport::new(CheckKind::StorageList);
	match client.list_objects(&cfg.bucket, &ListRequest::default()).await {
		Ok(files) => {
			report.push(Marker::Ok, "Storage文件列表查询成功");
			report.push(Marker::Detail, format!("文件总数: {}", files.len()));
			if files.is_empty() {
				report.push(Marker::Detail, "当前无文件（等待用户上传）");
			}
			for f in files.iter().take(LISTED_FILES_SHOWN) {
				report.push(Marker::Detail, format!("{} ({} bytes)", or_na(f.name.as_deref()), or_na(f.size())));
			}
			report.pass()
		}
		Err(SmokeError::Status { status, body }) => {
			tracing::warn!(status = %status, "storage listing answered with a non-200; not fatal");
			report.push(Marker::Warn, format!("文件列表查询: {}", status.as_u16()));
			report.push(Marker::Detail, format!("响应: {}", excerpt(&body, LIST_BODY_EXCERPT)));
			report.pass()
		}
		Err(SmokeError::Json(e)) => {
			tracing::warn!(error = %e, "storage listing body is not an array; not fatal");
			report.push(Marker::Warn, format!("文件列表响应无法解析: {}", e));
			report.pass()
		}
		Err(e) => report.fail("文件列表查询失败", &e),
	}
}

/// Runs every check in `CheckKind::ALL` order, one request at a time.
pub async fn run_all(client: &SupabaseClient, cfg: &SmokeConfig) -> Vec<CheckReport> {
	let mut reports = Vec::with_capacity(CheckKind::ALL.len());
	for kind in CheckKind::ALL {
		let report = match kind {
			CheckKind::Bucket => check_bucket(client, cfg).await,
			CheckKind::SettingsRead => check_settings_read(client, cfg).await,
			CheckKind::FunctionReachable => check_function_reachable(client, cfg).await,
			CheckKind::StorageList => check_storage_list(client, cfg).await,
		};
		tracing::info!(check = kind.name(), passed = report.passed, "check finished");
		reports.push(report);
	}
	reports
}

/// First `max` characters of `s`, never splitting a code point.
fn excerpt(s: &str, max: usize) -> &str {
	match s.char_indices().nth(max) {
		Some((idx, _)) => &s[..idx],
		None => s,
	}
}
