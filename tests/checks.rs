use std::time::Duration;

use serde_json::json;
use supa_smoke::checks::{check_bucket, check_function_reachable, check_settings_read, check_storage_list, CheckKind, Marker};
use supa_smoke::client::SupabaseClient;
use supa_smoke::config::SmokeConfig;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-anon-key";

fn config(base: &str) -> SmokeConfig {
	SmokeConfig {
		base_url: base.to_string(),
		anon_key: KEY.into(),
		user_id: "user-1".into(),
		timeout_secs: 1,
		..SmokeConfig::default()
	}
}

fn client(cfg: &SmokeConfig) -> SupabaseClient {
	SupabaseClient::new(cfg).unwrap()
}

/// Nothing listens on port 1 on a test box.
fn unreachable() -> SmokeConfig {
	config("http://127.0.0.1:1")
}

#[tokio::test]
async fn bucket_present_passes_with_details() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/storage/v1/bucket/background-images"))
		.and(header("apikey", KEY))
		.and(header("Authorization", "Bearer test-anon-key"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"id": "background-images",
			"name": "background-images",
			"public": true,
			"file_size_limit": 5242880
		})))
		.expect(1)
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_bucket(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert_eq!(report.kind, CheckKind::Bucket);
	assert!(report.contains("Bucket名称: background-images"));
	assert!(report.contains("公共访问: true"));
	assert!(report.contains("文件大小限制: 5242880"));
}

#[tokio::test]
async fn bucket_non_json_body_passes_with_placeholders() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/storage/v1/bucket/background-images"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_bucket(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(report.contains("Bucket名称: N/A"));
	assert!(report.contains("公共访问: N/A"));
	assert!(report.contains("文件大小限制: N/A"));
}

#[tokio::test]
async fn bucket_missing_fails_with_body() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/storage/v1/bucket/background-images"))
		.respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":\"Bucket not found\"}"))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_bucket(&client(&cfg), &cfg).await;
	assert!(!report.passed);
	assert!(report.contains("Bucket检查失败: 404"));
	assert!(report.contains("Bucket not found"));
}

#[tokio::test]
async fn bucket_timeout_fails() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_bucket(&client(&cfg), &cfg).await;
	assert!(!report.passed);
	assert!(report.lines.iter().any(|(m, l)| *m == Marker::Fail && l.starts_with("网络错误")));
}

#[tokio::test]
async fn bucket_connection_refused_fails() {
	let cfg = unreachable();
	let report = check_bucket(&client(&cfg), &cfg).await;
	assert!(!report.passed);
}

#[tokio::test]
async fn settings_row_passes_with_success_marker() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/rest/v1/user_settings"))
		.and(query_param("user_id", "eq.user-1"))
		.and(header("apikey", KEY))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([{
			"user_id": "user-1",
			"theme": "dark",
			"language": "zh-CN",
			"font_size": "medium",
			"background_image_url": null
		}])))
		.expect(1)
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_settings_read(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(report.contains("数据库读取成功"));
	assert!(report.contains("主题: dark"));
	assert!(report.contains("字体: medium"));
	assert!(report.contains("背景URL: 未设置"));
}

#[tokio::test]
async fn settings_field_of_wrong_type_keeps_the_others() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/rest/v1/user_settings"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([{
			"theme": "dark",
			"language": "zh",
			"font_size": 16,
			"background_image_url": null
		}])))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_settings_read(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(report.contains("数据库读取成功"));
	assert!(report.contains("主题: dark"));
	assert!(report.contains("语言: zh"));
	assert!(report.contains("字体: N/A"));
	assert!(report.contains("背景URL: 未设置"));
}

#[tokio::test]
async fn settings_empty_still_passes() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/rest/v1/user_settings"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_settings_read(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(!report.contains("数据库读取成功"));
	assert_eq!(report.lines[0].0, Marker::Warn);
}

#[tokio::test]
async fn settings_error_status_fails() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/rest/v1/user_settings"))
		.respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API key" })))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_settings_read(&client(&cfg), &cfg).await;
	assert!(!report.passed);
	assert!(report.contains("数据库读取失败: 401"));
}

#[tokio::test]
async fn settings_non_array_body_fails() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/rest/v1/user_settings"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_settings_read(&client(&cfg), &cfg).await;
	assert!(!report.passed);
}

#[tokio::test]
async fn function_reachable_on_any_status() {
	let server = MockServer::start().await;
	Mock::given(method("OPTIONS"))
		.and(path("/functions/v1/upload-background-image"))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_function_reachable(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(report.contains("CORS检查: 500"));

	// unmatched requests get wiremock's 404, still reachable
	let other = SmokeConfig { function: "travel-chat".into(), ..cfg };
	let report = check_function_reachable(&client(&other), &other).await;
	assert!(report.passed);
	assert!(report.contains("CORS检查: 404"));
}

#[tokio::test]
async fn function_unreachable_fails() {
	let cfg = unreachable();
	let report = check_function_reachable(&client(&cfg), &cfg).await;
	assert!(!report.passed);
	assert!(report.contains("Edge Function不可访问"));
}

#[tokio::test]
async fn storage_list_reports_first_three_files() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/storage/v1/object/list/background-images"))
		.and(header("Content-Type", "application/json"))
		.and(body_json(json!({ "limit": 10, "offset": 0 })))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([
			{ "name": "a.png", "metadata": { "size": 100 } },
			{ "name": "b.png", "metadata": { "size": 200 } },
			{ "name": "c.png", "metadata": null },
			{ "name": "d.png", "metadata": { "size": 400 } }
		])))
		.expect(1)
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_storage_list(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(report.contains("文件总数: 4"));
	assert!(report.contains("a.png (100 bytes)"));
	assert!(report.contains("c.png (N/A bytes)"));
	assert!(!report.contains("d.png"));
}

#[tokio::test]
async fn storage_list_empty_says_no_files_yet() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/storage/v1/object/list/background-images"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_storage_list(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert!(report.contains("文件总数: 0"));
	assert!(report.contains("当前无文件（等待用户上传）"));
}

#[tokio::test]
async fn storage_list_non_array_body_warns_and_passes() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/storage/v1/object/list/background-images"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "unexpected shape" })))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_storage_list(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert_eq!(report.lines[0].0, Marker::Warn);
	assert!(report.lines[0].1.starts_with("文件列表响应无法解析"));
	assert!(!report.contains("Storage文件列表查询成功"));
}

#[tokio::test]
async fn storage_list_error_status_is_lenient() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/storage/v1/object/list/background-images"))
		.respond_with(ResponseTemplate::new(400).set_body_string("x".repeat(500)))
		.mount(&server)
		.await;

	let cfg = config(&server.uri());
	let report = check_storage_list(&client(&cfg), &cfg).await;
	assert!(report.passed);
	assert_eq!(report.lines[0], (Marker::Warn, "文件列表查询: 400".to_string()));
	assert_eq!(report.lines[1].1, format!("响应: {}", "x".repeat(200)));
}

#[tokio::test]
async fn storage_list_network_error_fails() {
	let cfg = unreachable();
	let report = check_storage_list(&client(&cfg), &cfg).await;
	assert!(!report.passed);
}
