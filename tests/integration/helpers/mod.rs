// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sitecheck::application::use_cases::site_check_use_case::SiteCheckUseCase;
use sitecheck::config::settings::Settings;
use sitecheck::utils::retry_policy::RecordingSleeper;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 模拟的QA站点：一个 wiremock 服务器加上临时的输入/输出目录
pub struct TestSite {
    pub server: MockServer,
    pub workdir: TempDir,
}

impl TestSite {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            workdir: tempfile::tempdir().expect("temp dir"),
        }
    }

    /// 形如 `127.0.0.1:PORT` 的主机名
    pub fn host(&self) -> String {
        self.server.address().to_string()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.workdir.path().join("output")
    }

    pub async fn page(&self, route: &str, status: u16, body_len: usize) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string("p".repeat(body_len)))
            .mount(&self.server)
            .await;
    }

    pub async fn redirect(&self, route: &str, status: u16, location: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).insert_header("Location", location))
            .mount(&self.server)
            .await;
    }

    /// 发布站点地图，URL 使用生产主机名
    pub async fn sitemap(&self, paths: &[&str]) {
        let entries: String = paths
            .iter()
            .map(|p| format!("  <url><loc>https://www.example.com{}</loc></url>\n", p))
            .collect();
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
            entries
        );
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(xml))
            .mount(&self.server)
            .await;
    }

    /// 写入输入 CSV（表头 + 行），返回文件路径
    pub fn input(&self, rows: &[[&str; 3]]) -> PathBuf {
        let path = self.workdir.path().join("urls.csv");
        let mut writer = csv::Writer::from_path(&path).expect("csv writer");
        writer
            .write_record(["Original URL", "Status Code", "Expected URL"])
            .expect("header");
        for row in rows {
            writer.write_record(row).expect("row");
        }
        writer.flush().expect("flush");
        path
    }

    pub fn settings(&self, input: &PathBuf) -> Settings {
        let toml = format!(
            r#"
[site]
scheme = "http"
active_environment = "qa"

[site.environments]
qa = "{host}"

[probe]
timeout_secs = 5
max_retries = 2
retry_delay_ms = 10

[input]
path = "{input}"

[input.columns]
original_url = "Original URL"
status_code = "Status Code"
expected_url = "Expected URL"

[output]
dir = "{output}"

[engine]
request_interval_ms = 0
"#,
            host = self.host(),
            input = input.display(),
            output = self.output_dir().display(),
        );
        Settings::from_file_contents(&toml).expect("settings")
    }

    pub fn use_case(&self, settings: Settings) -> SiteCheckUseCase {
        SiteCheckUseCase::new(settings, Arc::new(RecordingSleeper::new()))
    }
}
