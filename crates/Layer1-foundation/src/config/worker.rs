//! Worker Settings - 원격 자동화 워커 접속 설정
//!
//! 로드 순서 (뒤가 우선):
//! 기본값 → 글로벌 `worker.json` → 프로젝트 `worker.json` → 환경 변수 → CLI 플래그

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 설정 파일명
pub const WORKER_SETTINGS_FILE: &str = "worker.json";

pub const ENV_WORKER_URL: &str = "JOBPILOT_WORKER_URL";
pub const ENV_API_KEY: &str = "JOBPILOT_API_KEY";
pub const ENV_POLL_INTERVAL: &str = "JOBPILOT_POLL_INTERVAL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_APPLY_DEADLINE_SECS: u64 = 180;
const DEFAULT_CONTACTS_DEADLINE_SECS: u64 = 180;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 워커 접속 설정
///
/// 모든 필드는 optional - 병합 시 `Some` 값만 덮어쓴다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSettings {
    /// 워커 (터널) base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// 워커로 전달되는 API 키
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// 상태 폴링 간격 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// 지원(apply) 작업 기본 데드라인 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_deadline_secs: Option<u64>,

    /// 연락처 검색 작업 기본 데드라인 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts_deadline_secs: Option<u64>,

    /// 개별 HTTP 요청 타임아웃 (초)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl WorkerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 + 환경 변수 병합 로드
    pub fn load() -> Result<Self> {
        let mut settings = Self::new();

        if let Ok(global) = JsonStore::global() {
            if let Some(global_settings) = global.load_optional::<Self>(WORKER_SETTINGS_FILE)? {
                settings.merge(global_settings);
            }
        }

        let project = JsonStore::current_project()?;
        if let Some(project_settings) = project.load_optional::<Self>(WORKER_SETTINGS_FILE)? {
            settings.merge(project_settings);
        }

        settings.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// 특정 저장소에서만 로드 (없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<Self>(WORKER_SETTINGS_FILE)?
            .unwrap_or_default())
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<()> {
        self.save_to(&JsonStore::global()?)
    }

    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(WORKER_SETTINGS_FILE, self)
    }

    /// `other`의 `Some` 값으로 덮어쓰기
    pub fn merge(&mut self, other: WorkerSettings) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.poll_interval_secs.is_some() {
            self.poll_interval_secs = other.poll_interval_secs;
        }
        if other.apply_deadline_secs.is_some() {
            self.apply_deadline_secs = other.apply_deadline_secs;
        }
        if other.contacts_deadline_secs.is_some() {
            self.contacts_deadline_secs = other.contacts_deadline_secs;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
    }

    /// 환경 변수 적용 (lookup 주입 - 테스트용)
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_WORKER_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{} must be a number of seconds, got '{}'", ENV_POLL_INTERVAL, raw))
            })?;
            self.poll_interval_secs = Some(secs);
        }
        Ok(())
    }

    // ========================================================================
    // effective 값들
    // ========================================================================

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
    }

    pub fn apply_deadline(&self) -> Duration {
        Duration::from_secs(self.apply_deadline_secs.unwrap_or(DEFAULT_APPLY_DEADLINE_SECS))
    }

    pub fn contacts_deadline(&self) -> Duration {
        Duration::from_secs(
            self.contacts_deadline_secs
                .unwrap_or(DEFAULT_CONTACTS_DEADLINE_SECS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// API 키를 마스킹한 값 (표시용)
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }

    /// 설정 검증
    pub fn validate(&self) -> Result<()> {
        if self.effective_base_url().trim().is_empty() {
            return Err(Error::Config("worker base URL is empty".to_string()));
        }

        let interval = self.poll_interval();
        if interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".to_string()));
        }

        for (name, deadline) in [
            ("apply deadline", self.apply_deadline()),
            ("contacts deadline", self.contacts_deadline()),
        ] {
            if deadline.is_zero() {
                return Err(Error::Config(format!("{} must be positive", name)));
            }
            if interval >= deadline {
                return Err(Error::Config(format!(
                    "poll interval ({}s) must be shorter than the {} ({}s)",
                    interval.as_secs(),
                    name,
                    deadline.as_secs()
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }
}

/// 앞 4글자만 남기고 마스킹
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{}…", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = WorkerSettings::new();
        assert_eq!(settings.effective_base_url(), DEFAULT_BASE_URL);
        assert_eq!(settings.poll_interval(), Duration::from_secs(5));
        assert_eq!(settings.apply_deadline(), Duration::from_secs(180));
        assert_eq!(settings.contacts_deadline(), Duration::from_secs(180));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_merge_only_overrides_present_values() {
        let mut base = WorkerSettings::new()
            .base_url("https://global.example")
            .api_key("global-key");

        let overlay = WorkerSettings::new().base_url("https://tunnel.example");
        base.merge(overlay);

        assert_eq!(base.effective_base_url(), "https://tunnel.example");
        assert_eq!(base.api_key.as_deref(), Some("global-key"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_WORKER_URL, "https://abc.tunnel.example"),
            (ENV_API_KEY, "sk-live-123456"),
            (ENV_POLL_INTERVAL, "2"),
        ]
        .into_iter()
        .collect();

        let mut settings = WorkerSettings::new();
        settings
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.effective_base_url(), "https://abc.tunnel.example");
        assert_eq!(settings.api_key.as_deref(), Some("sk-live-123456"));
        assert_eq!(settings.poll_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_env_invalid_interval() {
        let mut settings = WorkerSettings::new();
        let err = settings
            .apply_env_with(|key| (key == ENV_POLL_INTERVAL).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_interval_shorter_than_deadline() {
        let mut settings = WorkerSettings::new().poll_interval_secs(200);
        assert!(settings.validate().is_err());

        settings.poll_interval_secs = Some(0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_masked_api_key() {
        let settings = WorkerSettings::new().api_key("sk-live-123456");
        assert_eq!(settings.masked_api_key().as_deref(), Some("sk-l…"));
    }

    #[test]
    fn test_round_trip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let settings = WorkerSettings::new()
            .base_url("https://abc.tunnel.example")
            .poll_interval_secs(3);
        settings.save_to(&store).unwrap();

        let raw = std::fs::read_to_string(store.file_path(WORKER_SETTINGS_FILE)).unwrap();
        assert!(raw.contains("\"baseUrl\""));
        assert!(raw.contains("\"pollIntervalSecs\""));
        assert!(!raw.contains("apiKey"));

        let loaded = WorkerSettings::load_from(&store).unwrap();
        assert_eq!(loaded, settings);
    }
}
