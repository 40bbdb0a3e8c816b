//! # jobpilot-foundation
//!
//! Foundation layer for JobPilot:
//! - Error: 공통 에러 타입 (`Error`, `Result`)
//! - Storage: JsonStore (글로벌 / 프로젝트 설정 파일)
//! - Config: 워커 접속 설정 (`WorkerSettings`)

pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Storage / Config
// ============================================================================
pub use config::{mask_secret, WorkerSettings, WORKER_SETTINGS_FILE};
pub use storage::JsonStore;
