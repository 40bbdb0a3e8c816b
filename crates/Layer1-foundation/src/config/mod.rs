//! Config - 설정 관리
//!
//! - `worker.rs` - 원격 자동화 워커 접속 설정

mod worker;

pub use worker::{
    mask_secret, WorkerSettings, ENV_API_KEY, ENV_POLL_INTERVAL, ENV_WORKER_URL,
    WORKER_SETTINGS_FILE,
};
