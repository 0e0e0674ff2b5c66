//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Root for uploads and frame directories
    pub data_dir: PathBuf,
    /// Max upload size in bytes
    pub max_upload_bytes: usize,
    /// Extractions allowed to run at once
    pub max_concurrent_extractions: usize,
    /// Kill ffmpeg after this long
    pub extraction_timeout: Duration,
    /// Frames sampled per second of video
    pub frames_per_second: u32,
    /// JPEG quality passed to ffmpeg as `-q:v` (2 best, 31 worst)
    pub jpeg_quality: u8,
    /// ffmpeg binary name or path
    pub ffmpeg_path: PathBuf,
    /// Age after which frame directories are evicted; zero disables eviction
    pub frame_retention: Duration,
    /// Rate limit for `/analyze`, requests per second per client
    pub analyze_rate_limit_rps: u32,
    /// Key the rate limiter on `X-Forwarded-For` / `X-Real-IP` instead of the peer address
    pub trust_proxy_headers: bool,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Expose `/metrics`
    pub metrics_enabled: bool,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: PathBuf::from("data"),
            max_upload_bytes: 512 * 1024 * 1024, // 512MB
            max_concurrent_extractions: 4,
            extraction_timeout: Duration::from_secs(300),
            frames_per_second: 1,
            jpeg_quality: 2,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            frame_retention: Duration::from_secs(3600),
            analyze_rate_limit_rps: 2,
            trust_proxy_headers: false,
            cors_origins: vec!["*".to_string()],
            metrics_enabled: true,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("HOOP_HOST").unwrap_or(defaults.host),
            port: parse_env("HOOP_PORT").unwrap_or(defaults.port),
            data_dir: std::env::var("HOOP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            max_concurrent_extractions: parse_env("MAX_CONCURRENT_EXTRACTIONS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent_extractions),
            extraction_timeout: parse_env("EXTRACTION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.extraction_timeout),
            frames_per_second: parse_env("FRAMES_PER_SECOND")
                .filter(|n: &u32| *n > 0)
                .unwrap_or(defaults.frames_per_second),
            jpeg_quality: parse_env("JPEG_QUALITY")
                .filter(|q: &u8| (2..=31).contains(q))
                .unwrap_or(defaults.jpeg_quality),
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ffmpeg_path),
            frame_retention: parse_env("FRAME_RETENTION_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.frame_retention),
            analyze_rate_limit_rps: parse_env("ANALYZE_RATE_LIMIT_RPS")
                .unwrap_or(defaults.analyze_rate_limit_rps),
            trust_proxy_headers: std::env::var("TRUST_PROXY_HEADERS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.trust_proxy_headers),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Directory uploads are streamed into.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Directory holding frame directories; the only tree served statically.
    pub fn frames_root(&self) -> PathBuf {
        self.data_dir.join("frames")
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }
}

/// Whether an `ENVIRONMENT` value names production. Case-insensitive.
pub fn is_production_environment(environment: &str) -> bool {
    environment.trim().eq_ignore_ascii_case("production")
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
