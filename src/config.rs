use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub admin_token: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_body_size: usize,
    pub log_level: String,
    pub s3: S3Config,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for MinIO/LocalStack.
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    /// Base under which uploaded screenshots are publicly addressable;
    /// stored screenshot URLs are `<public_base_url>/<object key>`.
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
    /// Fixed recipient that gets a copy of every submission.
    pub notify_to: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let admin_token = env_required("SHIFTLOG_ADMIN_TOKEN")?;

        let host: IpAddr = env_or("SHIFTLOG_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid SHIFTLOG_HOST: {e}"))?;

        let port: u16 = env_or("SHIFTLOG_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid SHIFTLOG_PORT: {e}"))?;

        let base_url = env_or("SHIFTLOG_BASE_URL", &format!("http://{host}:{port}"));

        // Three screenshots per submission; allow a few MB each.
        let max_body_size: usize = env_or("SHIFTLOG_MAX_BODY_SIZE", "16777216")
            .parse()
            .map_err(|e| format!("Invalid SHIFTLOG_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("SHIFTLOG_LOG_LEVEL", "info");

        let bucket = env_or("SHIFTLOG_S3_BUCKET", "screenshots");
        let s3 = S3Config {
            public_base_url: env_or(
                "SHIFTLOG_SCREENSHOT_PUBLIC_URL",
                &format!("{base_url}/{bucket}"),
            ),
            bucket,
            region: env_or("SHIFTLOG_S3_REGION", "us-east-1"),
            endpoint_url: std::env::var("SHIFTLOG_S3_ENDPOINT").ok(),
            force_path_style: env_or("SHIFTLOG_S3_FORCE_PATH_STYLE", "false") == "true",
        };

        let smtp = match (
            std::env::var("SHIFTLOG_SMTP_HOST").ok(),
            std::env::var("SHIFTLOG_SMTP_PORT").ok(),
            std::env::var("SHIFTLOG_SMTP_USER").ok(),
            std::env::var("SHIFTLOG_SMTP_PASS").ok(),
            std::env::var("SHIFTLOG_SMTP_FROM").ok(),
            std::env::var("SHIFTLOG_NOTIFY_TO").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from), Some(notify_to)) => {
                Some(SmtpConfig {
                    host,
                    port: port
                        .parse()
                        .map_err(|e| format!("Invalid SHIFTLOG_SMTP_PORT: {e}"))?,
                    user,
                    pass,
                    from,
                    notify_to,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            admin_token,
            host,
            port,
            base_url,
            max_body_size,
            log_level,
            s3,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
