use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct Config {
    database_url: String,
    redis_url: String,
    api_host: Option<String>,
    api_port: Option<usize>,
    #[validate(length(min = 32))]
    session_private_key: String,
    /// comma separated list of email addresses with the admin capability
    admin_emails: String,
    /// the NFL season the pools run against
    #[serde(default = "default_season")]
    season: i32,
    /// upstream schedule feed, queried by the admin schedule sync
    schedule_feed_url: Option<String>,
    schedule_feed_key: Option<String>,
    /// defaults to localhost, which shouldn't cause issues if you're using udp
    opentelemetry_endpoint: Option<String>,
}

fn default_season() -> i32 {
    2025
}

lazy_static! {
    static ref CONFIG: Config = match envy::from_env::<Config>() {
        Ok(config) => {
            match config.validate() {
                Ok(()) => config,
                Err(e) => panic!("invalid environment variable: {}", e),
            }
        }
        Err(error) => panic!("Missing or incorrect environment variable: {}", error),
    };
}

impl Config {
    pub fn database_url() -> &'static str {
        CONFIG.database_url.as_ref()
    }

    pub fn redis_url() -> &'static str {
        CONFIG.redis_url.as_ref()
    }

    pub fn api_host() -> &'static str {
        match &CONFIG.api_host {
            Some(host) => host.as_ref(),
            None => "localhost",
        }
    }

    pub fn api_port() -> usize {
        CONFIG.api_port.unwrap_or(8080)
    }

    pub fn session_private_key() -> &'static str {
        CONFIG.session_private_key.as_ref()
    }

    /// admin is a deploy-time role claim, not a compiled-in account
    pub fn is_admin(email: &str) -> bool {
        CONFIG
            .admin_emails
            .split(',')
            .any(|admin| admin.trim().eq_ignore_ascii_case(email))
    }

    pub fn season() -> i32 {
        CONFIG.season
    }

    pub fn schedule_feed_url() -> Option<&'static str> {
        CONFIG.schedule_feed_url.as_ref().map(|url| url.as_ref())
    }

    pub fn schedule_feed_key() -> Option<&'static str> {
        CONFIG.schedule_feed_key.as_ref().map(|key| key.as_ref())
    }

    pub fn opentelemetry_endpoint() -> &'static str {
        match &CONFIG.opentelemetry_endpoint {
            Some(endpoint) => endpoint.as_ref(),
            None => "127.0.0.1:6831",
        }
    }
}
