/// Default audience for the GCP identity token (the global AWS STS endpoint)
pub const DEFAULT_AUDIENCE: &str = "https://sts.amazonaws.com";

/// Default STS session duration in seconds
pub const DEFAULT_SESSION_DURATION_SECONDS: i32 = 3600;

/// Prefix for generated role session names
pub const SESSION_NAME_PREFIX: &str = "gcp";

/// Version field of the credential_process document
pub const PROCESS_CREDENTIALS_VERSION: u8 = 1;

/// Expiration layout expected by credential_process consumers (no colon in the offset)
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Environment variable naming an application default credentials file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variable overriding the metadata server host (`host[:port]`, no scheme)
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";
