/// Application name
pub const APP_NAME: &str = "Chatas";

/// Path prefix every API route is mounted under
pub const API_BASE_PATH: &str = "/api";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 5500;

/// Profile image assigned when a user registers without one
pub const DEFAULT_PROFILE_IMAGE: &str = "default-profile.png";

/// Storage key under which the client keeps the logged-in user snapshot
pub const SESSION_STORAGE_KEY: &str = "savedUserInfo";

/// Username length bounds (characters, inclusive)
pub const USERNAME_MIN_LEN: usize = 5;
pub const USERNAME_MAX_LEN: usize = 20;

/// Password length bounds (characters, inclusive)
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 25;

/// Special characters accepted (and one of which is required) in passwords
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Maximum message body length in characters
pub const MAX_MESSAGE_LEN: usize = 5000;
