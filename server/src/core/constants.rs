// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Micropost";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "micropost";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name (looked up in the working directory)
pub const CONFIG_FILE_NAME: &str = "micropost.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "MICROPOST_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "MICROPOST_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "MICROPOST_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "MICROPOST_LOG";

/// Environment variable for the deployment environment
pub const ENV_ENVIRONMENT: &str = "MICROPOST_ENV";

/// Environment variable for the allowed CORS origin
pub const ENV_CORS_ORIGIN: &str = "MICROPOST_CORS_ORIGIN";

/// Environment variable for the SQLite database path
pub const ENV_DATABASE: &str = "MICROPOST_DATABASE";

/// Environment variable for the JWT signing secret
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 3001;

/// Default frontend origin allowed by CORS
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "micropost.db";

/// Maximum request body size
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Maximum request body size for auth endpoints
pub const AUTH_BODY_LIMIT: usize = 64 * 1024;

// =============================================================================
// Authentication
// =============================================================================

/// Cookie carrying the access token
pub const TOKEN_COOKIE_NAME: &str = "jwt";

/// Access token lifetime
pub const TOKEN_TTL_HOURS: i64 = 24;

/// bcrypt work factor for stored password hashes
pub const PASSWORD_HASH_COST: u32 = 10;

/// Minimum accepted JWT secret length
pub const MIN_JWT_SECRET_LENGTH: usize = 16;

// =============================================================================
// Roles and Profiles
// =============================================================================

/// Role granted to every newly registered user
pub const ROLE_GENERAL: &str = "general";

/// Role required by admin-only routes
pub const ROLE_ADMIN: &str = "admin";

/// Read-only administrative role (does not open admin-only routes)
pub const ROLE_READ_ONLY_ADMIN: &str = "read_only_admin";

/// Avatar path reported for users without a profile picture
pub const DEFAULT_AVATAR_PATH: &str = "default_avatar.png";

/// Maximum stored avatar path length
pub const MAX_AVATAR_PATH_LENGTH: u64 = 255;

// =============================================================================
// SQLite
// =============================================================================

/// Maximum pooled connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// Busy timeout for locked database
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Listings
// =============================================================================

/// Number of entries in the admin ranking
pub const RANKING_LIMIT: i64 = 10;

/// Maximum micropost title length
pub const MAX_TITLE_LENGTH: u64 = 280;

/// Maximum comment length
pub const MAX_COMMENT_LENGTH: u64 = 1000;

/// Maximum category name length
pub const MAX_CATEGORY_NAME_LENGTH: u64 = 50;

/// Latest microposts shown per category in the category ranking
pub const RANKING_RECENT_POSTS: i64 = 3;

/// Client address recorded when the peer address is unavailable
pub const UNKNOWN_CLIENT_ADDRESS: &str = "unknown";
