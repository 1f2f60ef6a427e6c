//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1 AND length(name) <= 100),
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    password_hash TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 2. Roles (seeded below)
-- =============================================================================
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_roles (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, role_id)
);

CREATE INDEX IF NOT EXISTS idx_user_roles_role ON user_roles(role_id);

-- =============================================================================
-- 3. Profiles
-- =============================================================================
CREATE TABLE IF NOT EXISTS user_profiles (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    avatar_path TEXT
);

-- =============================================================================
-- 4. Follows
-- =============================================================================
CREATE TABLE IF NOT EXISTS follows (
    follower_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    following_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (follower_id, following_id)
);

CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id);

-- =============================================================================
-- 5. Microposts
-- =============================================================================
CREATE TABLE IF NOT EXISTS microposts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL CHECK(length(title) >= 1),
    image_path TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_microposts_user ON microposts(user_id);
CREATE INDEX IF NOT EXISTS idx_microposts_created ON microposts(created_at DESC);

-- =============================================================================
-- 6. Likes
-- =============================================================================
CREATE TABLE IF NOT EXISTS likes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    micropost_id INTEGER NOT NULL REFERENCES microposts(id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    UNIQUE (user_id, micropost_id)
);

CREATE INDEX IF NOT EXISTS idx_likes_micropost ON likes(micropost_id);

-- =============================================================================
-- 7. Comments
-- =============================================================================
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    micropost_id INTEGER NOT NULL REFERENCES microposts(id) ON DELETE CASCADE,
    content TEXT NOT NULL CHECK(length(content) >= 1),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_micropost ON comments(micropost_id);

-- =============================================================================
-- 8. Categories
-- =============================================================================
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE CHECK(length(name) >= 1),
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS micropost_categories (
    micropost_id INTEGER NOT NULL REFERENCES microposts(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    PRIMARY KEY (micropost_id, category_id)
);

CREATE INDEX IF NOT EXISTS idx_micropost_categories_category
    ON micropost_categories(category_id);

-- =============================================================================
-- 9. Views (one per micropost and client address)
-- =============================================================================
CREATE TABLE IF NOT EXISTS micropost_views (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    micropost_id INTEGER NOT NULL REFERENCES microposts(id) ON DELETE CASCADE,
    ip_address TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (micropost_id, ip_address)
);

-- =============================================================================
-- Seed data
-- =============================================================================
INSERT OR IGNORE INTO roles (name) VALUES ('general'), ('admin'), ('read_only_admin');
"#;
