pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS photos (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        order_number  INTEGER NOT NULL,
        uid_suffix    TEXT NOT NULL,
        description   TEXT NOT NULL DEFAULT '',
        copy_of       INTEGER,
        has_copy      INTEGER,
        image_format  TEXT NOT NULL,
        image         BLOB NOT NULL
    );",
    "CREATE INDEX IF NOT EXISTS idx_photos_order_number ON photos(order_number);",
];
