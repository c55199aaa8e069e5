pub const SCHEMA: &str = r#"
-- Contractor profiles: owners of gallery images
CREATE TABLE IF NOT EXISTS digital_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contractor_uuid TEXT NOT NULL UNIQUE,
    profile_name TEXT NOT NULL,
    profile_picture TEXT,
    total_photo_uploaded INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Gallery images, owned by a profile through its external uuid
CREATE TABLE IF NOT EXISTS project_media_galleries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    media_url TEXT NOT NULL,
    created_by_user_id TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (created_by_user_id) REFERENCES digital_profiles(contractor_uuid)
);

CREATE INDEX IF NOT EXISTS idx_galleries_owner ON project_media_galleries(created_by_user_id);
CREATE INDEX IF NOT EXISTS idx_galleries_created_at ON project_media_galleries(created_at);

-- Tags
CREATE TABLE IF NOT EXISTS project_gallery_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT NOT NULL,
    tag_display_name TEXT NOT NULL,
    type TEXT NOT NULL DEFAULT ''
);

-- Gallery to tag links. No uniqueness constraint: imported data may repeat a
-- link, and readers de-duplicate.
CREATE TABLE IF NOT EXISTS project_media_galleries_tag_id_links (
    project_media_gallery_id INTEGER NOT NULL,
    project_gallery_tag_id INTEGER NOT NULL,
    FOREIGN KEY (project_media_gallery_id) REFERENCES project_media_galleries(id) ON DELETE CASCADE,
    FOREIGN KEY (project_gallery_tag_id) REFERENCES project_gallery_tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tag_links_gallery ON project_media_galleries_tag_id_links(project_media_gallery_id);
CREATE INDEX IF NOT EXISTS idx_tag_links_tag ON project_media_galleries_tag_id_links(project_gallery_tag_id);
"#;
