pub const POSTGRES_SCHEMA: &str = r#"
-- PostgreSQL schema for Atelier

CREATE TABLE IF NOT EXISTS digital_profiles (
    id BIGSERIAL PRIMARY KEY,
    contractor_uuid TEXT NOT NULL UNIQUE,
    profile_name TEXT NOT NULL,
    profile_picture TEXT,
    total_photo_uploaded BIGINT NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT to_char(NOW(), 'YYYY-MM-DD HH24:MI:SS'),
    updated_at TEXT NOT NULL DEFAULT to_char(NOW(), 'YYYY-MM-DD HH24:MI:SS')
);

CREATE TABLE IF NOT EXISTS project_media_galleries (
    id BIGSERIAL PRIMARY KEY,
    media_url TEXT NOT NULL,
    created_by_user_id TEXT NOT NULL REFERENCES digital_profiles(contractor_uuid),
    created_at TEXT NOT NULL DEFAULT to_char(NOW(), 'YYYY-MM-DD HH24:MI:SS'),
    updated_at TEXT NOT NULL DEFAULT to_char(NOW(), 'YYYY-MM-DD HH24:MI:SS')
);

CREATE INDEX IF NOT EXISTS idx_galleries_owner ON project_media_galleries(created_by_user_id);
CREATE INDEX IF NOT EXISTS idx_galleries_created_at ON project_media_galleries(created_at);

CREATE TABLE IF NOT EXISTS project_gallery_tags (
    id BIGSERIAL PRIMARY KEY,
    tag TEXT NOT NULL,
    tag_display_name TEXT NOT NULL,
    type TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS project_media_galleries_tag_id_links (
    project_media_gallery_id BIGINT NOT NULL REFERENCES project_media_galleries(id) ON DELETE CASCADE,
    project_gallery_tag_id BIGINT NOT NULL REFERENCES project_gallery_tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tag_links_gallery ON project_media_galleries_tag_id_links(project_media_gallery_id);
CREATE INDEX IF NOT EXISTS idx_tag_links_tag ON project_media_galleries_tag_id_links(project_gallery_tag_id);
"#;
