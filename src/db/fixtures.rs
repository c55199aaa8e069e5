//! In-memory databases with known content, shared by tests across the crate.
//!
//! `seeded()` layout:
//!
//! | gallery | owner        | created    | tags                       |
//! |---------|--------------|------------|----------------------------|
//! | 1       | Linen Studio | 2024-01-01 | Modern, Coastal            |
//! | 2       | Oak & Iron   | 2024-01-02 | Modern (linked twice)      |
//! | 3       | Linen Studio | 2024-01-03 | none                       |
//! | 4       | Oak & Iron   | 2024-01-04 | Modern, Scandinavian       |
//! | 5       | Linen Studio | 2024-01-05 | Coastal                    |
//! | 6       | Oak & Iron   | 2024-01-06 | Scandinavian               |
//!
//! Tag 4 ("Rustic") is never linked. Profile 3 ("Empty Nest Design") has no
//! uploads.

use chrono::{Duration, NaiveDate};

use super::Database;

pub const LINEN_UUID: &str = "c0ffee00-0000-4000-8000-000000000001";
pub const OAK_UUID: &str = "c0ffee00-0000-4000-8000-000000000002";
pub const EMPTY_UUID: &str = "c0ffee00-0000-4000-8000-000000000003";
pub const BULK_UUID: &str = "c0ffee00-0000-4000-8000-0000000000aa";

const SEED: &str = r#"
INSERT INTO digital_profiles (id, contractor_uuid, profile_name, profile_picture, total_photo_uploaded, created_at, updated_at) VALUES
    (1, 'c0ffee00-0000-4000-8000-000000000001', 'Linen Studio', 'https://cdn.example.com/profiles/linen.png', 3, '2023-06-01 09:00:00', '2024-01-05 12:00:00'),
    (2, 'c0ffee00-0000-4000-8000-000000000002', 'Oak & Iron Interiors', NULL, 3, '2023-07-15 09:00:00', '2024-01-06 12:00:00'),
    (3, 'c0ffee00-0000-4000-8000-000000000003', 'Empty Nest Design', NULL, 0, '2023-08-01 09:00:00', '2023-08-01 09:00:00');

INSERT INTO project_media_galleries (id, media_url, created_by_user_id, created_at, updated_at) VALUES
    (1, 'https://cdn.example.com/galleries/1.jpg', 'c0ffee00-0000-4000-8000-000000000001', '2024-01-01 10:00:00', '2024-01-01 10:00:00'),
    (2, 'https://cdn.example.com/galleries/2.jpg', 'c0ffee00-0000-4000-8000-000000000002', '2024-01-02 10:00:00', '2024-01-02 10:00:00'),
    (3, 'https://cdn.example.com/galleries/3.jpg', 'c0ffee00-0000-4000-8000-000000000001', '2024-01-03 10:00:00', '2024-01-03 10:00:00'),
    (4, 'https://cdn.example.com/galleries/4.jpg', 'c0ffee00-0000-4000-8000-000000000002', '2024-01-04 10:00:00', '2024-01-04 10:00:00'),
    (5, 'https://cdn.example.com/galleries/5.jpg', 'c0ffee00-0000-4000-8000-000000000001', '2024-01-05 10:00:00', '2024-01-05 10:00:00'),
    (6, 'https://cdn.example.com/galleries/6.jpg', 'c0ffee00-0000-4000-8000-000000000002', '2024-01-06 10:00:00', '2024-01-06 10:00:00');

INSERT INTO project_gallery_tags (id, tag, tag_display_name, type) VALUES
    (1, 'modern', 'Modern', 'style'),
    (2, 'coastal', 'Coastal', 'style'),
    (3, 'scandinavian', 'Scandinavian', 'style'),
    (4, 'rustic', 'Rustic', 'style');

INSERT INTO project_media_galleries_tag_id_links (project_media_gallery_id, project_gallery_tag_id) VALUES
    (1, 1), (1, 2),
    (2, 1), (2, 1),
    (4, 1), (4, 3),
    (5, 2),
    (6, 3);
"#;

fn empty() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    db
}

pub fn seeded() -> Database {
    let db = empty();
    db.execute_batch(SEED).unwrap();
    db
}

/// One profile owning `count` images (ids `1..=count`, newer ids created
/// later), every one of them tagged "Modern".
pub fn seeded_bulk(count: usize) -> Database {
    let db = empty();
    let mut sql = format!(
        "INSERT INTO digital_profiles (id, contractor_uuid, profile_name, total_photo_uploaded)
         VALUES (1, '{BULK_UUID}', 'Bulk Builders', {count});
         INSERT INTO project_gallery_tags (id, tag, tag_display_name, type)
         VALUES (1, 'modern', 'Modern', 'style');\n"
    );
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    for i in 1..=count {
        let created = (start + Duration::minutes(i as i64)).format("%Y-%m-%d %H:%M:%S");
        sql.push_str(&format!(
            "INSERT INTO project_media_galleries (id, media_url, created_by_user_id, created_at, updated_at)
             VALUES ({i}, 'https://cdn.example.com/bulk/{i}.jpg', '{BULK_UUID}', '{created}', '{created}');
             INSERT INTO project_media_galleries_tag_id_links VALUES ({i}, 1);\n"
        ));
    }
    db.execute_batch(&sql).unwrap();
    db
}
