use evidence_deck_domain::{ImageFormat, ImageRef, PhotoId, PhotoRecord};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result, Row};

pub fn insert_photo(conn: &Connection, photo: &PhotoRecord) -> Result<i64> {
    conn.execute(
        "INSERT INTO photos
         (order_number, uid_suffix, description, copy_of, has_copy, image_format, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            photo.order_number,
            photo.uid_suffix,
            photo.description,
            photo.copy_of.map(PhotoId::get),
            photo.has_copy.map(PhotoId::get),
            photo.image.format().as_str(),
            photo.image.bytes(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites the mutable columns. Returns the number of rows touched.
pub fn update_photo(conn: &Connection, id: i64, photo: &PhotoRecord) -> Result<usize> {
    conn.execute(
        "UPDATE photos SET
            order_number = ?1,
            uid_suffix = ?2,
            description = ?3,
            copy_of = ?4,
            has_copy = ?5
         WHERE id = ?6",
        params![
            photo.order_number,
            photo.uid_suffix,
            photo.description,
            photo.copy_of.map(PhotoId::get),
            photo.has_copy.map(PhotoId::get),
            id,
        ],
    )
}

pub fn delete_photo(conn: &Connection, id: i64) -> Result<()> {
    conn.execute("DELETE FROM photos WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn clear_photos(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM photos", [])?;
    Ok(())
}

pub fn list_photos(conn: &Connection) -> Result<Vec<PhotoRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, order_number, uid_suffix, description, copy_of, has_copy, image_format, image
         FROM photos",
    )?;
    let rows = stmt.query_map([], photo_from_row)?;
    rows.collect()
}

fn photo_from_row(row: &Row<'_>) -> Result<PhotoRecord> {
    let format: String = row.get(6)?;
    let bytes: Vec<u8> = row.get(7)?;
    Ok(PhotoRecord {
        id: Some(photo_id(row, 0)?),
        order_number: row.get(1)?,
        uid_suffix: row.get(2)?,
        description: row.get(3)?,
        copy_of: optional_photo_id(row, 4)?,
        has_copy: optional_photo_id(row, 5)?,
        image: ImageRef::new(bytes, ImageFormat::parse(&format)),
    })
}

fn photo_id(row: &Row<'_>, index: usize) -> Result<PhotoId> {
    let value: i64 = row.get(index)?;
    PhotoId::new(value).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

fn optional_photo_id(row: &Row<'_>, index: usize) -> Result<Option<PhotoId>> {
    let value: Option<i64> = row.get(index)?;
    value
        .map(|value| {
            PhotoId::new(value).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
            })
        })
        .transpose()
}
