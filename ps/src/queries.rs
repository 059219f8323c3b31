//! SQL statements for the short-term store
//!
//! Reference-table statements insert only when the natural key is new, so a
//! batch can be replayed without duplicating rows. Child rows resolve their
//! parent ids through the parent's natural key and are skipped when the parent
//! is missing.

use tracing::debug;

use crate::StoreError;

pub(crate) const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS continent (
        continent_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        continent_name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS country (
        country_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        country_name    TEXT NOT NULL UNIQUE,
        country_capital TEXT NOT NULL,
        continent_id    INTEGER NOT NULL REFERENCES continent (continent_id)
    );

    CREATE TABLE IF NOT EXISTS city (
        city_id        INTEGER PRIMARY KEY AUTOINCREMENT,
        city_name      TEXT NOT NULL UNIQUE,
        city_latitude  REAL NOT NULL,
        city_longitude REAL NOT NULL,
        country_id     INTEGER NOT NULL REFERENCES country (country_id)
    );

    CREATE TABLE IF NOT EXISTS botanist (
        botanist_id    INTEGER PRIMARY KEY AUTOINCREMENT,
        botanist_name  TEXT NOT NULL,
        botanist_email TEXT NOT NULL,
        botanist_phone TEXT NOT NULL,
        UNIQUE (botanist_name, botanist_email, botanist_phone)
    );

    CREATE TABLE IF NOT EXISTS plant_type (
        plant_type_id              INTEGER PRIMARY KEY AUTOINCREMENT,
        plant_type_name            TEXT NOT NULL UNIQUE,
        plant_type_scientific_name TEXT,
        plant_type_image_url       TEXT
    );

    CREATE TABLE IF NOT EXISTS plant (
        plant_id           INTEGER PRIMARY KEY AUTOINCREMENT,
        plant_number       INTEGER NOT NULL UNIQUE,
        plant_type_id      INTEGER NOT NULL REFERENCES plant_type (plant_type_id),
        botanist_id        INTEGER NOT NULL REFERENCES botanist (botanist_id),
        city_id            INTEGER NOT NULL REFERENCES city (city_id),
        plant_last_watered TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS record (
        record_id            INTEGER PRIMARY KEY AUTOINCREMENT,
        plant_id             INTEGER NOT NULL REFERENCES plant (plant_id),
        record_soil_moisture REAL NOT NULL,
        record_temperature   REAL NOT NULL,
        record_timestamp     TEXT NOT NULL,
        UNIQUE (plant_id, record_timestamp)
    );

    CREATE INDEX IF NOT EXISTS idx_record_timestamp ON record (record_timestamp);
";

pub(crate) const CONTINENT_UPSERT: &str = "
    INSERT INTO continent (continent_name)
    VALUES (?1)
    ON CONFLICT (continent_name) DO NOTHING
";

pub(crate) const COUNTRY_UPSERT: &str = "
    INSERT INTO country (country_name, country_capital, continent_id)
    SELECT ?1, ?2, continent_id FROM continent WHERE continent_name = ?3
    ON CONFLICT (country_name) DO NOTHING
";

pub(crate) const CITY_UPSERT: &str = "
    INSERT INTO city (city_name, city_latitude, city_longitude, country_id)
    SELECT ?1, ?2, ?3, country_id FROM country WHERE country_name = ?4
    ON CONFLICT (city_name) DO NOTHING
";

pub(crate) const BOTANIST_UPSERT: &str = "
    INSERT INTO botanist (botanist_name, botanist_email, botanist_phone)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (botanist_name, botanist_email, botanist_phone) DO NOTHING
";

pub(crate) const PLANT_TYPE_UPSERT: &str = "
    INSERT INTO plant_type (plant_type_name, plant_type_scientific_name, plant_type_image_url)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (plant_type_name) DO NOTHING
";

pub(crate) const PLANT_UPSERT: &str = "
    INSERT INTO plant (plant_number, plant_type_id, botanist_id, city_id, plant_last_watered)
    VALUES (
        ?1,
        (SELECT plant_type_id FROM plant_type WHERE plant_type_name = ?2),
        (SELECT botanist_id FROM botanist
            WHERE botanist_name = ?3 AND botanist_email = ?4 AND botanist_phone = ?5),
        (SELECT city_id FROM city WHERE city_name = ?6),
        ?7
    )
    ON CONFLICT (plant_number) DO UPDATE SET plant_last_watered = excluded.plant_last_watered
";

pub(crate) const RECORDING_INSERT: &str = "
    INSERT INTO record (plant_id, record_soil_moisture, record_temperature, record_timestamp)
    SELECT plant_id, ?1, ?2, ?3 FROM plant WHERE plant_number = ?4
    ON CONFLICT (plant_id, record_timestamp) DO NOTHING
";

pub(crate) const EXPIRED_QUERY: &str = "
    SELECT
        r.record_id,
        p.plant_number,
        p.plant_last_watered,
        r.record_soil_moisture,
        r.record_temperature,
        r.record_timestamp,
        pt.plant_type_name,
        pt.plant_type_scientific_name,
        pt.plant_type_image_url,
        b.botanist_name,
        b.botanist_email,
        b.botanist_phone,
        cit.city_name,
        cit.city_latitude,
        cit.city_longitude,
        cou.country_name,
        cou.country_capital,
        con.continent_name
    FROM record AS r
    JOIN plant AS p ON p.plant_id = r.plant_id
    JOIN plant_type AS pt ON pt.plant_type_id = p.plant_type_id
    JOIN botanist AS b ON b.botanist_id = p.botanist_id
    JOIN city AS cit ON cit.city_id = p.city_id
    JOIN country AS cou ON cou.country_id = cit.country_id
    JOIN continent AS con ON con.continent_id = cou.continent_id
    WHERE r.record_timestamp < ?1
    ORDER BY r.record_id
";

pub(crate) const READINGS_QUERY: &str = "
    SELECT
        p.plant_number,
        pt.plant_type_name,
        r.record_soil_moisture,
        r.record_temperature,
        r.record_timestamp,
        p.plant_last_watered,
        b.botanist_name,
        con.continent_name
    FROM record AS r
    JOIN plant AS p ON p.plant_id = r.plant_id
    JOIN plant_type AS pt ON pt.plant_type_id = p.plant_type_id
    JOIN botanist AS b ON b.botanist_id = p.botanist_id
    JOIN city AS cit ON cit.city_id = p.city_id
    JOIN country AS cou ON cou.country_id = cit.country_id
    JOIN continent AS con ON con.continent_id = cou.continent_id
    ORDER BY p.plant_number, r.record_timestamp
";

const BASE_DELETE_QUERY: &str = "DELETE FROM record WHERE record_id IN ({placeholders})";

/// Build the archival delete statement with one `?` placeholder per id
pub fn delete_query(count: usize) -> Result<String, StoreError> {
    debug!(count, "delete_query: called");
    if count == 0 {
        return Err(StoreError::NoIds);
    }
    let placeholders = vec!["?"; count].join(",");
    Ok(BASE_DELETE_QUERY.replace("{placeholders}", &placeholders))
}
