use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{hhmm, Booking, BookingStatus, Master, Service};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Services ──

pub fn list_services(conn: &Connection, active_only: bool) -> anyhow::Result<Vec<Service>> {
    let sql = if active_only {
        "SELECT id, name, description, price, duration_minutes, is_active, is_popular
         FROM services WHERE is_active = 1 ORDER BY is_popular DESC, name ASC"
    } else {
        "SELECT id, name, description, price, duration_minutes, is_active, is_popular
         FROM services ORDER BY is_popular DESC, name ASC"
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(Service {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            duration_minutes: row.get(4)?,
            is_active: row.get(5)?,
            is_popular: row.get(6)?,
        })
    })?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

/// Replaces the catalog in one transaction.
pub fn replace_services(conn: &Connection, services: &[Service]) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM services", [])?;
    for s in services {
        tx.execute(
            "INSERT INTO services (id, name, description, price, duration_minutes, is_active, is_popular)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                s.id,
                s.name,
                s.description,
                s.price,
                s.duration_minutes,
                s.is_active,
                s.is_popular,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

// ── Masters ──

pub fn get_master(conn: &Connection) -> anyhow::Result<Option<Master>> {
    let result = conn.query_row(
        "SELECT name, description FROM masters ORDER BY id ASC LIMIT 1",
        [],
        |row| {
            Ok(Master {
                name: row.get(0)?,
                description: row.get(1)?,
            })
        },
    );

    match result {
        Ok(master) => Ok(Some(master)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let created_at = booking.created_at.format(TIMESTAMP_FORMAT).to_string();

    conn.execute(
        "INSERT INTO bookings (id, service_id, booking_date, start_time, end_time, price, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            booking.id,
            booking.service_id,
            booking.date.format(DATE_FORMAT).to_string(),
            hhmm::format(&booking.start_time),
            hhmm::format(&booking.end_time),
            booking.price,
            booking.status.as_str(),
            created_at,
        ],
    )?;
    Ok(())
}

/// Non-cancelled bookings on `date`, earliest first.
pub fn get_bookings_on_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, service_id, booking_date, start_time, end_time, price, status, created_at
         FROM bookings WHERE booking_date = ?1 AND status != 'cancelled' ORDER BY start_time ASC",
    )?;

    let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, service_id, booking_date, start_time, end_time, price, status, created_at
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_recent_bookings(conn: &Connection, limit: i64) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, service_id, booking_date, start_time, end_time, price, status, created_at
         FROM bookings ORDER BY created_at DESC, id DESC LIMIT ?1",
    )?;

    let rows = stmt.query_map(params![limit], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let service_id: String = row.get(1)?;
    let date_str: String = row.get(2)?;
    let start_str: String = row.get(3)?;
    let end_str: String = row.get(4)?;
    let price: i64 = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("bad booking_date {date_str:?} on {id}: {e}"))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Booking {
        start_time: hhmm::parse(&start_str)?,
        end_time: hhmm::parse(&end_str)?,
        id,
        service_id,
        date,
        price,
        status: BookingStatus::parse(&status_str),
        created_at,
    })
}

// ── Usage Counters ──

pub fn increment_counter(conn: &Connection, name: &str) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO usage_counters (name, value) VALUES (?1, 1)
         ON CONFLICT(name) DO UPDATE SET value = value + 1",
        params![name],
    )?;
    get_counter(conn, name)
}

pub fn get_counter(conn: &Connection, name: &str) -> anyhow::Result<i64> {
    let value: i64 = conn
        .query_row(
            "SELECT value FROM usage_counters WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(0),
            e => Err(e),
        })?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::NaiveTime;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn booking(id: &str, day: u32, start: (u32, u32), end: (u32, u32), created: &str) -> Booking {
        Booking {
            id: id.to_string(),
            service_id: "1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            price: 1500,
            status: BookingStatus::Confirmed,
            created_at: NaiveDateTime::parse_from_str(created, TIMESTAMP_FORMAT).unwrap(),
        }
    }

    #[test]
    fn test_seeded_catalog_order() {
        let conn = setup_db();
        let services = list_services(&conn, true).unwrap();
        assert!(!services.is_empty());
        assert!(services[0].is_popular);
        assert!(services.iter().all(|s| s.is_active));
    }

    #[test]
    fn test_replace_services_is_wholesale() {
        let conn = setup_db();
        let replacement = vec![
            Service {
                id: "a".to_string(),
                name: "Only one".to_string(),
                description: None,
                price: 100,
                duration_minutes: 45,
                is_active: true,
                is_popular: false,
            },
            Service {
                id: "b".to_string(),
                name: "Hidden".to_string(),
                description: Some("inactive".to_string()),
                price: 100,
                duration_minutes: 45,
                is_active: false,
                is_popular: false,
            },
        ];
        replace_services(&conn, &replacement).unwrap();

        assert_eq!(list_services(&conn, false).unwrap(), {
            let mut all = replacement.clone();
            all.sort_by(|a, b| a.name.cmp(&b.name));
            all
        });
        let active = list_services(&conn, true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "a");
    }

    #[test]
    fn test_seeded_master() {
        let conn = setup_db();
        let master = get_master(&conn).unwrap().unwrap();
        assert_eq!(master.name, "Anna Smirnova");
        assert_eq!(master.description.as_deref(), Some("Manicure master"));

        conn.execute("DELETE FROM masters", []).unwrap();
        assert!(get_master(&conn).unwrap().is_none());
    }

    #[test]
    fn test_booking_round_trip_and_day_filter() {
        let conn = setup_db();
        create_booking(&conn, &booking("b1", 3, (10, 0), (11, 0), "2024-09-02 09:00:00")).unwrap();
        create_booking(&conn, &booking("b2", 3, (14, 0), (15, 30), "2024-09-02 09:05:00")).unwrap();
        create_booking(&conn, &booking("b3", 4, (10, 0), (11, 0), "2024-09-02 09:10:00")).unwrap();

        let loaded = get_booking_by_id(&conn, "b2").unwrap().unwrap();
        assert_eq!(loaded, booking("b2", 3, (14, 0), (15, 30), "2024-09-02 09:05:00"));
        assert!(get_booking_by_id(&conn, "missing").unwrap().is_none());

        let day = get_bookings_on_date(&conn, NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()).unwrap();
        let ids: Vec<&str> = day.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn test_cancelled_bookings_leave_the_day() {
        let conn = setup_db();
        create_booking(&conn, &booking("b1", 3, (10, 0), (11, 0), "2024-09-02 09:00:00")).unwrap();
        assert!(update_booking_status(&conn, "b1", &BookingStatus::Cancelled).unwrap());
        assert!(!update_booking_status(&conn, "nope", &BookingStatus::Cancelled).unwrap());

        let day = get_bookings_on_date(&conn, NaiveDate::from_ymd_opt(2024, 9, 3).unwrap()).unwrap();
        assert!(day.is_empty());
        let recent = get_recent_bookings(&conn, 10).unwrap();
        assert_eq!(recent[0].status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_recent_bookings_newest_first_with_limit() {
        let conn = setup_db();
        for (i, created) in ["2024-09-02 09:00:00", "2024-09-02 10:00:00", "2024-09-02 11:00:00"]
            .iter()
            .enumerate()
        {
            create_booking(&conn, &booking(&format!("b{i}"), 3, (10, 0), (11, 0), created)).unwrap();
        }
        let recent = get_recent_bookings(&conn, 2).unwrap();
        let ids: Vec<&str> = recent.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b2", "b1"]);
    }

    #[test]
    fn test_counters() {
        let conn = setup_db();
        assert_eq!(get_counter(&conn, "views").unwrap(), 0);
        assert_eq!(increment_counter(&conn, "views").unwrap(), 1);
        assert_eq!(increment_counter(&conn, "views").unwrap(), 2);
        assert_eq!(increment_counter(&conn, "completions").unwrap(), 1);
        assert_eq!(get_counter(&conn, "views").unwrap(), 2);
    }
}
