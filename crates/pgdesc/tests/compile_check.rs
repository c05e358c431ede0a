//! Compile-only checks for the deadpool-postgres wiring. No database is contacted.

#![allow(dead_code)]

use pgdesc::{ConnectionSource, Db, DbResult, InsertQuery, SelectQuery};

fn assert_source<S: ConnectionSource>() {}

fn assert_send<T: Send>(_: &T) {}

#[cfg(feature = "pool")]
#[test]
fn pool_is_a_connection_source() {
    assert_source::<deadpool_postgres::Pool>();
    assert_source::<std::sync::Arc<deadpool_postgres::Pool>>();
}

#[cfg(feature = "pool")]
async fn _select_rows_compiles(db: &Db<deadpool_postgres::Pool>) -> DbResult<()> {
    let rows = db
        .select(&SelectQuery::from("users").columns(["id", "username"]))
        .await?
        .unwrap_or_default();
    for row in rows {
        let _id: i64 = row.get("id");
        let _username: String = row.get("username");
    }
    Ok(())
}

#[cfg(feature = "pool")]
async fn _insert_compiles(pool: &deadpool_postgres::Pool) -> DbResult<()> {
    let q = InsertQuery::new("users")
        .value("username", "alice")
        .value("email", Some("alice@example.com"));
    pgdesc::db::insert(pool, &q).await?;
    Ok(())
}

#[cfg(feature = "pool")]
#[test]
fn db_futures_are_send() {
    let Ok(pool) = pgdesc::create_pool("postgres://u:p@localhost/db") else {
        panic!("pool config should build");
    };
    let db = Db::new(pool);
    let q = SelectQuery::from("t");
    let fut = db.select(&q);
    assert_send(&fut);
}
