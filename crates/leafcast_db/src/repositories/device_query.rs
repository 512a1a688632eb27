//! SQL statements for the `devices` table
//!
//! Every statement is assembled with [`QueryBuilder`], and every value is
//! bound through `push_bind`, so the placeholder syntax follows the selected
//! dialect and no value ever ends up in the SQL text.

use crate::client::Db;
use sqlx::QueryBuilder;

/// The table holding devices
pub const DEVICES_TABLE: &str = "devices";

/// Device columns, in the order the row mapper reads them
pub const DEVICE_COLUMNS: &str = "id, user_id, key, subscription, created_at";

fn select_devices<'args>() -> QueryBuilder<'args, Db> {
    QueryBuilder::new(format!("SELECT {} FROM {}", DEVICE_COLUMNS, DEVICES_TABLE))
}

/// `SELECT ... WHERE id = ?`
pub fn select_by_id<'args>(id: i64) -> QueryBuilder<'args, Db> {
    let mut query = select_devices();
    query.push(" WHERE id = ").push_bind(id);
    query
}

/// `SELECT ... WHERE user_id = ? AND key = ?`
pub fn select_by_user_and_key(user_id: i64, key: &str) -> QueryBuilder<'_, Db> {
    let mut query = select_devices();
    query
        .push(" WHERE user_id = ")
        .push_bind(user_id)
        .push(" AND key = ")
        .push_bind(key);
    query
}

/// `SELECT ... WHERE user_id = ?`
pub fn select_by_user<'args>(user_id: i64) -> QueryBuilder<'args, Db> {
    let mut query = select_devices();
    query.push(" WHERE user_id = ").push_bind(user_id);
    query
}

/// `SELECT COUNT(*) ... WHERE user_id = ?`
pub fn count_by_user<'args>(user_id: i64) -> QueryBuilder<'args, Db> {
    let mut query = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", DEVICES_TABLE));
    query.push(" WHERE user_id = ").push_bind(user_id);
    query
}

/// `INSERT ... RETURNING` the full row, so the assigned id and timestamp come
/// back with the write.
pub fn insert(user_id: i64, key: &str, subscription: String) -> QueryBuilder<'_, Db> {
    let mut query = QueryBuilder::new(format!(
        "INSERT INTO {} (user_id, key, subscription) VALUES (",
        DEVICES_TABLE
    ));
    let mut values = query.separated(", ");
    values.push_bind(user_id);
    values.push_bind(key);
    values.push_bind(subscription);
    query.push(format!(") RETURNING {}", DEVICE_COLUMNS));
    query
}

/// `DELETE ... WHERE id = ?`
pub fn delete_by_id<'args>(id: i64) -> QueryBuilder<'args, Db> {
    let mut query = QueryBuilder::new(format!("DELETE FROM {}", DEVICES_TABLE));
    query.push(" WHERE id = ").push_bind(id);
    query
}

/// `DELETE ... WHERE user_id = ? AND id IN (...)`
///
/// Returns `None` for an empty id set: `IN ()` is not valid SQL everywhere,
/// and such a delete can't match anything.
pub fn delete_by_user_and_ids<'args>(user_id: i64, ids: &[i64]) -> Option<QueryBuilder<'args, Db>> {
    if ids.is_empty() {
        return None;
    }

    let mut query = QueryBuilder::new(format!("DELETE FROM {}", DEVICES_TABLE));
    query.push(" WHERE user_id = ").push_bind(user_id);
    query.push(" AND id IN (");
    let mut list = query.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");
    Some(query)
}
