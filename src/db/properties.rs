use crate::db::connection::Database;
use crate::db::store::{
    Column, Predicate, PropertyStore, QueryResult, StoreQuery, PROPERTIES_TABLE,
};
use crate::domain::{RawRecord, RawReference};
use crate::errors::StoreError;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, Row};
use serde_json::{Map, Number, Value};

impl PropertyStore for Database {
    fn execute(&self, query: &StoreQuery) -> Result<QueryResult, StoreError> {
        if query.table != PROPERTIES_TABLE {
            return Err(StoreError::Query(format!("unknown table {}", query.table)));
        }
        self.with_conn(|conn| run_query(conn, query))
    }
}

fn run_query(conn: &Connection, query: &StoreQuery) -> Result<QueryResult, StoreError> {
    let (where_sql, params) = compile_predicates(&query.predicates);
    let columns = query.projection.columns();
    let select_list = columns
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {select_list} FROM {PROPERTIES_TABLE}{where_sql}");
    if let Some(column) = query.order_desc {
        sql.push_str(&format!(" ORDER BY {} DESC", column.name()));
    }
    if let Some(range) = query.range {
        // SQLite reads anything above i64::MAX as a REAL and rejects it.
        let limit = i64::try_from(range.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(range.offset).unwrap_or(i64::MAX);
        sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
    }

    tracing::debug!(%sql, params = params.len(), "store query");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok(row_to_json(row, &columns))
    })?;

    let mut data = Vec::new();
    for row in rows {
        let record: RawRecord =
            serde_json::from_value(row?).map_err(|e| StoreError::Decode(e.to_string()))?;
        data.push(record);
    }

    let count = if query.count {
        let count_sql = format!("SELECT COUNT(*) FROM {PROPERTIES_TABLE}{where_sql}");
        let n: i64 = conn.query_row(&count_sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Some(u64::try_from(n).unwrap_or(0))
    } else {
        None
    };

    Ok(QueryResult { data, count })
}

/// Turns predicates into a `WHERE` clause plus positional parameters.
fn compile_predicates(predicates: &[Predicate]) -> (String, Vec<SqlValue>) {
    let mut clauses = Vec::with_capacity(predicates.len());
    let mut params = Vec::with_capacity(predicates.len());

    for predicate in predicates {
        let clause = match predicate {
            Predicate::Eq(col, v) => {
                params.push(SqlValue::Integer(*v));
                format!("{} = ?", col.name())
            }
            Predicate::Gte(col, v) => {
                params.push(SqlValue::Real(*v));
                format!("{} >= ?", col.name())
            }
            Predicate::Lte(col, v) => {
                params.push(SqlValue::Real(*v));
                format!("{} <= ?", col.name())
            }
            Predicate::Contains(col, needle) => {
                params.push(SqlValue::Text(format!("%{}%", escape_like(needle))));
                // LIKE is ASCII case-insensitive in SQLite; lower() both sides for the rest.
                format!("lower({}) LIKE lower(?) ESCAPE '\\'", col.name())
            }
            Predicate::TextGte(col, v) => {
                params.push(SqlValue::Text(v.clone()));
                format!("{} >= ?", col.name())
            }
            Predicate::TextLt(col, v) => {
                params.push(SqlValue::Text(v.clone()));
                format!("{} < ?", col.name())
            }
        };
        clauses.push(clause);
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn row_to_json(row: &Row<'_>, columns: &[Column]) -> Value {
    let mut map = Map::new();
    for (idx, column) in columns.iter().enumerate() {
        let value = match row.get_ref(idx) {
            Ok(v) => sql_to_json(*column, v),
            Err(_) => Value::Null,
        };
        map.insert(column.name().to_string(), value);
    }
    Value::Object(map)
}

fn sql_to_json(column: Column, value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) if column == Column::IsLaunch => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes).into_owned();
            if column.is_reference() {
                // Properly stored references come back as objects, legacy ones as strings.
                match serde_json::from_str::<Value>(&text) {
                    Ok(obj @ Value::Object(_)) => obj,
                    _ => Value::String(text),
                }
            } else {
                Value::String(text)
            }
        }
    }
}

fn reference_to_sql(reference: &Option<RawReference>) -> Option<String> {
    match reference.as_ref()? {
        RawReference::Object(map) => serde_json::to_string(map).ok(),
        RawReference::Text(text) => Some(text.clone()),
        RawReference::Other(Value::Null) => None,
        RawReference::Other(other) => Some(other.to_string()),
    }
}

/// Inserts or replaces raw records in one transaction. Returns rows written.
pub fn save_properties(db: &Database, records: &[RawRecord]) -> Result<usize, StoreError> {
    db.with_conn(|conn| {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO properties (
                    id, unit_id, unit_number, unit_area,
                    number_of_bedrooms, number_of_bathrooms,
                    price_per_meter, price_in_egp, currency, finishing,
                    is_launch, image, ready_by,
                    developer, compound, area, property_type,
                    payment_plans, down_payment_value, down_payment_percent,
                    monthly_installment, payment_years
                ) VALUES (
                    ?1, ?2, ?3, ?4,
                    ?5, ?6,
                    ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13,
                    ?14, ?15, ?16, ?17,
                    ?18, ?19, ?20,
                    ?21, ?22
                )
                "#,
            )?;

            for r in records {
                let payment_plans = match &r.payment_plans {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                };

                stmt.execute(rusqlite::params![
                    r.id,
                    r.unit_id,
                    r.unit_number,
                    r.unit_area,
                    r.number_of_bedrooms,
                    r.number_of_bathrooms,
                    r.price_per_meter,
                    r.price_in_egp,
                    r.currency,
                    r.finishing,
                    r.is_launch.unwrap_or(false),
                    r.image,
                    r.ready_by,
                    reference_to_sql(&r.developer),
                    reference_to_sql(&r.compound),
                    reference_to_sql(&r.area),
                    reference_to_sql(&r.property_type),
                    payment_plans,
                    r.down_payment_value,
                    r.down_payment_percent,
                    r.monthly_installment,
                    r.payment_years,
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!(rows = records.len(), "properties saved");
        Ok(records.len())
    })
}

/// Loads a JSON array of raw records from disk and saves it.
pub fn import_properties_file(db: &Database, path: &str) -> Result<usize, StoreError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| StoreError::Decode(format!("Failed to read {path}: {e}")))?;
    let records: Vec<RawRecord> =
        serde_json::from_str(&text).map_err(|e| StoreError::Decode(e.to_string()))?;
    save_properties(db, &records)
}
