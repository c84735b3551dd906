// SQL fragments and the read snapshot shared by the Postgres search
// implementations

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::domain::dates::Period;
use crate::domain::search::{Comparator, DateParam};

pub(crate) const SNAPSHOT_ISOLATION: &str =
    "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// Opens a read-only transaction in which every statement sees one snapshot
///
/// Search runs its `COUNT(*)` and page query inside it so `total` always
/// agrees with the entries.
pub(crate) async fn begin_snapshot(
    pool: &PgPool,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query(SNAPSHOT_ISOLATION).execute(&mut *tx).await?;
    Ok(tx)
}

/// Appends `AND <column> <comparator> <period>` to a search query
///
/// `column` must evaluate to a `timestamptz`.
pub(crate) fn push_date_filter(qb: &mut QueryBuilder<'_, Postgres>, column: &str, param: &DateParam) {
    let Period { start, end } = param.period;
    qb.push(" AND ");
    match param.comparator {
        Comparator::Eq => {
            qb.push("(")
                .push(column)
                .push(" >= ")
                .push_bind(start)
                .push(" AND ")
                .push(column)
                .push(" < ")
                .push_bind(end)
                .push(")");
        }
        Comparator::Ne => {
            qb.push("(")
                .push(column)
                .push(" < ")
                .push_bind(start)
                .push(" OR ")
                .push(column)
                .push(" >= ")
                .push_bind(end)
                .push(")");
        }
        Comparator::Lt => {
            qb.push(column).push(" < ").push_bind(start);
        }
        Comparator::Le => {
            qb.push(column).push(" < ").push_bind(end);
        }
        Comparator::Gt => {
            qb.push(column).push(" >= ").push_bind(end);
        }
        Comparator::Ge => {
            qb.push(column).push(" >= ").push_bind(start);
        }
    }
}

/// Appends ordering and the LIMIT/OFFSET window
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, count: u32, offset: u32) {
    qb.push(" ORDER BY created_at, id LIMIT ")
        .push_bind(i64::from(count))
        .push(" OFFSET ")
        .push_bind(i64::from(offset));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(raw: &str) -> String {
        let param = DateParam::parse("date", raw).unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE TRUE");
        push_date_filter(&mut qb, "effective_at", &param);
        qb.sql().to_string()
    }

    #[test]
    fn eq_is_a_range() {
        assert_eq!(
            sql_for("2020-01-01"),
            "SELECT 1 FROM t WHERE TRUE AND (effective_at >= $1 AND effective_at < $2)"
        );
    }

    #[test]
    fn ne_is_outside_the_range() {
        assert_eq!(
            sql_for("ne2020"),
            "SELECT 1 FROM t WHERE TRUE AND (effective_at < $1 OR effective_at >= $2)"
        );
    }

    #[test]
    fn ordered_prefixes_use_one_bound() {
        assert!(sql_for("lt2020").ends_with("AND effective_at < $1"));
        assert!(sql_for("le2020").ends_with("AND effective_at < $1"));
        assert!(sql_for("gt2020").ends_with("AND effective_at >= $1"));
        assert!(sql_for("ge2020").ends_with("AND effective_at >= $1"));
    }

    #[test]
    fn page_window() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM t");
        push_page(&mut qb, 10, 20);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM t ORDER BY created_at, id LIMIT $1 OFFSET $2"
        );
    }
}
