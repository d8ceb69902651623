/**
 * Author Resolution
 * Recipes may be authored by a RecipeWriter or by a Subscriber; payee
 * lookup tries each repository in that order
 */
use sqlx::PgConnection;
use uuid::Uuid;

/// Identity card of a resolved author.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// The payee for a compensable view: either a writer account or a
/// subscriber-as-author.
#[derive(Debug, Clone)]
pub enum Author {
    Writer(AuthorRecord),
    SubscriberAuthor(AuthorRecord),
}

impl Author {
    pub fn id(&self) -> Uuid {
        match self {
            Author::Writer(r) | Author::SubscriberAuthor(r) => r.id,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Author::Writer(r) | Author::SubscriberAuthor(r) => {
                format!("{} {}", r.first_name, r.last_name)
            }
        }
    }

    /// Credit the author's compensation balance with an atomic SQL-side
    /// increment on whichever table holds the account. Returns false when
    /// the row vanished since resolution.
    pub async fn credit(&self, conn: &mut PgConnection, amount: f64) -> sqlx::Result<bool> {
        let (table, id) = match self {
            Author::Writer(r) => ("recipe_writers", r.id),
            Author::SubscriberAuthor(r) => ("subscribers", r.id),
        };
        let query = format!(
            "UPDATE {} SET compensation_balance = compensation_balance + $1 WHERE id = $2",
            table
        );
        let result = sqlx::query(&query)
            .bind(amount)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Resolve an author id against the writer repository first, then the
/// subscriber repository.
pub async fn resolve(conn: &mut PgConnection, author_id: Uuid) -> sqlx::Result<Option<Author>> {
    let writer = sqlx::query_as::<_, AuthorRecord>(
        "SELECT id, first_name, last_name FROM recipe_writers WHERE id = $1",
    )
    .bind(author_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(record) = writer {
        return Ok(Some(Author::Writer(record)));
    }

    let subscriber = sqlx::query_as::<_, AuthorRecord>(
        "SELECT id, first_name, last_name FROM subscribers WHERE id = $1",
    )
    .bind(author_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(subscriber.map(Author::SubscriberAuthor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: &str, last: &str) -> AuthorRecord {
        AuthorRecord {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[test]
    fn test_display_name_joins_name_fields() {
        let author = Author::Writer(record("Julia", "Child"));
        assert_eq!(author.display_name(), "Julia Child");

        let author = Author::SubscriberAuthor(record("Home", "Cook"));
        assert_eq!(author.display_name(), "Home Cook");
    }

    #[test]
    fn test_id_is_variant_independent() {
        let rec = record("A", "B");
        let id = rec.id;
        assert_eq!(Author::SubscriberAuthor(rec).id(), id);
    }
}
