//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::book::{page_offset, Book, BookFilters, BookListing, NewBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Search books with filters, newest first
    pub async fn search(&self, filters: &BookFilters, page: i64, limit: i64) -> AppResult<BookListing> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        push_filters(&mut count_query, filters);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM books");
        push_filters(&mut query, filters);
        query.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(page_offset(page, limit));

        let books = query
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok(BookListing { books, total })
    }

    /// Create a new book
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        insert_book(&self.pool, book).await
    }

    /// Insert several books in one transaction
    pub async fn create_many(&self, books: &[NewBook]) -> AppResult<Vec<Book>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(books.len());
        for book in books {
            created.push(insert_book(&mut *tx, book).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Partial update: absent fields keep their stored value
    pub async fn update(&self, id: i64, update: &UpdateBook, actor: Option<&str>) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                description = COALESCE($5, description),
                categories = COALESCE($6, categories),
                published_at = COALESCE($7, published_at),
                book_type = COALESCE($8, book_type),
                status = COALESCE($9, status),
                total_quantity = COALESCE($10, total_quantity),
                available_quantity = COALESCE($11, available_quantity),
                price = COALESCE($12, price),
                rental_price = COALESCE($13, rental_price),
                rental_duration_days = COALESCE($14, rental_duration_days),
                publisher = COALESCE($15, publisher),
                thumbnail_url = COALESCE($16, thumbnail_url),
                page_count = COALESCE($17, page_count),
                language = COALESCE($18, language),
                updated_by = $19,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.isbn)
        .bind(&update.description)
        .bind(&update.categories)
        .bind(update.published_at)
        .bind(update.book_type)
        .bind(update.status)
        .bind(update.total_quantity)
        .bind(update.available_quantity)
        .bind(update.price)
        .bind(update.rental_price)
        .bind(update.rental_duration_days)
        .bind(&update.publisher)
        .bind(&update.thumbnail_url)
        .bind(update.page_count)
        .bind(&update.language)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Delete a book, returns false when nothing matched
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Distinct non-blank categories, sorted
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT TRIM(c) AS category
            FROM books, UNNEST(categories) AS c
            WHERE TRIM(c) <> ''
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Books the user has borrowed at least once
    pub async fn borrowed_by(&self, user_id: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE id IN (SELECT DISTINCT book_id FROM transactions WHERE user_id = $1)
            ORDER BY title, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_book<'e, E>(executor: E, book: &NewBook) -> AppResult<Book>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let created = sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (
            title, author, isbn, description, categories, published_at,
            book_type, status, total_quantity, available_quantity,
            price, rental_price, rental_duration_days, publisher,
            thumbnail_url, page_count, language, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        RETURNING *
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.isbn)
    .bind(&book.description)
    .bind(&book.categories)
    .bind(book.published_at)
    .bind(book.book_type)
    .bind(book.status)
    .bind(book.total_quantity)
    .bind(book.available_quantity)
    .bind(book.price)
    .bind(book.rental_price)
    .bind(book.rental_duration_days)
    .bind(&book.publisher)
    .bind(&book.thumbnail_url)
    .bind(book.page_count)
    .bind(&book.language)
    .bind(&book.created_by)
    .fetch_one(executor)
    .await?;

    Ok(created)
}

/// Append the WHERE clause for the given filters.
/// The keyword group is combined with every other filter using AND.
pub fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filters: &BookFilters) {
    let mut has_where = false;

    if let Some(keyword) = &filters.keyword {
        let pattern = format!("%{}%", keyword);
        push_clause(query, &mut has_where);
        query.push("(title ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR author ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR isbn ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    if let Some(category) = &filters.category {
        push_clause(query, &mut has_where);
        query.push("array_to_string(categories, ',') ILIKE ");
        query.push_bind(format!("%{}%", category));
    }

    if let Some(author) = &filters.author {
        push_clause(query, &mut has_where);
        query.push("author ILIKE ");
        query.push_bind(format!("%{}%", author));
    }

    if let Some(status) = filters.status {
        push_clause(query, &mut has_where);
        query.push("status = ");
        query.push_bind(status);
    }
}

fn push_clause(query: &mut QueryBuilder<'_, Postgres>, has_where: &mut bool) {
    query.push(if *has_where { " AND " } else { " WHERE " });
    *has_where = true;
}

/// Load a book and lock its row until the transaction ends
pub async fn lock_book(conn: &mut PgConnection, id: i64) -> AppResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(book)
}

/// Persist the inventory counters of a locked book
pub async fn save_inventory(conn: &mut PgConnection, book: &Book) -> AppResult<()> {
    sqlx::query(
        "UPDATE books SET available_quantity = $2, status = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(book.id)
    .bind(book.available_quantity)
    .bind(book.status)
    .execute(conn)
    .await?;
    Ok(())
}

/// Load every book whose id is listed, in id order
pub async fn fetch_books_by_ids(conn: &mut PgConnection, ids: &[i64]) -> AppResult<Vec<Book>> {
    let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ANY($1) ORDER BY id")
        .bind(ids)
        .fetch_all(conn)
        .await?;
    Ok(books)
}

/// Recompute a book's rating aggregates from its reviews
pub async fn refresh_rating(conn: &mut PgConnection, book_id: i64) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE books SET
            average_rating = COALESCE((SELECT AVG(rating)::float8 FROM reviews WHERE book_id = $1), 0),
            ratings_count = (SELECT COUNT(id)::int FROM reviews WHERE book_id = $1),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(book_id)
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::BookStatus;

    fn sql_for(filters: &BookFilters) -> String {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM books");
        push_filters(&mut query, filters);
        query.sql().to_string()
    }

    #[test]
    fn test_no_filters() {
        assert_eq!(sql_for(&BookFilters::default()), "SELECT * FROM books");
    }

    #[test]
    fn test_keyword_only() {
        let filters = BookFilters { keyword: Some("rust".into()), ..Default::default() };
        assert_eq!(
            sql_for(&filters),
            "SELECT * FROM books WHERE (title ILIKE $1 OR author ILIKE $2 OR isbn ILIKE $3)"
        );
    }

    #[test]
    fn test_keyword_is_combined_with_other_filters() {
        let filters = BookFilters {
            keyword: Some("rust".into()),
            category: Some("Programming".into()),
            author: Some("Klabnik".into()),
            status: Some(BookStatus::Available),
        };
        assert_eq!(
            sql_for(&filters),
            "SELECT * FROM books WHERE (title ILIKE $1 OR author ILIKE $2 OR isbn ILIKE $3) \
             AND array_to_string(categories, ',') ILIKE $4 AND author ILIKE $5 AND status = $6"
        );
    }

    #[test]
    fn test_filters_without_keyword() {
        let filters = BookFilters {
            author: Some("Tolkien".into()),
            status: Some(BookStatus::OutOfStock),
            ..Default::default()
        };
        assert_eq!(
            sql_for(&filters),
            "SELECT * FROM books WHERE author ILIKE $1 AND status = $2"
        );
    }
}
