use crate::db::models::{DbReview, ReviewPage, ReviewStats};
use crate::db::query::{self, REVIEW_COLUMNS};
use crate::db::schema::SQLITE_INIT;
use crate::error::CinelogError;
use crate::review::{ListCriteria, PER_PAGE, ReviewDraft, total_pages};
use crate::utils::logging::with_pretty_json_debug;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub enum DbActorMessage {
    /// Insert a validated review and return the stored row.
    Create(ReviewDraft, RpcReplyPort<Result<DbReview, CinelogError>>),

    /// Replace name/review/rating of an existing review.
    Update(i64, ReviewDraft, RpcReplyPort<Result<DbReview, CinelogError>>),

    /// Delete by id; replies whether a row was removed.
    Delete(i64, RpcReplyPort<Result<bool, CinelogError>>),

    /// Get a review by id.
    Get(i64, RpcReplyPort<Result<Option<DbReview>, CinelogError>>),

    /// Filter, sort and paginate, with stats over the filtered set.
    List(ListCriteria, RpcReplyPort<Result<ReviewPage, CinelogError>>),
}

/// Cloneable handle to the review store. All operations are serialized through one actor.
#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn create(&self, draft: ReviewDraft) -> Result<DbReview, CinelogError> {
        ractor::call!(self.actor, DbActorMessage::Create, draft)
            .map_err(|e| CinelogError::RactorError(format!("DbActor Create RPC failed: {e}")))?
    }

    /// Fails with `NotFound` when `id` does not exist.
    pub async fn update(&self, id: i64, draft: ReviewDraft) -> Result<DbReview, CinelogError> {
        ractor::call!(self.actor, DbActorMessage::Update, id, draft)
            .map_err(|e| CinelogError::RactorError(format!("DbActor Update RPC failed: {e}")))?
    }

    /// Idempotent: an unknown id is not an error. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, CinelogError> {
        ractor::call!(self.actor, DbActorMessage::Delete, id)
            .map_err(|e| CinelogError::RactorError(format!("DbActor Delete RPC failed: {e}")))?
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbReview>, CinelogError> {
        ractor::call!(self.actor, DbActorMessage::Get, id)
            .map_err(|e| CinelogError::RactorError(format!("DbActor Get RPC failed: {e}")))?
    }

    pub async fn list(&self, criteria: ListCriteria) -> Result<ReviewPage, CinelogError> {
        ractor::call!(self.actor, DbActorMessage::List, criteria)
            .map_err(|e| CinelogError::RactorError(format!("DbActor List RPC failed: {e}")))?
    }

    /// Stops the actor; the pool closes with its state.
    pub fn stop(&self) {
        self.actor.stop(None);
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.pool.close().await;
        info!("DbActor stopped");
        Ok(())
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::Create(draft, reply) => {
                let res = self.create_review(&state.pool, draft).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Update(id, draft, reply) => {
                let res = self.update_review(&state.pool, id, draft).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Delete(id, reply) => {
                let res = self.delete_review(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Get(id, reply) => {
                let res = self.get_review(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::List(criteria, reply) => {
                let res = self.list_reviews(&state.pool, criteria).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn create_review(
        &self,
        pool: &SqlitePool,
        draft: ReviewDraft,
    ) -> Result<DbReview, CinelogError> {
        let now = Utc::now();
        let name_folded = query::fold_name(&draft.name);
        let row = sqlx::query_as::<_, DbReview>(&format!(
            r#"
        INSERT INTO reviews (name, name_folded, review, rating, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {REVIEW_COLUMNS}
        "#
        ))
        .bind(draft.name)
        .bind(name_folded)
        .bind(draft.review)
        .bind(draft.rating.get())
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        info!(id = row.id, rating = row.rating, "review created");
        Ok(row)
    }

    async fn update_review(
        &self,
        pool: &SqlitePool,
        id: i64,
        draft: ReviewDraft,
    ) -> Result<DbReview, CinelogError> {
        let updated_at = Utc::now();
        let name_folded = query::fold_name(&draft.name);
        let row = sqlx::query_as::<_, DbReview>(&format!(
            r#"
        UPDATE reviews
        SET name = ?, name_folded = ?, review = ?, rating = ?, updated_at = ?
        WHERE id = ?
        RETURNING {REVIEW_COLUMNS}
        "#
        ))
        .bind(draft.name)
        .bind(name_folded)
        .bind(draft.review)
        .bind(draft.rating.get())
        .bind(updated_at)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        debug!(id, found = row.is_some(), updated_at = %updated_at, "db update applied");
        row.ok_or(CinelogError::NotFound(id))
    }

    async fn delete_review(&self, pool: &SqlitePool, id: i64) -> Result<bool, CinelogError> {
        let res = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        let affected = res.rows_affected();
        debug!(id, affected, "db delete applied");
        Ok(affected > 0)
    }

    async fn get_review(
        &self,
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<DbReview>, CinelogError> {
        let row = sqlx::query_as::<_, DbReview>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Stats, top pick and page are read inside one transaction so they describe the same rows.
    async fn list_reviews(
        &self,
        pool: &SqlitePool,
        criteria: ListCriteria,
    ) -> Result<ReviewPage, CinelogError> {
        with_pretty_json_debug(&criteria, |pretty| {
            debug!(criteria = %pretty, "listing reviews");
        });

        let filter = criteria.filter();
        let mut tx = pool.begin().await?;

        let (count, average): (i64, Option<f64>) = query::stats_query(filter)
            .build_query_as()
            .fetch_one(&mut *tx)
            .await?;

        let highest_rated: Option<DbReview> = query::top_rated_query(filter)
            .build_query_as()
            .fetch_optional(&mut *tx)
            .await?;

        let reviews: Vec<DbReview> = query::page_query(
            filter,
            criteria.sort,
            i64::from(PER_PAGE),
            criteria.offset(),
        )
        .build_query_as()
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let total = u64::try_from(count).unwrap_or_default();
        let stats = ReviewStats {
            total,
            average_rating: average.map(query::round2).unwrap_or(0.0),
            highest_rated,
            total_pages: total_pages(total),
        };

        debug!(
            page = criteria.page,
            returned = reviews.len(),
            total = stats.total,
            "listing composed"
        );

        Ok(ReviewPage {
            page: criteria.page,
            reviews,
            stats,
        })
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> Result<DbActorHandle, CinelogError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| CinelogError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CinelogError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
