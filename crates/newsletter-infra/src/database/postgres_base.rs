use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel, PrimaryKeyTrait, SqlErr,
};

use newsletter_core::error::RepoError;
use newsletter_core::ports::BaseRepository;

/// `find_by_id`/`save`/`delete` for any SeaORM entity whose model converts to
/// and from a domain type.
pub struct PostgresBaseRepository<E: EntityTrait> {
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> PostgresBaseRepository<E> {
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// Maps SeaORM failures onto the repository taxonomy. Unique and foreign-key
/// violations become `Constraint`.
pub(crate) fn repo_error(err: DbErr) -> RepoError {
    if let Some(violation) = err.sql_err() {
        return match violation {
            SqlErr::UniqueConstraintViolation(detail) => RepoError::Constraint(detail),
            SqlErr::ForeignKeyConstraintViolation(detail) => RepoError::Constraint(detail),
            other => RepoError::Query(other.to_string()),
        };
    }
    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(conn) => RepoError::Connection(conn.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        E::find_by_id(id)
            .one(&self.db)
            .await
            .map(|found| found.map(T::from))
            .map_err(repo_error)
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let changes: E::ActiveModel = entity.into();
        changes.update(&self.db).await.map(T::from).map_err(repo_error)
    }

    async fn delete(&self, id: ID) -> Result<(), RepoError> {
        let deleted = E::delete_by_id(id).exec(&self.db).await.map_err(repo_error)?;
        match deleted.rows_affected {
            0 => Err(RepoError::NotFound),
            _ => Ok(()),
        }
    }
}
