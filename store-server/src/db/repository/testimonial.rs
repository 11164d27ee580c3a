//! Testimonial Repository

use super::{BaseRepository, FIELDS, RepoError, RepoResult};
use crate::db::models::{
    GenderStats, LatestTestimonial, Testimonial, TestimonialPatch, TestimonialRecord,
    TestimonialStats,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "testimonial";

#[derive(Clone)]
pub struct TestimonialRepository {
    base: BaseRepository,
}

impl TestimonialRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all testimonials, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Testimonial>> {
        let testimonials: Vec<Testimonial> = self
            .base
            .db()
            .query(format!("SELECT {FIELDS} FROM {TABLE} ORDER BY created_at DESC"))
            .await?
            .take(0)?;
        Ok(testimonials)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Testimonial>> {
        self.base.find_one(TABLE, id).await
    }

    pub async fn create(&self, record: TestimonialRecord) -> RepoResult<Testimonial> {
        let id = self.base.insert(TABLE, record).await?;
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Testimonial {id} vanished after create")))
    }

    pub async fn update(&self, id: &str, patch: TestimonialPatch) -> RepoResult<Testimonial> {
        if !self.base.merge(TABLE, id, patch).await? {
            return Err(RepoError::NotFound(format!("Testimonial {id} not found")));
        }
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Testimonial {id} not found")))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        self.base.remove(TABLE, id).await
    }

    /// Total, per-gender counts and the most recent entry
    pub async fn stats(&self) -> RepoResult<TestimonialStats> {
        let count = |condition: &str| {
            format!("SELECT count() AS total FROM {TABLE}{condition} GROUP ALL")
        };
        let total = self.base.count(&count("")).await?;
        let male = self.base.count(&count(" WHERE gender = 'male'")).await?;
        let female = self.base.count(&count(" WHERE gender = 'female'")).await?;

        let mut result = self
            .base
            .db()
            .query(format!(
                "SELECT customer_name, created_at FROM {TABLE} ORDER BY created_at DESC LIMIT 1"
            ))
            .await?;
        let latest: Vec<LatestTestimonial> = result.take(0)?;

        Ok(TestimonialStats {
            total,
            gender_stats: GenderStats { male, female },
            latest: latest.into_iter().next(),
        })
    }
}
