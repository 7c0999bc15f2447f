//! Repository for one-time password records.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

pub struct SmsVerificationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SmsVerificationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Stores a freshly issued code.
    ///
    /// Earlier unused codes for the same phone are marked used first so only the latest
    /// code can ever verify.
    ///
    /// # Arguments
    /// - `phone_number` - Phone the code was sent to
    /// - `code` - Six digit code
    /// - `expires_at` - Instant after which the code is rejected
    ///
    /// # Returns
    /// - `Ok(Model)` - The stored verification record
    /// - `Err(DbErr)` - Database error during update or insert
    pub async fn create(
        &self,
        phone_number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<entity::sms_verification::Model, DbErr> {
        entity::prelude::SmsVerification::update_many()
            .filter(entity::sms_verification::Column::PhoneNumber.eq(phone_number))
            .filter(entity::sms_verification::Column::IsUsed.eq(false))
            .col_expr(
                entity::sms_verification::Column::IsUsed,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(self.db)
            .await?;

        entity::sms_verification::ActiveModel {
            phone_number: ActiveValue::Set(phone_number.to_string()),
            code: ActiveValue::Set(code.to_string()),
            expires_at: ActiveValue::Set(expires_at),
            is_used: ActiveValue::Set(false),
            attempts: ActiveValue::Set(0),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Finds the newest unused, unexpired code for a phone.
    pub async fn find_active(
        &self,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<entity::sms_verification::Model>, DbErr> {
        entity::prelude::SmsVerification::find()
            .filter(entity::sms_verification::Column::PhoneNumber.eq(phone_number))
            .filter(entity::sms_verification::Column::IsUsed.eq(false))
            .filter(entity::sms_verification::Column::ExpiresAt.gt(now))
            .order_by_desc(entity::sms_verification::Column::CreatedAt)
            .order_by_desc(entity::sms_verification::Column::Id)
            .one(self.db)
            .await
    }

    /// Records a failed verification attempt.
    pub async fn increment_attempts(
        &self,
        verification: entity::sms_verification::Model,
    ) -> Result<entity::sms_verification::Model, DbErr> {
        let attempts = verification.attempts + 1;
        let mut verification: entity::sms_verification::ActiveModel = verification.into();
        verification.attempts = ActiveValue::Set(attempts);
        verification.update(self.db).await
    }

    /// Consumes a code so it cannot be reused.
    pub async fn mark_used(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::SmsVerification::update_many()
            .filter(entity::sms_verification::Column::Id.eq(id))
            .col_expr(
                entity::sms_verification::Column::IsUsed,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }
}
