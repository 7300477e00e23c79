//! Database query functions for the `notifications` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Notification, NotificationKind};

/// Insert a notification for a user.
pub async fn insert_notification(
    pool: &PgPool,
    user_id: Uuid,
    message: &str,
    kind: NotificationKind,
) -> Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (user_id, message, kind) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(message)
    .bind(kind)
    .fetch_one(pool)
    .await
    .context("failed to insert notification")?;

    Ok(notification)
}

/// List a user's notifications, newest first, capped at 50.
///
/// With `unread_only`, rows already marked read are excluded.
pub async fn list_notifications(
    pool: &PgPool,
    user_id: Uuid,
    unread_only: bool,
) -> Result<Vec<Notification>> {
    let query = if unread_only {
        "SELECT * FROM notifications \
         WHERE user_id = $1 AND read_status = FALSE \
         ORDER BY created_at DESC \
         LIMIT 50"
    } else {
        "SELECT * FROM notifications \
         WHERE user_id = $1 \
         ORDER BY created_at DESC \
         LIMIT 50"
    };

    let notifications = sqlx::query_as::<_, Notification>(query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("failed to list notifications")?;

    Ok(notifications)
}

/// Mark a notification as read. The user_id filter keeps one user from
/// touching another's rows.
pub async fn mark_read(pool: &PgPool, id: i64, user_id: Uuid) -> Result<()> {
    let result =
        sqlx::query("UPDATE notifications SET read_status = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await
            .context("failed to mark notification read")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("notification {id} not found");
    }

    Ok(())
}

/// Delete a notification owned by the user.
pub async fn delete_notification(pool: &PgPool, id: i64, user_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("failed to delete notification")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("notification {id} not found");
    }

    Ok(())
}
