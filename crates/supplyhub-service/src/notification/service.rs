//! Notification CRUD, read-state transitions, and dispatch enqueueing.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use supplyhub_auth::rbac::{NotificationPermission, RbacEnforcer};
use supplyhub_core::error::AppError;
use supplyhub_core::result::AppResult;
use supplyhub_core::traits::Clock;
use supplyhub_database::NotificationStore;
use supplyhub_entity::dispatch::NewDispatchTask;
use supplyhub_entity::notification::{
    CreateNotification, Notification, NotificationFilter, NotificationStats, NotificationStatus,
    UpdateNotification,
};

use crate::context::RequestContext;
use crate::delivery::DispatchScheduler;

/// Manages notification records on behalf of API callers and templates.
pub struct NotificationService {
    /// Notification store.
    store: Arc<dyn NotificationStore>,
    /// Dispatch queue writer.
    scheduler: Arc<DispatchScheduler>,
    clock: Arc<dyn Clock>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
    /// Applied when the caller does not set `max_retries`.
    default_max_retries: i32,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        scheduler: Arc<DispatchScheduler>,
        clock: Arc<dyn Clock>,
        rbac: Arc<RbacEnforcer>,
        default_max_retries: i32,
    ) -> Self {
        Self {
            store,
            scheduler,
            clock,
            rbac,
            default_max_retries,
        }
    }

    /// Validates, persists, and enqueues the first dispatch pass.
    ///
    /// Notifications with a future `scheduled_at` are enqueued for that time;
    /// everything else is due immediately.
    pub async fn create(&self, mut input: CreateNotification) -> AppResult<Notification> {
        input
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid notification: {e}")))?;
        apply_preferences(&mut input)?;

        let now = self.clock.now();
        let record = Notification::from_create(input, self.default_max_retries, now);
        let created = self.store.create(&record).await.map_err(|e| {
            error!(error = %e, user_id = %record.user_id, "Failed to persist notification");
            AppError::validation("Failed to create notification")
        })?;

        let task = match created.scheduled_at {
            Some(at) if at > now => NewDispatchTask::scheduled(created.id, at),
            _ => NewDispatchTask::initial(created.id, now),
        };
        if let Err(e) = self.scheduler.schedule(task).await {
            error!(notification_id = %created.id, error = %e, "Failed to enqueue dispatch");
            self.store
                .mark_failed(created.id, "Failed to schedule delivery", self.clock.now())
                .await?;
            return Err(e);
        }

        info!(
            notification_id = %created.id,
            user_id = %created.user_id,
            notification_type = %created.notification_type,
            channels = ?created.channels,
            "Notification created"
        );
        Ok(created)
    }

    /// Lists notifications matching `filter`, newest first.
    pub async fn find_all(&self, filter: &NotificationFilter) -> AppResult<Vec<Notification>> {
        self.store.find_all(filter).await
    }

    /// Lists notifications visible to the caller. Non-admins only ever see
    /// their own, whatever `filter.user_id` says.
    pub async fn list_for(
        &self,
        ctx: &RequestContext,
        mut filter: NotificationFilter,
    ) -> AppResult<Vec<Notification>> {
        self.rbac
            .require_permission(ctx.role, NotificationPermission::Read)?;
        if !ctx.is_admin() {
            filter.user_id = Some(ctx.user_id);
        }
        self.find_all(&filter).await
    }

    pub async fn find_one(&self, id: Uuid) -> AppResult<Notification> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Fetches a notification the caller is allowed to see.
    pub async fn find_one_for(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Notification> {
        self.rbac
            .require_permission(ctx.role, NotificationPermission::Read)?;
        let notification = self.find_one(id).await?;
        self.rbac
            .require_owner_or_admin(ctx.role, ctx.user_id, notification.user_id)?;
        Ok(notification)
    }

    /// Patches content fields.
    pub async fn update(&self, id: Uuid, patch: &UpdateNotification) -> AppResult<Notification> {
        if patch.title.as_deref().is_some_and(|t| t.is_empty() || t.len() > 255) {
            return Err(AppError::validation("title must be 1-255 characters"));
        }
        if patch.message.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::validation("message must not be empty"));
        }
        self.store
            .update(id, patch, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    pub async fn remove(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        self.rbac
            .require_permission(ctx.role, NotificationPermission::Manage)?;
        let notification = self.find_one(id).await?;
        self.rbac
            .require_owner_or_admin(ctx.role, ctx.user_id, notification.user_id)?;

        if !self.store.delete(id).await? {
            return Err(AppError::not_found("Notification not found"));
        }
        info!(notification_id = %id, removed_by = %ctx.user_id, "Notification removed");
        Ok(())
    }

    /// Counts by status, for one user or across all users.
    pub async fn get_stats(&self, user_id: Option<Uuid>) -> AppResult<NotificationStats> {
        self.store.stats(user_id).await
    }

    /// SENT or DELIVERED notifications for `user_id`, newest first.
    pub async fn unread(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let filter = NotificationFilter {
            statuses: NotificationStatus::AWAITING_READ.to_vec(),
            ..NotificationFilter::for_user(user_id)
        };
        self.store.find_all(&filter).await
    }

    /// Moves a notification to READ.
    ///
    /// Repeated calls succeed and keep the first `read_at`. FAILED
    /// notifications cannot be read.
    pub async fn mark_as_read(&self, ctx: &RequestContext, id: Uuid) -> AppResult<Notification> {
        self.rbac
            .require_permission(ctx.role, NotificationPermission::Manage)?;
        let current = self.find_one(id).await?;
        self.rbac
            .require_owner_or_admin(ctx.role, ctx.user_id, current.user_id)?;

        if !current.status.can_mark_read() {
            return Err(AppError::conflict(
                "Cannot mark a failed notification as read",
            ));
        }

        match self.store.mark_read(id, self.clock.now()).await? {
            Some(updated) => Ok(updated),
            None => {
                warn!(notification_id = %id, "Notification changed state before it was read");
                Err(AppError::conflict(
                    "Cannot mark a failed notification as read",
                ))
            }
        }
    }

    /// Marks every SENT or DELIVERED notification of `user_id` as READ.
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> AppResult<u64> {
        let count = self.store.mark_all_read(user_id, self.clock.now()).await?;
        info!(user_id = %user_id, count, "Marked notifications as read");
        Ok(count)
    }

    pub(crate) fn rbac(&self) -> &RbacEnforcer {
        &self.rbac
    }
}

/// Drop channels the recipient has disabled.
fn apply_preferences(input: &mut CreateNotification) -> AppResult<()> {
    let Some(prefs) = input.user_preferences.as_ref() else {
        return Ok(());
    };

    let enabled: Vec<_> = input
        .resolved_channels()
        .into_iter()
        .filter(|ch| prefs.allows(*ch))
        .collect();
    let Some(first) = enabled.first().copied() else {
        return Err(AppError::validation("No enabled delivery channels"));
    };

    if !prefs.allows(input.channel) {
        input.channel = first;
    }
    input.channels = Some(enabled);
    Ok(())
}
