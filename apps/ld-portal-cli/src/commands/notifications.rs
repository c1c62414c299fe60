use std::io::Write;

use clap::Subcommand;
use ld_portal::{NotificationPoller, NotificationSnapshot};
use ld_portal_sdk::{NotificationQuery, RecipientType, Role, UserIdentity};

use crate::context::AppContext;
use crate::render;

#[derive(Subcommand)]
pub enum NotificationsCommand {
    /// Print the latest notifications
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,

        /// How many to fetch; defaults to `notifications.limit`
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Keep polling and print every change until interrupted
    Watch,
    /// Mark one notification as read
    Read { id: i64 },
    /// Mark every notification as read
    ReadAll,
    /// Remove one notification
    Delete { id: i64 },
}

fn recipient(user: &UserIdentity) -> anyhow::Result<(RecipientType, Option<String>)> {
    match user.role {
        Role::Admin => Ok((RecipientType::Admin, None)),
        Role::Intern => Ok((RecipientType::Intern, Some(user.id.clone()))),
        Role::Customer => anyhow::bail!("customers have no notifications"),
    }
}

fn poller(ctx: &AppContext) -> anyhow::Result<NotificationPoller> {
    let user = ctx.identity()?;
    let (recipient, recipient_id) = recipient(&user)?;
    Ok(NotificationPoller::new(
        ctx.api(),
        recipient,
        recipient_id,
        &ctx.config.notifications,
    ))
}

fn print(out: &mut dyn Write, snapshot: &NotificationSnapshot) -> std::io::Result<()> {
    render::notifications(out, &snapshot.items, snapshot.unread)
}

impl NotificationsCommand {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        match self {
            NotificationsCommand::List { unread, limit } => list(ctx, out, unread, limit).await,
            NotificationsCommand::Watch => watch(ctx, out).await,
            NotificationsCommand::Read { id } => {
                let poller = poller(ctx)?;
                poller.refresh().await?;
                poller.mark_read(id).await?;
                print(out, &poller.snapshot())?;
                Ok(())
            }
            NotificationsCommand::ReadAll => {
                let poller = poller(ctx)?;
                poller.mark_all_read().await?;
                writeln!(out, "all notifications marked as read")?;
                Ok(())
            }
            NotificationsCommand::Delete { id } => {
                let poller = poller(ctx)?;
                poller.refresh().await?;
                poller.delete(id).await?;
                print(out, &poller.snapshot())?;
                Ok(())
            }
        }
    }
}

async fn list(
    ctx: &AppContext,
    out: &mut dyn Write,
    unread_only: bool,
    limit: Option<u32>,
) -> anyhow::Result<()> {
    let user = ctx.identity()?;
    let (recipient, recipient_id) = recipient(&user)?;
    let limit = limit.unwrap_or(ctx.config.notifications.limit);

    let mut query = NotificationQuery::new(recipient, recipient_id, limit);
    query.unread_only = unread_only;

    let api = ctx.api();
    let items = api.notifications(&query).await?;
    let unread = api
        .unread_count(recipient, query.recipient_id.as_deref())
        .await?;
    render::notifications(out, &items, unread)?;
    Ok(())
}

async fn watch(ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
    let poller = poller(ctx)?;
    let mut rx = poller.subscribe();
    let handle = poller.spawn();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                print(out, &snapshot)?;
                writeln!(out)?;
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
        }
    }

    poller.cancel();
    handle.await?;
    Ok(())
}
