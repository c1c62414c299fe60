//! Dashboard listings and record mutations.

use std::io::{self, Write};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use ld_portal::domain::metrics::{
    admin_customer_view, admin_demo_view, admin_intern_view, intern_demo_view, intern_request_view,
};
use ld_portal::{
    LoadOutcome, MutationOutcome, RecordCollectionView, RecordId, generate_password,
    generate_username,
};
use ld_portal_sdk::{NewIntern, NoteKind, PortalError, Role, Secret, Specialization, UserIdentity};
use ldp_query::Filterable;
use serde::Serialize;

use crate::context::AppContext;
use crate::filters::FilterArgs;
use crate::render;

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Print the KPI cards after the table
    #[arg(long)]
    pub stats: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

fn customer_only(user: &UserIdentity) -> anyhow::Error {
    anyhow::anyhow!("{} has no dashboard collections", user.role)
}

async fn loaded<R>(view: &mut RecordCollectionView<R>) -> anyhow::Result<()>
where
    R: Filterable + RecordId + Send + Sync + 'static,
{
    match view.load().await {
        LoadOutcome::Loaded(_) => Ok(()),
        LoadOutcome::Failed(e) => Err(e).context("failed to load records"),
        LoadOutcome::Cancelled => anyhow::bail!("load cancelled"),
    }
}

type RenderRows<R> = fn(&mut dyn Write, &[&R], DateTime<Utc>) -> io::Result<()>;

impl ListArgs {
    pub async fn customers(&self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let user = ctx.identity()?;
        let view = match user.role {
            Role::Admin => admin_customer_view(ctx.api()),
            Role::Intern => intern_request_view(ctx.api(), &user.id),
            Role::Customer => return Err(customer_only(&user)),
        };
        self.show(view, out, |out, rows, _| render::requests(out, rows))
            .await
    }

    pub async fn demos(&self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let user = ctx.identity()?;
        let view = match user.role {
            Role::Admin => admin_demo_view(ctx.api()),
            Role::Intern => intern_demo_view(ctx.api(), &user.id),
            Role::Customer => return Err(customer_only(&user)),
        };
        self.show(view, out, render::demos).await
    }

    pub async fn interns(&self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        ctx.require_admin()?;
        self.show(admin_intern_view(ctx.api()), out, |out, rows, _| {
            render::interns(out, rows)
        })
        .await
    }

    async fn show<R>(
        &self,
        mut view: RecordCollectionView<R>,
        out: &mut dyn Write,
        rows: RenderRows<R>,
    ) -> anyhow::Result<()>
    where
        R: Filterable + RecordId + Serialize + Send + Sync + 'static,
    {
        self.filters.apply(&mut view)?;
        loaded(&mut view).await?;

        let filtered = view.filtered();
        if self.json {
            let stats = self.stats.then(|| view.stats());
            let body = serde_json::json!({ "records": filtered, "stats": stats });
            serde_json::to_writer_pretty(&mut *out, &body)?;
            writeln!(out)?;
            return Ok(());
        }

        rows(out, &filtered, view.now())?;
        if self.stats {
            render::stats(out, &view.stats())?;
        }
        Ok(())
    }
}

/// Collection a mutation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Customer request
    Request,
    /// Demo account
    Demo,
    /// Intern (admin only; delete)
    Intern,
}

enum Mutation {
    Status(String),
    Assign(Option<i64>),
    Note(NoteKind, String),
    Delete,
}

impl Mutation {
    fn verb(&self) -> &'static str {
        match self {
            Mutation::Status(_) => "status updated",
            Mutation::Assign(Some(_)) => "intern assigned",
            Mutation::Assign(None) => "intern unassigned",
            Mutation::Note(..) => "note saved",
            Mutation::Delete => "deleted",
        }
    }
}

async fn execute<R>(
    mut view: RecordCollectionView<R>,
    id: i64,
    mutation: &Mutation,
) -> anyhow::Result<MutationOutcome>
where
    R: Filterable + RecordId + Send + Sync + 'static,
{
    loaded(&mut view).await?;
    Ok(match mutation {
        Mutation::Status(status) => view.update_status(id, status).await,
        Mutation::Assign(intern) => view.assign_intern(id, *intern).await,
        Mutation::Note(kind, text) => view.update_note(id, *kind, text).await,
        Mutation::Delete => view.delete(id).await,
    })
}

async fn mutate(
    ctx: &AppContext,
    target: Target,
    id: i64,
    mutation: &Mutation,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let user = ctx.identity()?;
    let api = ctx.api();
    let outcome = match (target, user.role) {
        (Target::Request, Role::Admin) => execute(admin_customer_view(api), id, mutation).await?,
        (Target::Request, Role::Intern) => {
            execute(intern_request_view(api, &user.id), id, mutation).await?
        }
        (Target::Demo, Role::Admin) => execute(admin_demo_view(api), id, mutation).await?,
        (Target::Demo, Role::Intern) => {
            execute(intern_demo_view(api, &user.id), id, mutation).await?
        }
        (Target::Intern, Role::Admin) => execute(admin_intern_view(api), id, mutation).await?,
        (Target::Intern, Role::Intern) | (_, Role::Customer) => {
            return Err(PortalError::unsupported("mutation for this role").into());
        }
    };

    match outcome {
        MutationOutcome::Applied(LoadOutcome::Failed(e)) => {
            writeln!(out, "{}, but reloading failed: {e}", mutation.verb())?;
        }
        MutationOutcome::Applied(_) => writeln!(out, "{}", mutation.verb())?,
        MutationOutcome::Rejected(e) => return Err(e).context(format!("record {id} unchanged")),
    }
    Ok(())
}

#[derive(Args)]
pub struct AssignArgs {
    #[arg(value_enum)]
    pub target: Target,
    pub id: i64,

    /// Intern to assign
    #[arg(required_unless_present = "unassign")]
    pub intern_id: Option<i64>,

    /// Remove the current assignment
    #[arg(long, conflicts_with = "intern_id")]
    pub unassign: bool,
}

impl AssignArgs {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let intern = if self.unassign { None } else { self.intern_id };
        mutate(ctx, self.target, self.id, &Mutation::Assign(intern), out).await
    }
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(value_enum)]
    pub target: Target,
    pub id: i64,

    /// Request status (pending, assigned, in-progress, review, completed,
    /// on-hold) or demo state (active, expired)
    pub status: String,
}

impl StatusArgs {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        mutate(ctx, self.target, self.id, &Mutation::Status(self.status), out).await
    }
}

#[derive(Args)]
pub struct NoteArgs {
    #[arg(value_enum)]
    pub target: Target,
    pub id: i64,
    pub text: String,

    /// Write the admin note; defaults to the note of the signed-in role
    #[arg(long, conflicts_with = "intern")]
    pub admin: bool,

    /// Write the intern note
    #[arg(long)]
    pub intern: bool,
}

impl NoteArgs {
    fn kind(&self, role: Role) -> NoteKind {
        if self.admin {
            NoteKind::Admin
        } else if self.intern || role == Role::Intern {
            NoteKind::Intern
        } else {
            NoteKind::Admin
        }
    }

    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let kind = self.kind(ctx.identity()?.role);
        mutate(ctx, self.target, self.id, &Mutation::Note(kind, self.text), out).await
    }
}

#[derive(Args)]
pub struct DeleteArgs {
    #[arg(value_enum)]
    pub target: Target,
    pub id: i64,
}

impl DeleteArgs {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        ctx.require_admin()?;
        mutate(ctx, self.target, self.id, &Mutation::Delete, out).await
    }
}

#[derive(Args)]
pub struct AddInternArgs {
    pub name: String,
    pub email: String,

    #[arg(long)]
    pub phone: Option<String>,

    /// `L&D` or `Demo`
    #[arg(long, default_value = "L&D")]
    pub specialization: String,

    /// Integration the intern covers; repeat for several
    #[arg(long = "integration")]
    pub integrations: Vec<String>,

    /// Defaults to a generated `intern_<name>_<n>`
    #[arg(long)]
    pub username: Option<String>,

    /// Defaults to a generated 12-character password
    #[arg(long)]
    pub password: Option<String>,
}

impl AddInternArgs {
    fn into_new_intern(self) -> NewIntern {
        let username = self
            .username
            .unwrap_or_else(|| generate_username(&self.name));
        let password = self.password.unwrap_or_else(generate_password);
        NewIntern {
            specialization: Specialization::from(self.specialization.as_str()),
            name: self.name,
            username,
            password: Secret::from(password),
            email: self.email,
            phone: self.phone,
            integrations: self.integrations,
        }
    }

    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        ctx.require_admin()?;
        let intern = self.into_new_intern();
        let id = ctx.api().create_intern(&intern).await?;

        match id {
            Some(id) => writeln!(out, "intern {id} created")?,
            None => writeln!(out, "intern created")?,
        }
        writeln!(out, "username: {}", intern.username)?;
        writeln!(out, "password: {}", intern.password.expose())?;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn note_kind_follows_flags_then_role() {
        let note = |admin, intern| NoteArgs {
            target: Target::Request,
            id: 1,
            text: String::new(),
            admin,
            intern,
        };
        assert_eq!(note(false, false).kind(Role::Admin), NoteKind::Admin);
        assert_eq!(note(false, false).kind(Role::Intern), NoteKind::Intern);
        assert_eq!(note(false, true).kind(Role::Admin), NoteKind::Intern);
        assert_eq!(note(true, false).kind(Role::Intern), NoteKind::Admin);
    }

    #[test]
    fn new_intern_gets_generated_credentials() {
        let intern = AddInternArgs {
            name: "Grace Hopper".to_owned(),
            email: "grace@example.com".to_owned(),
            phone: None,
            specialization: "Demo".to_owned(),
            integrations: vec!["Slack".to_owned()],
            username: None,
            password: None,
        }
        .into_new_intern();

        assert!(intern.username.starts_with("intern_gracehopper_"));
        assert_eq!(intern.password.expose().len(), 12);
        assert_eq!(intern.specialization, Specialization::Demo);
    }
}
