//! Admin record maintenance: manual entries, edits and credential resets.

use std::io::Write;

use clap::{Args, Subcommand};
use ld_portal::{generate_password, generate_username};
use ld_portal_sdk::{Credentials, CustomerUpdate, InternUpdate, PortalError, Secret, Specialization};

use super::records::Target;
use crate::context::AppContext;

#[derive(Args)]
pub struct RegenerateArgs {
    #[arg(value_enum)]
    pub target: Target,
    pub id: i64,
}

impl RegenerateArgs {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        ctx.require_admin()?;
        match self.target {
            Target::Demo => {
                let issued = ctx.api().regenerate_demo_credentials(self.id).await?;
                writeln!(out, "demo {} reissued", self.id)?;
                writeln!(out, "username: {}", issued.username)?;
                writeln!(out, "password: {}", issued.password.expose())?;
                if let Some(expires) = issued.expires_at {
                    writeln!(out, "expires: {}", expires.format("%Y-%m-%d %H:%M UTC"))?;
                }
            }
            Target::Intern => {
                let api = ctx.api();
                let interns = api.list_interns().await?;
                let intern = interns
                    .iter()
                    .find(|i| i.id == self.id)
                    .ok_or_else(|| PortalError::not_found(format!("intern {}", self.id)))?;
                let credentials = Credentials {
                    username: generate_username(&intern.name),
                    password: Secret::from(generate_password()),
                };
                api.update_intern_credentials(self.id, &credentials).await?;
                writeln!(out, "intern {} reissued", self.id)?;
                writeln!(out, "username: {}", credentials.username)?;
                writeln!(out, "password: {}", credentials.password.expose())?;
            }
            Target::Request => anyhow::bail!("customer requests have no credentials"),
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct AddCustomerArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
}

impl AddCustomerArgs {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        ctx.require_admin()?;
        let customer = CustomerUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            company: self.company,
            phone: self.phone,
            industry_domain: self.industry,
        };
        match ctx.api().create_customer(&customer).await? {
            Some(id) => writeln!(out, "customer request {id} created")?,
            None => writeln!(out, "customer request created")?,
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum EditCommand {
    /// Edit the contact fields of a customer request
    Customer(EditCustomerArgs),
    /// Edit an intern's profile
    Intern(EditInternArgs),
}

impl EditCommand {
    pub async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        ctx.require_admin()?;
        match self {
            EditCommand::Customer(args) => args.run(ctx, out).await,
            EditCommand::Intern(args) => args.run(ctx, out).await,
        }
    }
}

/// Unset flags keep the stored value.
#[derive(Args, Default)]
pub struct EditCustomerArgs {
    pub id: i64,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
}

impl EditCustomerArgs {
    fn merge(self, mut update: CustomerUpdate) -> CustomerUpdate {
        if let Some(v) = self.first_name {
            update.first_name = v;
        }
        if let Some(v) = self.last_name {
            update.last_name = v;
        }
        if let Some(v) = self.email {
            update.email = v;
        }
        if let Some(v) = self.company {
            update.company = v;
        }
        update.phone = self.phone.or(update.phone);
        update.industry_domain = self.industry.or(update.industry_domain);
        update
    }

    async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let api = ctx.api();
        let id = self.id;
        let requests = api.list_customer_requests().await?;
        let current = requests
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| PortalError::not_found(format!("customer request {id}")))?;

        let update = self.merge(CustomerUpdate::from(current));
        api.update_customer(id, &update).await?;
        writeln!(out, "customer request {id} updated")?;
        Ok(())
    }
}

#[derive(Args, Default)]
pub struct EditInternArgs {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,

    /// `L&D` or `Demo`
    #[arg(long)]
    pub specialization: Option<String>,

    /// Replaces the integration list; repeat for several
    #[arg(long = "integration")]
    pub integrations: Vec<String>,
}

impl EditInternArgs {
    fn update(self) -> Option<InternUpdate> {
        let update = InternUpdate {
            name: self.name,
            email: self.email,
            phone: self.phone,
            specialization: self.specialization.as_deref().map(Specialization::from),
            integrations: (!self.integrations.is_empty()).then_some(self.integrations),
        };
        let empty = update.name.is_none()
            && update.email.is_none()
            && update.phone.is_none()
            && update.specialization.is_none()
            && update.integrations.is_none();
        (!empty).then_some(update)
    }

    async fn run(self, ctx: &AppContext, out: &mut dyn Write) -> anyhow::Result<()> {
        let id = self.id;
        let Some(update) = self.update() else {
            anyhow::bail!("nothing to change for intern {id}");
        };
        ctx.api().update_intern(id, &update).await?;
        writeln!(out, "intern {id} updated")?;
        Ok(())
    }
}
