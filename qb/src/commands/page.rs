use std::{fs, path::PathBuf};

use clap::{Args, Subcommand, ValueEnum};
use eyre::{Context, Result, bail};
use qbcli_client::resources::pages::PageType;

use super::{GlobalArgs, UnwrapOrExit};

#[derive(Args)]
pub struct PageCommand {
    #[command(subcommand)]
    command: PageSubcommand,
}

#[derive(Subcommand)]
enum PageSubcommand {
    /// Print a page's body
    Get(GetArgs),

    /// Add a page to an app
    Create(CreateArgs),

    /// Replace the body of a page
    Update(UpdateArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Html,
    ExactForm,
}

impl From<Kind> for PageType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Html => PageType::Html,
            Kind::ExactForm => PageType::ExactForm,
        }
    }
}

#[derive(Args)]
struct GetArgs {
    /// Page ID or name
    #[arg(long)]
    page_id: String,
}

#[derive(Args)]
struct BodyArgs {
    /// Page content
    #[arg(long, conflicts_with = "file")]
    body: Option<String>,

    /// Read the page content from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl BodyArgs {
    fn read(&self) -> Result<String> {
        match (&self.body, &self.file) {
            (Some(body), _) => Ok(body.clone()),
            (None, Some(path)) => fs::read_to_string(path)
                .wrap_err_with(|| format!("error reading page body from {}", path.display())),
            (None, None) => bail!("page body required, pass --body or --file"),
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    name: String,

    #[arg(long = "type", value_enum, default_value = "html")]
    kind: Kind,

    #[command(flatten)]
    body: BodyArgs,
}

#[derive(Args)]
struct UpdateArgs {
    /// Page to replace, by ID
    #[arg(long)]
    page_id: Option<u64>,

    /// Page to replace, by name
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    body: BodyArgs,
}

impl PageCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let app_id = global.app_id()?;
        match &self.command {
            PageSubcommand::Get(args) => {
                global.render_value(&client.get_page(&app_id, &args.page_id).unwrap_or_exit())
            }
            PageSubcommand::Create(args) => {
                let body = args.body.read()?;
                let page = client
                    .create_page(&app_id, &args.name, args.kind.into(), &body)
                    .unwrap_or_exit();
                global.render_value(&page)
            }
            PageSubcommand::Update(args) => {
                let body = args.body.read()?;
                let page = client
                    .update_page(&app_id, args.page_id, args.name.as_deref(), &body)
                    .unwrap_or_exit();
                global.render_value(&page)
            }
        }
    }
}
