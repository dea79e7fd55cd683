use clap::{Args, Subcommand};
use eyre::{Result, eyre};
use qbcli_client::{
    query::parse_field_list,
    resources::fields::{FieldInput, FieldProperties},
};
use qbcli_core::FieldId;

use super::{GlobalArgs, UnwrapOrExit};

#[derive(Args)]
pub struct FieldCommand {
    #[command(subcommand)]
    command: FieldSubcommand,
}

#[derive(Subcommand)]
enum FieldSubcommand {
    /// List the fields of a table
    List,

    /// Show a field
    Get(FieldIdArg),

    /// Create a field
    Create(CreateArgs),

    /// Update a field's label, help text or properties
    Update(UpdateArgs),

    /// Delete fields
    Delete(DeleteArgs),
}

#[derive(Args)]
struct FieldIdArg {
    /// Field ID (defaults to the profile's field_id)
    #[arg(long)]
    field_id: Option<FieldId>,
}

#[derive(Args)]
struct PropertyArgs {
    /// Help text shown to users
    #[arg(long)]
    field_help: Option<String>,

    #[arg(long)]
    required: bool,

    #[arg(long)]
    unique: bool,

    /// Add the field to the table's forms
    #[arg(long)]
    add_to_forms: bool,

    #[arg(long)]
    default_value: Option<String>,

    /// Formula for formula fields
    #[arg(long)]
    formula: Option<String>,

    #[arg(long)]
    comments: Option<String>,
}

impl PropertyArgs {
    fn input(&self, label: Option<String>, field_type: Option<String>) -> FieldInput {
        let properties = FieldProperties {
            default_value: self.default_value.clone(),
            formula: self.formula.clone(),
            comments: self.comments.clone(),
            ..FieldProperties::default()
        };
        FieldInput {
            label,
            field_type,
            field_help: self.field_help.clone(),
            required: self.required,
            unique: self.unique,
            add_to_forms: self.add_to_forms,
            properties: (!properties.is_empty()).then_some(properties),
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    label: String,

    /// Field type, e.g. text, numeric, date, checkbox
    #[arg(long = "type")]
    field_type: String,

    #[command(flatten)]
    properties: PropertyArgs,
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    id: FieldIdArg,

    #[arg(long)]
    label: Option<String>,

    #[command(flatten)]
    properties: PropertyArgs,
}

#[derive(Args)]
struct DeleteArgs {
    /// Comma separated field IDs
    #[arg(long)]
    field_ids: String,
}

impl FieldIdArg {
    fn resolve(&self, global: &GlobalArgs) -> Result<FieldId> {
        match self.field_id {
            Some(id) => Ok(id),
            None => global
                .profile()?
                .field_id
                .ok_or_else(|| eyre!("field ID required, pass --field-id")),
        }
    }
}

impl FieldCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let table_id = global.table_id()?;
        match &self.command {
            FieldSubcommand::List => {
                global.render_value(&client.list_fields(&table_id).unwrap_or_exit())
            }
            FieldSubcommand::Get(args) => {
                let field_id = args.resolve(global)?;
                global.render_value(&client.get_field(&table_id, field_id).unwrap_or_exit())
            }
            FieldSubcommand::Create(args) => {
                let input = args
                    .properties
                    .input(Some(args.label.clone()), Some(args.field_type.clone()));
                global.render_value(&client.create_field(&table_id, &input).unwrap_or_exit())
            }
            FieldSubcommand::Update(args) => {
                let field_id = args.id.resolve(global)?;
                let input = args.properties.input(args.label.clone(), None);
                let field = client
                    .update_field(&table_id, field_id, &input)
                    .unwrap_or_exit();
                global.render_value(&field)
            }
            FieldSubcommand::Delete(args) => {
                let field_ids = parse_field_list(&args.field_ids).unwrap_or_exit();
                global.render_value(&client.delete_fields(&table_id, &field_ids).unwrap_or_exit())
            }
        }
    }
}
