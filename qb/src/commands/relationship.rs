use clap::{Args, Subcommand};
use eyre::Result;
use qbcli_client::{
    query::{parse_field_list, parse_query},
    resources::relationships::{
        CreateRelationshipInput, ForeignKeyLabel, SummaryField, UpdateRelationshipInput,
    },
};
use qbcli_core::FieldId;

use super::{GlobalArgs, UnwrapOrExit};

/// Relationships are addressed through their child table (`--table-id`).
#[derive(Args)]
pub struct RelationshipCommand {
    #[command(subcommand)]
    command: RelationshipSubcommand,
}

#[derive(Subcommand)]
enum RelationshipSubcommand {
    /// List the relationships of a child table
    List,

    /// Relate a child table to a parent table
    Create(CreateArgs),

    /// Add lookup or summary fields to a relationship
    Update(UpdateArgs),

    /// Delete a relationship
    Delete(IdArg),
}

#[derive(Args)]
struct IdArg {
    #[arg(long)]
    relationship_id: u64,
}

#[derive(Args)]
struct FieldArgs {
    /// Comma separated parent field IDs to look up in the child table
    #[arg(long)]
    lookup_field_ids: Option<String>,

    /// Parent field to summarize (COUNT needs none)
    #[arg(long)]
    summary_field_id: Option<FieldId>,

    /// Summary accumulation: SUM, AVG, MAX, MIN, STD-DEV, COUNT, ...
    #[arg(long)]
    accumulation_type: Option<String>,

    /// Label of the summary field
    #[arg(long)]
    summary_label: Option<String>,

    /// Only summarize child records matching this filter
    #[arg(long)]
    summary_where: Option<String>,
}

impl FieldArgs {
    fn lookup_field_ids(&self) -> Vec<FieldId> {
        match &self.lookup_field_ids {
            Some(list) => parse_field_list(list).unwrap_or_exit(),
            None => Vec::new(),
        }
    }

    fn summary_fields(&self) -> Vec<SummaryField> {
        self.accumulation_type
            .iter()
            .map(|accumulation| SummaryField {
                summary_field_id: self.summary_field_id,
                label: self.summary_label.clone(),
                accumulation_type: accumulation.to_uppercase(),
                filter: self.summary_where.as_deref().map(parse_query),
            })
            .collect()
    }
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    parent_table_id: String,

    /// Label of the reference field created in the child table
    #[arg(long)]
    foreign_key_label: Option<String>,

    #[command(flatten)]
    fields: FieldArgs,
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    id: IdArg,

    #[command(flatten)]
    fields: FieldArgs,
}

impl RelationshipCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        let child_table_id = global.table_id()?;
        match &self.command {
            RelationshipSubcommand::List => {
                global.render_value(&client.list_relationships(&child_table_id).unwrap_or_exit())
            }
            RelationshipSubcommand::Create(args) => {
                let input = CreateRelationshipInput {
                    parent_table_id: args.parent_table_id.clone(),
                    foreign_key_field: args
                        .foreign_key_label
                        .clone()
                        .map(|label| ForeignKeyLabel { label }),
                    lookup_field_ids: args.fields.lookup_field_ids(),
                    summary_fields: args.fields.summary_fields(),
                };
                let relationship = client
                    .create_relationship(&child_table_id, &input)
                    .unwrap_or_exit();
                global.render_value(&relationship)
            }
            RelationshipSubcommand::Update(args) => {
                let input = UpdateRelationshipInput {
                    lookup_field_ids: args.fields.lookup_field_ids(),
                    summary_fields: args.fields.summary_fields(),
                };
                let relationship = client
                    .update_relationship(&child_table_id, args.id.relationship_id, &input)
                    .unwrap_or_exit();
                global.render_value(&relationship)
            }
            RelationshipSubcommand::Delete(args) => {
                let output = client
                    .delete_relationship(&child_table_id, args.relationship_id)
                    .unwrap_or_exit();
                global.render_value(&output)
            }
        }
    }
}
