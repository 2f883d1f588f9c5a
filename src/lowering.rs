//! Dialect-agnostic field-to-column lowering, shared by the differ (which
//! needs a target table's columns to diff against the observed ones) and
//! the planner (which needs the same columns to build `CreateTable` /
//! `AlterTable` nodes). Interprets the embedded-field expansion modes of
//! §4.5: `inline`, `inline prefix=`, `json`, `relation`, `skip`.
//!
//! The extractor (out of scope, §1) is responsible for deciding *which*
//! mode applies to a struct field; this module only carries out what the
//! mode says, the same division of labor the spec draws between "done
//! upstream by the extractor, respected by the planner".

use crate::ir::{Column, Constraint, ForeignKeyRef};
use crate::schema::{EmbedMode, TargetField};

/// Lowers a struct's field list into the ordered columns a `CreateTable`
/// (or the comparable side of a differ pass) should carry. `skip` fields
/// are omitted entirely; everything else becomes exactly one column.
pub fn lower_fields(fields: &[TargetField]) -> Vec<Column> {
    fields.iter().filter_map(lower_field).collect()
}

/// Lowers a field list the same way [`lower_fields`] does, additionally
/// synthesizing a table-level composite primary key when more than one
/// field is marked primary. A table can't declare the same primary key
/// both inline on each column and as a table constraint, so the member
/// columns' inline `PRIMARY KEY` is cleared whenever the table-level
/// constraint is emitted instead. Used by both the differ (so the
/// comparable "next" side of a diff matches what the planner would
/// actually emit) and the planner's table-creation step.
pub fn lower_fields_with_constraints(fields: &[TargetField]) -> (Vec<Column>, Vec<Constraint>) {
    let mut columns = lower_fields(fields);

    let primary_columns: Vec<String> = fields
        .iter()
        .filter(|f| f.primary && !matches!(f.embed, EmbedMode::Skip))
        .map(|f| f.column_name.clone())
        .collect();

    if primary_columns.len() > 1 {
        for column in &mut columns {
            if primary_columns.contains(&column.name) {
                column.primary = false;
            }
        }
        (columns, vec![Constraint::primary_key(primary_columns)])
    } else {
        (columns, Vec::new())
    }
}

fn lower_field(field: &TargetField) -> Option<Column> {
    let (name, sql_type, foreign_key) = match &field.embed {
        EmbedMode::Skip => return None,
        EmbedMode::None | EmbedMode::Inline => (field.column_name.clone(), field.sql_type.clone(), field.foreign_key.clone()),
        EmbedMode::InlinePrefix(prefix) => (format!("{}{}", prefix, field.column_name), field.sql_type.clone(), field.foreign_key.clone()),
        EmbedMode::Json { column_name, sql_type } => (column_name.clone(), sql_type.clone(), None),
        EmbedMode::Relation {
            fk_column,
            ref_table,
            ref_column,
            on_delete,
        } => {
            let mut fk = ForeignKeyRef::new(ref_table.clone(), ref_column.clone());
            if let Some(action) = on_delete {
                fk = fk.with_on_delete(action.clone());
            }
            (fk_column.clone(), field.sql_type.clone(), Some(fk))
        }
    };

    let mut column = Column::new(name, sql_type)
        .set_nullable(field.nullable)
        .set_unique(field.unique)
        .set_auto_increment(field.auto_increment);
    if field.primary {
        column = column.set_primary();
    }
    if let Some(default) = &field.default {
        column.default = Some(default.clone());
    }
    if let Some(check) = &field.check {
        column = column.with_check(check.clone());
    }
    if let Some(comment) = &field.comment {
        column = column.with_comment(comment.clone());
    }
    if let Some(fk) = foreign_key {
        column = column.with_foreign_key(fk);
    }
    Some(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, embed: EmbedMode) -> TargetField {
        TargetField {
            struct_field_name: name.to_string(),
            column_name: name.to_string(),
            sql_type: "TEXT".to_string(),
            nullable: true,
            primary: false,
            unique: false,
            auto_increment: false,
            default: None,
            check: None,
            comment: None,
            foreign_key: None,
            embed,
        }
    }

    #[test]
    fn skip_omits_the_field() {
        let fields = vec![field("a", EmbedMode::None), field("b", EmbedMode::Skip)];
        let cols = lower_fields(&fields);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].name, "a");
    }

    #[test]
    fn inline_prefix_prepends_to_column_name() {
        let fields = vec![field("street", EmbedMode::InlinePrefix("addr_".to_string()))];
        let cols = lower_fields(&fields);
        assert_eq!(cols[0].name, "addr_street");
    }

    #[test]
    fn json_mode_overrides_name_and_type() {
        let fields = vec![field(
            "meta",
            EmbedMode::Json {
                column_name: "metadata".to_string(),
                sql_type: "JSONB".to_string(),
            },
        )];
        let cols = lower_fields(&fields);
        assert_eq!(cols[0].name, "metadata");
        assert_eq!(cols[0].sql_type, "JSONB");
    }

    #[test]
    fn composite_primary_key_clears_the_inline_flag_on_member_columns() {
        let mut a = field("tenant_id", EmbedMode::None);
        a.primary = true;
        let mut b = field("user_id", EmbedMode::None);
        b.primary = true;
        let fields = vec![a, b];

        let (columns, constraints) = lower_fields_with_constraints(&fields);
        assert!(columns.iter().all(|c| !c.primary));
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].columns, vec!["tenant_id".to_string(), "user_id".to_string()]);
    }

    #[test]
    fn single_primary_field_is_inline_only_no_table_constraint() {
        let mut a = field("id", EmbedMode::None);
        a.primary = true;
        let fields = vec![a];

        let (columns, constraints) = lower_fields_with_constraints(&fields);
        assert!(columns[0].primary);
        assert!(constraints.is_empty());
    }

    #[test]
    fn relation_mode_attaches_a_foreign_key() {
        let fields = vec![field(
            "author",
            EmbedMode::Relation {
                fk_column: "author_id".to_string(),
                ref_table: "users".to_string(),
                ref_column: "id".to_string(),
                on_delete: Some("CASCADE".to_string()),
            },
        )];
        let cols = lower_fields(&fields);
        assert_eq!(cols[0].name, "author_id");
        let fk = cols[0].foreign_key.as_ref().unwrap();
        assert_eq!(fk.table, "users");
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
    }
}
