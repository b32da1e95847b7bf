//! Static checks on a transformation query before it is executed.

use super::TABLE_NAME;
use crate::core::TransformError;
use sqlparser::ast::{ObjectName, Query, Statement, TableFactor, Visit, Visitor};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use std::collections::HashSet;
use std::ops::ControlFlow;

/// Validate `text` and return the query to run.
///
/// The bare table name is accepted as shorthand for selecting everything.
pub fn check(text: &str) -> Result<String, TransformError> {
    let text = text.trim().trim_end_matches(';').trim();
    if text.is_empty() {
        return Err(TransformError::Empty);
    }
    if text == TABLE_NAME {
        return Ok(format!("SELECT * FROM {TABLE_NAME}"));
    }

    let dialect = GenericDialect {};
    let statements = match Parser::parse_sql(&dialect, text) {
        Ok(statements) => statements,
        Err(e) if is_scalar_expression(&dialect, text) => {
            tracing::debug!("expression parsed as a scalar: {e}");
            return Err(TransformError::NotATable);
        }
        Err(e) => return Err(TransformError::Syntax(e.to_string())),
    };
    let statement = match statements.as_slice() {
        [] => return Err(TransformError::Empty),
        [one] => one,
        _ => {
            return Err(TransformError::Rejected(
                "expected a single expression, found several statements".into(),
            ));
        }
    };
    if !matches!(statement, Statement::Query(_)) {
        return Err(TransformError::Rejected("only queries are allowed".into()));
    }

    let mut guard = RelationGuard::default();
    if let ControlFlow::Break(reason) = statement.visit(&mut guard) {
        return Err(TransformError::Rejected(reason));
    }
    Ok(text.to_string())
}

fn is_scalar_expression(dialect: &GenericDialect, text: &str) -> bool {
    let Ok(mut parser) = Parser::new(dialect).try_with_sql(text) else {
        return false;
    };
    parser.parse_expr().is_ok() && matches!(parser.peek_token().token, Token::EOF)
}

/// Allows `df` and the query's own CTE names; stops at anything else.
#[derive(Default)]
struct RelationGuard {
    ctes: HashSet<String>,
}

impl Visitor for RelationGuard {
    type Break = String;

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.ctes.insert(cte.alias.name.value.to_lowercase());
            }
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        let name = relation.to_string();
        let normalized = name.trim_matches('"').to_lowercase();
        if normalized == TABLE_NAME || self.ctes.contains(&normalized) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(format!(
                "unknown table '{name}'; only '{TABLE_NAME}' is available"
            ))
        }
    }

    fn pre_visit_table_factor(&mut self, table_factor: &TableFactor) -> ControlFlow<Self::Break> {
        match table_factor {
            TableFactor::Table { args: Some(_), name, .. } => {
                ControlFlow::Break(format!("table function '{name}' is not available"))
            }
            TableFactor::TableFunction { .. } | TableFactor::Function { .. } => {
                ControlFlow::Break("table functions are not available".into())
            }
            _ => ControlFlow::Continue(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_query_is_allowed() {
        let q = check("SELECT a, b FROM df WHERE a > 1;").unwrap();
        assert_eq!(q, "SELECT a, b FROM df WHERE a > 1");
    }

    #[test]
    fn test_bare_table_name_selects_everything() {
        assert_eq!(check(" df ").unwrap(), "SELECT * FROM df");
    }

    #[test]
    fn test_scalar_expression_is_not_a_table() {
        assert_eq!(check("1+1"), Err(TransformError::NotATable));
        assert_eq!(check("'abc' || 'd'"), Err(TransformError::NotATable));
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(check("   "), Err(TransformError::Empty));
    }

    #[test]
    fn test_garbage_is_a_syntax_error() {
        assert!(matches!(check("SELECT FROM WHERE ("), Err(TransformError::Syntax(_))));
    }

    #[test]
    fn test_other_tables_and_table_functions_are_rejected() {
        assert!(matches!(check("SELECT * FROM users"), Err(TransformError::Rejected(_))));
        assert!(matches!(
            check("SELECT * FROM read_csv('/etc/passwd')"),
            Err(TransformError::Rejected(_))
        ));
        assert!(matches!(
            check("SELECT * FROM df JOIN other ON df.a = other.a"),
            Err(TransformError::Rejected(_))
        ));
    }

    #[test]
    fn test_ctes_are_allowed() {
        assert!(check("WITH big AS (SELECT * FROM df WHERE a > 1) SELECT * FROM big").is_ok());
    }

    #[test]
    fn test_non_queries_are_rejected() {
        assert!(matches!(check("DROP TABLE df"), Err(TransformError::Rejected(_))));
        assert!(matches!(
            check("CREATE TABLE t AS SELECT * FROM df"),
            Err(TransformError::Rejected(_))
        ));
        assert!(matches!(
            check("SELECT * FROM df; SELECT * FROM df"),
            Err(TransformError::Rejected(_))
        ));
    }
}
